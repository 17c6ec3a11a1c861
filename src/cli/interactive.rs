//! Menu-driven session.
//!
//! Mirrors the desktop window this tool grew out of: pick a genre, build the
//! graph, run either traversal as often as you like, inspect or clear the
//! accumulated results.

use std::path::PathBuf;

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use tracing::debug;

use crate::config::GenreGraphConfig;
use crate::error::{GenreGraphError, Result};
use crate::graph::report;
use crate::graph::traversal::TraversalOutcome;
use crate::session::Session;
use crate::types::{Genre, TraversalKind};

use super::render::{drive, ProgressRenderer};
use super::{metrics_line, print_outcome, print_stats};

/// Menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SelectGenre,
    BuildGraph,
    Bfs,
    Dfs,
    ShowResults,
    ShowLastVisited,
    ShowMetrics,
    ClearResults,
    Quit,
}

impl Action {
    const ALL: [Action; 9] = [
        Self::SelectGenre,
        Self::BuildGraph,
        Self::Bfs,
        Self::Dfs,
        Self::ShowResults,
        Self::ShowLastVisited,
        Self::ShowMetrics,
        Self::ClearResults,
        Self::Quit,
    ];

    fn label(&self) -> &'static str {
        match self {
            Self::SelectGenre => "Select a genre",
            Self::BuildGraph => "Build Graph",
            Self::Bfs => "Breadth First Search",
            Self::Dfs => "Depth First Search",
            Self::ShowResults => "Show results",
            Self::ShowLastVisited => "Show visited labels of last traversal",
            Self::ShowMetrics => "Show metrics",
            Self::ClearResults => "Clear Results",
            Self::Quit => "Quit",
        }
    }
}

fn prompt_error(e: dialoguer::Error) -> GenreGraphError {
    GenreGraphError::Other(format!("prompt failed: {e}"))
}

/// Run the menu loop until the user quits.
pub fn run(config: GenreGraphConfig, dataset: Option<PathBuf>, quiet: bool) -> Result<()> {
    let theme = ColorfulTheme::default();
    let term = Term::stdout();
    let preview_limit = config.traversal.preview_limit;
    let mut dataset = dataset.or_else(|| config.dataset.path.clone());
    let (session, events) = Session::new(config);

    let mut genre = Genre::ALL[0];
    let mut last: Option<TraversalOutcome> = None;

    println!("{}", style("Video Game Graph Traversal").bold().underlined());
    loop {
        let built = session.graph().is_some();
        let items: Vec<String> = Action::ALL
            .iter()
            .map(|a| match a {
                Action::SelectGenre => format!("{} (current: {genre})", a.label()),
                Action::BuildGraph if built => format!("{} (rebuild)", a.label()),
                _ => a.label().to_string(),
            })
            .collect();

        let choice = Select::with_theme(&theme)
            .with_prompt("Action")
            .items(&items)
            .default(if built { 2 } else { 1 })
            .interact_on(&term)
            .map_err(prompt_error)?;
        let action = Action::ALL[choice];
        debug!(?action, "menu selection");

        match action {
            Action::SelectGenre => {
                let labels: Vec<&str> = Genre::ALL.iter().map(|g| g.label()).collect();
                let current = Genre::ALL.iter().position(|g| *g == genre).unwrap_or(0);
                let idx = Select::with_theme(&theme)
                    .with_prompt("Select a genre")
                    .items(&labels)
                    .default(current)
                    .interact_on(&term)
                    .map_err(prompt_error)?;
                genre = Genre::ALL[idx];
            }
            Action::BuildGraph => {
                let path = match &dataset {
                    Some(path) => path.clone(),
                    None => {
                        let entered: String = Input::with_theme(&theme)
                            .with_prompt("Dataset path")
                            .interact_text_on(&term)
                            .map_err(prompt_error)?;
                        PathBuf::from(entered.trim())
                    }
                };
                let handle = session.build_graph(&path)?;
                match drive(&events, handle, &mut ProgressRenderer::new(quiet)) {
                    Ok(stats) => {
                        print_stats(&stats);
                        dataset = Some(path);
                    }
                    Err(e) => println!("{} {e}", style("Build failed:").red().bold()),
                }
            }
            Action::Bfs | Action::Dfs => {
                let kind = if action == Action::Bfs {
                    TraversalKind::Bfs
                } else {
                    TraversalKind::Dfs
                };
                match session.start_traversal(kind, genre.label()) {
                    Ok(handle) => match drive(&events, handle, &mut ProgressRenderer::new(quiet)) {
                        Ok(outcome) => {
                            print_outcome(&outcome, None);
                            last = Some(outcome);
                        }
                        Err(e) => println!("{} {e}", style("Traversal failed:").red().bold()),
                    },
                    Err(GenreGraphError::GraphNotBuilt) => {
                        println!("{}", style("Build the graph first.").yellow())
                    }
                    Err(e) => return Err(e),
                }
            }
            Action::ShowResults => {
                let text = session.results_text();
                if text.is_empty() {
                    println!("{}", style("(no results)").dim());
                } else {
                    print!("{text}");
                }
            }
            Action::ShowLastVisited => match &last {
                Some(outcome) => print!("{}", report::preview(outcome, preview_limit)),
                None => println!("{}", style("(no traversal yet)").dim()),
            },
            Action::ShowMetrics => println!("{}", metrics_line(&session.metrics())),
            Action::ClearResults => {
                session.clear_results();
                last = None;
                println!("{}", style("Results cleared.").dim());
            }
            Action::Quit => return Ok(()),
        }
    }
}
