//! Terminal front end: argument parsing and one-shot commands.
//!
//! Every subcommand goes through a [`Session`], so the terminal sees the same
//! event stream an interactive front end would.

pub mod interactive;
pub mod render;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use crossbeam::channel::Receiver;

use crate::config::{load_config, GenreGraphConfig};
use crate::error::{GenreGraphError, Result};
use crate::graph::report;
use crate::graph::store::BuildStats;
use crate::graph::traversal::TraversalOutcome;
use crate::observability::Metrics;
use crate::session::{Session, SessionEvent};
use crate::types::{Genre, TraversalKind};
use render::{drive, ProgressRenderer};

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Parser)]
#[command(
    name = "genregraph",
    version,
    about = "Build a genre graph from a game dataset and traverse it"
)]
pub struct Cli {
    /// YAML config file. Defaults to ./genregraph.yaml, then the user config dir.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Hide progress bars and informational logs.
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the selectable genres.
    Genres,
    /// Build the graph and print its statistics.
    Build {
        /// Dataset file (falls back to dataset.path / GENREGRAPH_DATASET).
        dataset: Option<PathBuf>,
        /// Print statistics as JSON.
        #[arg(long)]
        json: bool,
        /// Also print session metrics.
        #[arg(long)]
        metrics: bool,
    },
    /// Breadth-first traversal from a genre's games.
    Bfs(TraverseArgs),
    /// Depth-first traversal from a genre's games.
    Dfs(TraverseArgs),
    /// Run both traversals and check that they visit the same number of labels.
    Compare(TraverseArgs),
    /// Menu-driven session: build once, traverse repeatedly.
    Interactive {
        dataset: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct TraverseArgs {
    /// Dataset file (falls back to dataset.path / GENREGRAPH_DATASET).
    pub dataset: Option<PathBuf>,

    /// Genre to start from. Defaults to Puzzle.
    #[arg(long, short, conflicts_with = "label")]
    pub genre: Option<Genre>,

    /// Start from any graph key, not just the offered genres.
    #[arg(long)]
    pub label: Option<String>,

    /// List the first N visited labels.
    #[arg(long)]
    pub show: Option<usize>,

    /// Print the structured result as JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,

    /// Pause after each visit, overriding traversal.step_delay_ms.
    #[arg(long)]
    pub step_delay_ms: Option<u64>,

    /// Also print session metrics (build plus every traversal run).
    #[arg(long)]
    pub metrics: bool,
}

impl TraverseArgs {
    /// The label whose game list seeds the traversal.
    pub fn start_label(&self) -> String {
        match (&self.label, self.genre) {
            (Some(label), _) => label.clone(),
            (None, Some(genre)) => genre.label().to_string(),
            (None, None) => Genre::ALL[0].label().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Execute the parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Command::Genres => {
            for genre in Genre::ALL {
                println!("{genre}");
            }
            Ok(())
        }
        Command::Build {
            dataset,
            json,
            metrics,
        } => {
            let path = resolve_dataset(dataset.as_deref(), &config)?;
            let (session, events) = Session::new(config);
            let stats = build(&session, &events, &path, quiet)?;
            if json {
                let value = with_metrics(stats_json(&stats), "stats", metrics.then(|| session.metrics()));
                println!("{}", to_pretty(&value)?);
            } else {
                print_stats(&stats);
                if metrics {
                    println!("{}", metrics_line(&session.metrics()));
                }
            }
            Ok(())
        }
        Command::Bfs(args) => traverse(config, &args, &[TraversalKind::Bfs], quiet),
        Command::Dfs(args) => traverse(config, &args, &[TraversalKind::Dfs], quiet),
        Command::Compare(args) => {
            traverse(config, &args, &[TraversalKind::Bfs, TraversalKind::Dfs], quiet)
        }
        Command::Interactive { dataset } => interactive::run(config, dataset, quiet),
    }
}

/// CLI argument, else configured path, else an error naming both options.
pub fn resolve_dataset(arg: Option<&Path>, config: &GenreGraphConfig) -> Result<PathBuf> {
    arg.map(Path::to_path_buf)
        .or_else(|| config.dataset.path.clone())
        .ok_or_else(|| {
            GenreGraphError::Config(
                "no dataset given: pass a path or set dataset.path / GENREGRAPH_DATASET".into(),
            )
        })
}

fn build(
    session: &Session,
    events: &Receiver<SessionEvent>,
    path: &Path,
    quiet: bool,
) -> Result<BuildStats> {
    let handle = session.build_graph(path)?;
    drive(events, handle, &mut ProgressRenderer::new(quiet))
}

fn traverse(
    mut config: GenreGraphConfig,
    args: &TraverseArgs,
    kinds: &[TraversalKind],
    quiet: bool,
) -> Result<()> {
    if let Some(delay) = args.step_delay_ms {
        config.traversal.step_delay_ms = delay;
    }
    let path = resolve_dataset(args.dataset.as_deref(), &config)?;
    let (session, events) = Session::new(config);
    build(&session, &events, &path, quiet)?;

    let label = args.start_label();
    let mut outcomes = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        let handle = session.start_traversal(kind, &label)?;
        outcomes.push(drive(&events, handle, &mut ProgressRenderer::new(quiet))?);
    }

    if args.json {
        let values: Vec<serde_json::Value> = outcomes.iter().map(TraversalOutcome::to_json).collect();
        let value = match values.as_slice() {
            [single] => single.clone(),
            _ => serde_json::Value::Array(values),
        };
        let value = with_metrics(value, "results", args.metrics.then(|| session.metrics()));
        println!("{}", to_pretty(&value)?);
        return Ok(());
    }

    for outcome in &outcomes {
        print_outcome(outcome, args.show);
    }
    if let [a, b] = outcomes.as_slice() {
        print_agreement(a, b);
    }
    if args.metrics {
        println!("{}", metrics_line(&session.metrics()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn to_pretty(value: &serde_json::Value) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| GenreGraphError::Other(e.to_string()))
}

fn stats_json(stats: &BuildStats) -> serde_json::Value {
    serde_json::to_value(stats).unwrap_or(serde_json::Value::Null)
}

/// Wrap `value` under `key` next to the metrics, or pass it through.
fn with_metrics(value: serde_json::Value, key: &str, metrics: Option<Metrics>) -> serde_json::Value {
    match metrics {
        Some(m) => {
            let mut map = serde_json::Map::new();
            map.insert(key.to_string(), value);
            map.insert("metrics".into(), m.to_json());
            serde_json::Value::Object(map)
        }
        None => value,
    }
}

pub(crate) fn metrics_line(m: &Metrics) -> String {
    format!(
        "{} {} build(s), {} traversal(s) ({} BFS, {} DFS, {} cancelled), {:.1} labels visited on average",
        style("Metrics:").cyan().bold(),
        m.builds,
        m.traversals(),
        m.bfs_runs,
        m.dfs_runs,
        m.traversals_cancelled,
        m.mean_visited()
    )
}

pub(crate) fn print_stats(stats: &BuildStats) {
    println!(
        "{} {} rows ({} skipped), {} genres, {} edges in {:.2}s",
        style("Graph built:").green().bold(),
        stats.rows_read,
        stats.rows_skipped,
        stats.genres,
        stats.edges,
        stats.elapsed.as_secs_f64()
    );
}

pub(crate) fn print_outcome(outcome: &TraversalOutcome, show: Option<usize>) {
    print!("{}", report::full_block(outcome));
    if let Some(limit) = show {
        print!("{}", report::preview(outcome, limit));
        println!();
    }
}

fn print_agreement(a: &TraversalOutcome, b: &TraversalOutcome) {
    let verdict = if a.traversed_count() == b.traversed_count() {
        style("agree").green()
    } else {
        style("DISAGREE").red().bold()
    };
    println!(
        "{} {} vs {} {}: {}",
        a.kind.title(),
        a.traversed_count(),
        b.kind.title(),
        b.traversed_count(),
        verdict
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
