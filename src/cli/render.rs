//! Turn session events into terminal progress bars.

use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError};
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::Result;
use crate::graph::traversal::progress_fraction;
use crate::session::{CommandHandle, SessionEvent};

/// How long to block on the event channel before checking the worker.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bar resolution. Position is the completed fraction scaled to this, and
/// the raw `done/total` counts go in the prefix.
const BAR_SCALE: u64 = 1000;

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg:24} [{bar:40.cyan/blue}] {prefix} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Draws one bar per command. Hidden entirely in quiet mode.
pub struct ProgressRenderer {
    quiet: bool,
    bar: Option<ProgressBar>,
}

impl ProgressRenderer {
    pub fn new(quiet: bool) -> Self {
        Self { quiet, bar: None }
    }

    fn start(&mut self, message: String, total: usize) {
        let bar = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(BAR_SCALE)
        };
        bar.set_style(bar_style());
        bar.set_message(message);
        self.bar = Some(bar);
        self.update(0, total);
    }

    fn update(&mut self, done: usize, total: usize) {
        if let Some(bar) = &self.bar {
            let scaled = progress_fraction(done, total) * BAR_SCALE as f64;
            bar.set_position(scaled.round() as u64);
            bar.set_prefix(format!("{done}/{total}"));
        }
    }

    fn finish(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.finish_with_message(message.to_string());
        }
    }

    fn abandon(&mut self, message: &str) {
        if let Some(bar) = self.bar.take() {
            bar.abandon_with_message(message.to_string());
        }
    }

    /// Render one event.
    pub fn handle(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::BuildStarted { total_rows } => {
                self.start("Graph is being built...".into(), *total_rows)
            }
            SessionEvent::BuildProgress { processed, total } => self.update(*processed, *total),
            SessionEvent::BuildComplete(_) => self.finish("Graph building is complete."),
            SessionEvent::BuildFailed(_) => self.abandon("Graph building failed."),
            SessionEvent::TraversalStarted {
                kind, start_count, ..
            } => self.start(kind.title().to_string(), *start_count),
            SessionEvent::TraversalProgress { visited, total, .. } => self.update(*visited, *total),
            SessionEvent::TraversalComplete(outcome) => self.finish(outcome.kind.title()),
            SessionEvent::TraversalFailed { kind, .. } => self.abandon(kind.title()),
        }
    }
}

/// Render events until the command behind `handle` finishes, then join it.
pub fn drive<T>(
    events: &Receiver<SessionEvent>,
    handle: CommandHandle<T>,
    renderer: &mut ProgressRenderer,
) -> Result<T> {
    loop {
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                renderer.handle(&event);
                if event.is_terminal() {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {
                if handle.is_finished() {
                    for event in events.try_iter() {
                        renderer.handle(&event);
                    }
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    handle.join()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenreGraphConfig;
    use crate::session::Session;
    use crate::types::{GameRecord, TraversalKind};

    #[test]
    fn drive_returns_build_result() {
        let (session, rx) = Session::new(GenreGraphConfig::default());
        let handle = session
            .build_graph_from_records(vec![GameRecord::new("Tetris", "Puzzle")])
            .unwrap();
        let stats = drive(&rx, handle, &mut ProgressRenderer::new(true)).unwrap();
        assert_eq!(stats.genres, 1);
    }

    #[test]
    fn drive_returns_build_error() {
        let (session, rx) = Session::new(GenreGraphConfig::default());
        let handle = session.build_graph("/no/such/file.csv").unwrap();
        assert!(drive(&rx, handle, &mut ProgressRenderer::new(true)).is_err());
    }

    fn position(r: &ProgressRenderer) -> u64 {
        r.bar.as_ref().map(|b| b.position()).unwrap_or_default()
    }

    #[test]
    fn empty_start_set_draws_an_empty_bar() {
        let mut r = ProgressRenderer::new(true);
        r.handle(&SessionEvent::TraversalStarted {
            kind: TraversalKind::Bfs,
            genre: "Racing".into(),
            start_count: 0,
        });
        r.handle(&SessionEvent::TraversalProgress {
            kind: TraversalKind::Bfs,
            visited: 0,
            total: 0,
        });
        assert_eq!(position(&r), 0);
    }

    #[test]
    fn bar_position_tracks_fraction_and_clamps() {
        let mut r = ProgressRenderer::new(true);
        r.handle(&SessionEvent::BuildStarted { total_rows: 4 });
        r.handle(&SessionEvent::BuildProgress {
            processed: 1,
            total: 4,
        });
        assert_eq!(position(&r), BAR_SCALE / 4);
        r.handle(&SessionEvent::TraversalProgress {
            kind: TraversalKind::Dfs,
            visited: 9,
            total: 4,
        });
        assert_eq!(position(&r), BAR_SCALE);
    }

    #[test]
    fn renderer_tolerates_progress_without_start() {
        let mut r = ProgressRenderer::new(true);
        r.handle(&SessionEvent::BuildProgress {
            processed: 1,
            total: 2,
        });
        r.handle(&SessionEvent::BuildFailed("boom".into()));
    }
}
