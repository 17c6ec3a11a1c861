//! Command layer between the graph core and whatever presents it.
//!
//! A [`Session`] exposes four commands: build-graph, start-BFS, start-DFS
//! and clear-results. Each long-running command gets its own worker thread
//! and streams [`SessionEvent`]s over a channel. The caller keeps a
//! [`CommandHandle`] to cancel or join the worker.
//!
//! The graph slot holds an `Arc<GenreGraph>`. A traversal clones the `Arc`
//! when it starts, so a rebuild swaps the slot without disturbing traversals
//! already running. Visited sets and frontiers live on the worker's stack
//! and are never shared.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{info, warn};

use crate::config::GenreGraphConfig;
use crate::dataset::DatasetLoader;
use crate::error::{GenreGraphError, Result};
use crate::graph::cancel::CancellationToken;
use crate::graph::report;
use crate::graph::store::{BuildStats, GenreGraph, GraphBuilder};
use crate::graph::traversal::{GraphTraversal, TraversalOptions, TraversalOutcome};
use crate::observability::Metrics;
use crate::types::{GameRecord, TraversalKind};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Progress and completion notices emitted by session workers.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    BuildStarted { total_rows: usize },
    BuildProgress { processed: usize, total: usize },
    BuildComplete(BuildStats),
    BuildFailed(String),
    TraversalStarted {
        kind: TraversalKind,
        genre: String,
        start_count: usize,
    },
    TraversalProgress {
        kind: TraversalKind,
        visited: usize,
        total: usize,
    },
    TraversalComplete(TraversalOutcome),
    TraversalFailed { kind: TraversalKind, error: String },
}

impl SessionEvent {
    /// Whether this is the last event a command emits.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::BuildComplete(_)
                | Self::BuildFailed(_)
                | Self::TraversalComplete(_)
                | Self::TraversalFailed { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// CommandHandle
// ---------------------------------------------------------------------------

/// A running command: its worker thread plus a way to stop it.
pub struct CommandHandle<T> {
    handle: JoinHandle<Result<T>>,
    cancel: CancellationToken,
}

impl<T> CommandHandle<T> {
    /// Ask the worker to stop at its next step boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return its result.
    pub fn join(self) -> Result<T> {
        self.handle
            .join()
            .map_err(|_| GenreGraphError::Worker("worker thread panicked".into()))?
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

enum BuildSource {
    Path(PathBuf),
    Records(Vec<GameRecord>),
}

/// Shared command state. Cheap to clone; all clones see the same graph,
/// results log, and metrics.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: GenreGraphConfig,
    graph: RwLock<Option<Arc<GenreGraph>>>,
    results: Mutex<String>,
    metrics: Mutex<Metrics>,
    events: Sender<SessionEvent>,
}

impl Session {
    /// Create a session and the receiving end of its event stream.
    ///
    /// The channel is unbounded and every reported visit sends an event, so a
    /// caller that holds the receiver must drain it. Drop the receiver to
    /// discard events instead; sends to a closed channel are ignored.
    pub fn new(config: GenreGraphConfig) -> (Self, Receiver<SessionEvent>) {
        let (tx, rx) = channel::unbounded();
        let session = Self {
            inner: Arc::new(SessionInner {
                config,
                graph: RwLock::new(None),
                results: Mutex::new(String::new()),
                metrics: Mutex::new(Metrics::new()),
                events: tx,
            }),
        };
        (session, rx)
    }

    pub fn config(&self) -> &GenreGraphConfig {
        &self.inner.config
    }

    /// The current graph, if one has been built.
    pub fn graph(&self) -> Option<Arc<GenreGraph>> {
        self.inner
            .graph
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn metrics(&self) -> Metrics {
        self.inner
            .metrics
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Everything appended to the results log since the last clear.
    pub fn results_text(&self) -> String {
        self.inner
            .results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    // -------------------------------------------------------------------
    // build-graph
    // -------------------------------------------------------------------

    /// Load the dataset at `path` and build a graph on a worker thread.
    ///
    /// On success the new graph replaces the current one. On failure the
    /// previous graph, if any, stays in place.
    pub fn build_graph(&self, path: impl Into<PathBuf>) -> Result<CommandHandle<BuildStats>> {
        self.spawn_build(BuildSource::Path(path.into()))
    }

    /// Build from records already in memory.
    pub fn build_graph_from_records(
        &self,
        records: Vec<GameRecord>,
    ) -> Result<CommandHandle<BuildStats>> {
        self.spawn_build(BuildSource::Records(records))
    }

    fn spawn_build(&self, source: BuildSource) -> Result<CommandHandle<BuildStats>> {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let session = self.clone();
        let handle = thread::Builder::new()
            .name("graph-build".into())
            .spawn(move || session.run_build(source, token))?;
        Ok(CommandHandle { handle, cancel })
    }

    fn run_build(&self, source: BuildSource, cancel: CancellationToken) -> Result<BuildStats> {
        match self.load_and_build(source, cancel) {
            Ok((graph, stats)) => {
                *self.inner.graph.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(graph));
                self.inner
                    .metrics
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .record_build(&stats);
                self.emit(SessionEvent::BuildComplete(stats));
                Ok(stats)
            }
            Err(e) => {
                warn!(error = %e, "graph build failed");
                self.emit(SessionEvent::BuildFailed(e.to_string()));
                Err(e)
            }
        }
    }

    fn load_and_build(
        &self,
        source: BuildSource,
        cancel: CancellationToken,
    ) -> Result<(GenreGraph, BuildStats)> {
        let dataset = &self.inner.config.dataset;
        let records = match source {
            BuildSource::Path(path) => {
                let opts = dataset.reader_options().ok_or_else(|| {
                    GenreGraphError::Config(format!(
                        "dataset.field_delimiter must be a single ASCII character, got {:?}",
                        dataset.field_delimiter
                    ))
                })?;
                DatasetLoader::new(opts).load_path(&path)?
            }
            BuildSource::Records(records) => records,
        };

        self.emit(SessionEvent::BuildStarted {
            total_rows: records.len(),
        });
        let mut sink = |processed: usize, total: usize| {
            self.emit(SessionEvent::BuildProgress { processed, total })
        };
        GraphBuilder::new()
            .delimiter(dataset.genre_delimiter.clone())
            .progress_chunks(self.inner.config.build.progress_chunks)
            .cancellation(cancel)
            .build(&records, &mut sink)
    }

    // -------------------------------------------------------------------
    // start-BFS / start-DFS
    // -------------------------------------------------------------------

    pub fn start_bfs(&self, genre: &str) -> Result<CommandHandle<TraversalOutcome>> {
        self.start_traversal(TraversalKind::Bfs, genre)
    }

    pub fn start_dfs(&self, genre: &str) -> Result<CommandHandle<TraversalOutcome>> {
        self.start_traversal(TraversalKind::Dfs, genre)
    }

    /// Traverse from the games listed under `genre` on a worker thread.
    ///
    /// Fails immediately with [`GenreGraphError::GraphNotBuilt`] when no
    /// graph exists yet. A genre absent from the graph is not an error: the
    /// traversal completes with zero labels.
    pub fn start_traversal(
        &self,
        kind: TraversalKind,
        genre: &str,
    ) -> Result<CommandHandle<TraversalOutcome>> {
        let graph = self.graph().ok_or(GenreGraphError::GraphNotBuilt)?;
        let cancel = CancellationToken::new();
        let opts = TraversalOptions {
            step_delay: self.inner.config.traversal.step_delay(),
            progress_every: self.inner.config.traversal.progress_every,
            cancel: cancel.clone(),
        };
        let genre = genre.to_string();
        let session = self.clone();
        info!(kind = %kind, genre = %genre, "starting traversal");

        let handle = thread::Builder::new()
            .name(format!("{kind}-traversal"))
            .spawn(move || session.run_traversal(kind, &graph, &genre, &opts))?;
        Ok(CommandHandle { handle, cancel })
    }

    fn run_traversal(
        &self,
        kind: TraversalKind,
        graph: &GenreGraph,
        genre: &str,
        opts: &TraversalOptions,
    ) -> Result<TraversalOutcome> {
        self.emit(SessionEvent::TraversalStarted {
            kind,
            genre: genre.to_string(),
            start_count: GraphTraversal::new(graph).start_count(genre),
        });
        let mut sink = |visited: usize, total: usize| {
            self.emit(SessionEvent::TraversalProgress {
                kind,
                visited,
                total,
            })
        };

        match GraphTraversal::new(graph).run(kind, genre, opts, &mut sink) {
            Ok(outcome) => {
                self.inner
                    .results
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push_str(&report::full_block(&outcome));
                self.inner
                    .metrics
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .record_traversal(&outcome);
                self.emit(SessionEvent::TraversalComplete(outcome.clone()));
                Ok(outcome)
            }
            Err(e) => {
                if matches!(e, GenreGraphError::Cancelled) {
                    self.inner
                        .metrics
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .record_cancelled();
                }
                warn!(kind = %kind, error = %e, "traversal stopped");
                self.emit(SessionEvent::TraversalFailed {
                    kind,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // -------------------------------------------------------------------
    // clear-results
    // -------------------------------------------------------------------

    /// Empty the results log. The graph and metrics are untouched.
    pub fn clear_results(&self) {
        self.inner
            .results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine; the structured result still comes back
        // through the handle.
        let _ = self.inner.events.send(event);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn records() -> Vec<GameRecord> {
        vec![
            GameRecord::new("Tetris", "Puzzle"),
            GameRecord::new("Chess", "Board Games||Strategy"),
            GameRecord::new("Civ", "Strategy"),
        ]
    }

    fn built_session() -> (Session, Receiver<SessionEvent>) {
        let (session, rx) = Session::new(GenreGraphConfig::default());
        session
            .build_graph_from_records(records())
            .unwrap()
            .join()
            .unwrap();
        (session, rx)
    }

    #[test]
    fn build_emits_started_progress_complete() {
        let (_session, rx) = built_session();
        let events: Vec<SessionEvent> = rx.try_iter().collect();
        assert!(matches!(events.first(), Some(SessionEvent::BuildStarted { total_rows: 3 })));
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::BuildProgress { processed: 3, total: 3 })));
        match events.last() {
            Some(SessionEvent::BuildComplete(stats)) => assert_eq!(stats.genres, 3),
            other => panic!("expected BuildComplete, got {other:?}"),
        }
    }

    #[test]
    fn traversal_before_build_is_rejected() {
        let (session, _rx) = Session::new(GenreGraphConfig::default());
        assert!(matches!(
            session.start_bfs("Strategy"),
            Err(GenreGraphError::GraphNotBuilt)
        ));
    }

    #[test]
    fn bfs_and_dfs_append_summaries() {
        let (session, _rx) = built_session();
        let bfs = session.start_bfs("Strategy").unwrap().join().unwrap();
        let dfs = session.start_dfs("Strategy").unwrap().join().unwrap();
        assert_eq!(bfs.traversed_count(), 2);
        assert_eq!(dfs.traversed_count(), 2);

        let text = session.results_text();
        assert!(text.contains("Breadth First Search Traversal of Strategy Games:"));
        assert!(text.contains("Depth First Search Traversal of Strategy Games:"));
        assert_eq!(text.matches("Traversed 2 Strategy games").count(), 2);

        let m = session.metrics();
        assert_eq!(m.bfs_runs, 1);
        assert_eq!(m.dfs_runs, 1);
        assert_eq!(m.labels_visited, 4);
    }

    #[test]
    fn unknown_genre_completes_with_zero() {
        let (session, rx) = built_session();
        let out = session.start_dfs("Racing").unwrap().join().unwrap();
        assert_eq!(out.traversed_count(), 0);
        let last = rx.try_iter().last();
        assert!(matches!(last, Some(SessionEvent::TraversalComplete(ref o)) if o.genre == "Racing"));
    }

    #[test]
    fn clear_results_empties_log_only() {
        let (session, _rx) = built_session();
        session.start_bfs("Puzzle").unwrap().join().unwrap();
        assert!(!session.results_text().is_empty());
        session.clear_results();
        assert_eq!(session.results_text(), "");
        assert!(session.graph().is_some());
    }

    #[test]
    fn failed_build_keeps_previous_graph() {
        let (session, rx) = built_session();
        let _ = rx.try_iter().count();
        let err = session
            .build_graph("/definitely/not/a/dataset.csv")
            .unwrap()
            .join()
            .unwrap_err();
        assert!(matches!(err, GenreGraphError::Io(_)));
        assert!(matches!(rx.try_iter().last(), Some(SessionEvent::BuildFailed(_))));
        assert_eq!(session.graph().map(|g| g.genre_count()), Some(3));
    }

    #[test]
    fn rebuild_swaps_graph_but_old_arc_survives() {
        let (session, _rx) = built_session();
        let old = session.graph().unwrap();
        session
            .build_graph_from_records(vec![GameRecord::new("Doom", "Shooter")])
            .unwrap()
            .join()
            .unwrap();
        let new = session.graph().unwrap();
        assert_eq!(old.genre_count(), 3);
        assert_eq!(new.genre_count(), 1);
        assert!(!Arc::ptr_eq(&old, &new));
    }

    #[test]
    fn cancel_stops_a_paced_traversal() {
        let mut config = GenreGraphConfig::default();
        config.traversal.step_delay_ms = 50;
        let (session, rx) = Session::new(config);
        let many: Vec<GameRecord> = (0..200)
            .map(|i| GameRecord::new(format!("g{i}"), "Indie"))
            .collect();
        session.build_graph_from_records(many).unwrap().join().unwrap();

        let handle = session.start_bfs("Indie").unwrap();
        handle.cancel();
        assert!(matches!(handle.join(), Err(GenreGraphError::Cancelled)));
        assert!(rx
            .try_iter()
            .any(|e| matches!(e, SessionEvent::TraversalFailed { kind: TraversalKind::Bfs, .. })));
        assert_eq!(session.metrics().traversals_cancelled, 1);
        assert_eq!(session.results_text(), "");
    }

    #[test]
    fn concurrent_traversals_are_isolated() {
        let (session, _rx) = built_session();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                if i % 2 == 0 {
                    session.start_bfs("Strategy").unwrap()
                } else {
                    session.start_dfs("Strategy").unwrap()
                }
            })
            .collect();
        for h in handles {
            let out = h.join().unwrap();
            assert_eq!(out.traversed_count(), 2);
        }
        assert_eq!(session.metrics().traversals(), 8);
    }

    #[test]
    fn started_event_counts_distinct_start_games() {
        let (session, rx) = Session::new(GenreGraphConfig::default());
        session
            .build_graph_from_records(vec![
                GameRecord::new("Doom", "Shooter"),
                GameRecord::new("Doom", "Shooter"),
            ])
            .unwrap()
            .join()
            .unwrap();
        let _ = rx.try_iter().count();

        let out = session.start_bfs("Shooter").unwrap().join().unwrap();
        let events: Vec<SessionEvent> = rx.try_iter().collect();
        match events.first() {
            Some(SessionEvent::TraversalStarted { start_count, .. }) => {
                assert_eq!(*start_count, out.start_count)
            }
            other => panic!("expected TraversalStarted, got {other:?}"),
        }
        assert_eq!(out.start_count, 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::TraversalProgress { visited: 1, total: 1, .. })));
    }

    #[test]
    fn non_ascii_field_delimiter_is_a_config_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("games.csv");
        std::fs::write(&path, "name§genres\nDoom§Shooter\n").unwrap();

        let mut config = GenreGraphConfig::default();
        config.dataset.field_delimiter = '§';
        let (session, _rx) = Session::new(config);
        let err = session.build_graph(&path).unwrap().join().unwrap_err();
        assert!(matches!(err, GenreGraphError::Config(_)));
        assert!(session.graph().is_none());
    }

    #[test]
    fn dropped_receiver_does_not_block_workers() {
        let (session, rx) = Session::new(GenreGraphConfig::default());
        drop(rx);
        session
            .build_graph_from_records(records())
            .unwrap()
            .join()
            .unwrap();
        let out = session.start_dfs("Strategy").unwrap().join().unwrap();
        assert_eq!(out.traversed_count(), 2);
    }

    #[test]
    fn terminal_events() {
        assert!(SessionEvent::BuildFailed("x".into()).is_terminal());
        assert!(!SessionEvent::BuildStarted { total_rows: 1 }.is_terminal());
        assert!(!SessionEvent::TraversalProgress {
            kind: TraversalKind::Dfs,
            visited: 1,
            total: 1
        }
        .is_terminal());
    }
}
