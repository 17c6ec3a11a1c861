//! Structured logging and run metrics.
//!
//! This module provides:
//! - [`init_logging`]: one-time structured logging setup with `RUST_LOG` support
//! - [`Metrics`]: counters for graph builds and traversals

use std::time::Duration;

use tracing_subscriber::EnvFilter;

use crate::graph::store::BuildStats;
use crate::graph::traversal::TraversalOutcome;
use crate::types::TraversalKind;

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// Defaults to `genregraph=info`, or `genregraph=warn` when `quiet` is set.
/// Output goes to stderr so it never interleaves with results on stdout.
/// Subsequent calls are silently ignored by `tracing_subscriber`.
pub fn init_logging(quiet: bool) {
    let default = if quiet { "genregraph=warn" } else { "genregraph=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}

/// Counters accumulated over a session.
///
/// Serializable to JSON via [`Metrics::to_json`].
#[derive(Debug, Clone, Default)]
pub struct Metrics {
    pub build_duration: Option<Duration>,
    pub builds: u64,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub genres: usize,
    pub edges: usize,
    pub bfs_runs: u64,
    pub dfs_runs: u64,
    pub labels_visited: u64,
    pub traversals_cancelled: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed build. Graph size reflects the latest build only.
    pub fn record_build(&mut self, stats: &BuildStats) {
        self.builds += 1;
        self.build_duration = Some(stats.elapsed);
        self.rows_read = stats.rows_read;
        self.rows_skipped = stats.rows_skipped;
        self.genres = stats.genres;
        self.edges = stats.edges;
    }

    pub fn record_traversal(&mut self, outcome: &TraversalOutcome) {
        match outcome.kind {
            TraversalKind::Bfs => self.bfs_runs += 1,
            TraversalKind::Dfs => self.dfs_runs += 1,
        }
        self.labels_visited += outcome.traversed_count() as u64;
    }

    pub fn record_cancelled(&mut self) {
        self.traversals_cancelled += 1;
    }

    pub fn traversals(&self) -> u64 {
        self.bfs_runs + self.dfs_runs
    }

    /// Mean labels visited per completed traversal, `0.0` before any ran.
    pub fn mean_visited(&self) -> f64 {
        let runs = self.traversals();
        if runs == 0 {
            return 0.0;
        }
        self.labels_visited as f64 / runs as f64
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "build_duration_ms": self.build_duration.map(|d| d.as_millis() as u64),
            "builds": self.builds,
            "rows_read": self.rows_read,
            "rows_skipped": self.rows_skipped,
            "genres": self.genres,
            "edges": self.edges,
            "bfs_runs": self.bfs_runs,
            "dfs_runs": self.dfs_runs,
            "labels_visited": self.labels_visited,
            "traversals_cancelled": self.traversals_cancelled,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(kind: TraversalKind, n: usize) -> TraversalOutcome {
        TraversalOutcome {
            kind,
            genre: "Indie".into(),
            visited: (0..n).map(|i| format!("g{i}")).collect(),
            elapsed: Duration::from_millis(5),
            start_count: n,
        }
    }

    #[test]
    fn init_logging_does_not_panic() {
        init_logging(false);
        // Second call should also not panic (try_init ignores re-init).
        init_logging(true);
    }

    #[test]
    fn metrics_new_has_zero_values() {
        let m = Metrics::new();
        assert_eq!(m.builds, 0);
        assert_eq!(m.traversals(), 0);
        assert!(m.build_duration.is_none());
    }

    #[test]
    fn record_build_overwrites_graph_size() {
        let mut m = Metrics::new();
        let mut stats = BuildStats {
            rows_read: 10,
            rows_skipped: 1,
            genres: 4,
            edges: 12,
            elapsed: Duration::from_millis(30),
        };
        m.record_build(&stats);
        stats.genres = 2;
        m.record_build(&stats);
        assert_eq!(m.builds, 2);
        assert_eq!(m.genres, 2);
        assert_eq!(m.build_duration, Some(Duration::from_millis(30)));
    }

    #[test]
    fn record_traversal_counts_by_kind() {
        let mut m = Metrics::new();
        m.record_traversal(&outcome(TraversalKind::Bfs, 3));
        m.record_traversal(&outcome(TraversalKind::Dfs, 5));
        m.record_traversal(&outcome(TraversalKind::Dfs, 1));
        assert_eq!(m.bfs_runs, 1);
        assert_eq!(m.dfs_runs, 2);
        assert_eq!(m.labels_visited, 9);
        assert!((m.mean_visited() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mean_visited_zero_runs() {
        assert_eq!(Metrics::new().mean_visited(), 0.0);
    }

    #[test]
    fn metrics_to_json_contains_all_fields() {
        let mut m = Metrics::new();
        m.record_traversal(&outcome(TraversalKind::Bfs, 2));
        m.record_cancelled();
        let json = m.to_json();
        assert!(json["build_duration_ms"].is_null());
        assert_eq!(json["bfs_runs"], 1);
        assert_eq!(json["labels_visited"], 2);
        assert_eq!(json["traversals_cancelled"], 1);
    }
}
