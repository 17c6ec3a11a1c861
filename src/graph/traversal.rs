//! Breadth-first and depth-first traversal over a [`GenreGraph`].
//!
//! Node identity is the raw string label: genre keys and game names share
//! one namespace. Adjacency only flows from a genre to its games, so a game
//! has outgoing edges only when its name happens to equal a genre key.
//!
//! Both traversals are pure functions of `(graph, start set)`. Progress goes
//! to an injected [`TraversalProgress`] sink and the caller decides how to
//! render it.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::error::Result;
use crate::graph::cancel::CancellationToken;
use crate::graph::store::GenreGraph;
use crate::types::TraversalKind;

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The structured result of one traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct TraversalOutcome {
    pub kind: TraversalKind,
    /// Genre whose game list seeded the traversal.
    pub genre: String,
    /// Distinct labels in visit order.
    pub visited: Vec<String>,
    pub elapsed: Duration,
    /// Distinct labels in the start set.
    pub start_count: usize,
}

impl TraversalOutcome {
    pub fn traversed_count(&self) -> usize {
        self.visited.len()
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind.as_str(),
            "genre": self.genre,
            "traversed_count": self.traversed_count(),
            "start_count": self.start_count,
            "elapsed_secs": self.elapsed.as_secs_f64(),
            "visited": self.visited,
        })
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Receives visit counts while a traversal runs.
pub trait TraversalProgress {
    /// `visited` distinct labels so far; `total` is the start-set size.
    fn on_visit(&mut self, visited: usize, total: usize);
}

impl<F: FnMut(usize, usize)> TraversalProgress for F {
    fn on_visit(&mut self, visited: usize, total: usize) {
        self(visited, total)
    }
}

/// Progress sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl TraversalProgress for Silent {
    fn on_visit(&mut self, _visited: usize, _total: usize) {}
}

/// Fraction of `total` covered by `done`, clamped to `[0, 1]`.
///
/// An empty start set counts as no progress rather than dividing by zero.
pub fn progress_fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (done.min(total) as f64) / (total as f64)
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Knobs shared by both traversal strategies.
#[derive(Debug, Clone, Default)]
pub struct TraversalOptions {
    /// Pause after each visit. Only useful for animating progress bars.
    pub step_delay: Duration,
    /// Report progress every N visits. `0` is treated as `1`.
    pub progress_every: usize,
    pub cancel: CancellationToken,
}

impl TraversalOptions {
    fn every(&self) -> usize {
        self.progress_every.max(1)
    }
}

// ---------------------------------------------------------------------------
// GraphTraversal
// ---------------------------------------------------------------------------

/// Traversal algorithms bound to a graph.
pub struct GraphTraversal<'a> {
    graph: &'a GenreGraph,
}

/// Per-invocation state. Owned by the running traversal only.
struct VisitState<'o, 'p> {
    visited: HashSet<String>,
    order: Vec<String>,
    total: usize,
    opts: &'o TraversalOptions,
    progress: &'p mut dyn TraversalProgress,
}

impl<'o, 'p> VisitState<'o, 'p> {
    fn new(total: usize, opts: &'o TraversalOptions, progress: &'p mut dyn TraversalProgress) -> Self {
        Self {
            visited: HashSet::new(),
            order: Vec::new(),
            total,
            opts,
            progress,
        }
    }

    /// Mark `label` visited. Returns `false` if it already was.
    fn visit(&mut self, label: &str) -> bool {
        if !self.visited.insert(label.to_string()) {
            return false;
        }
        self.order.push(label.to_string());
        if self.order.len() % self.opts.every() == 0 {
            self.progress.on_visit(self.order.len(), self.total);
        }
        if !self.opts.step_delay.is_zero() {
            std::thread::sleep(self.opts.step_delay);
        }
        true
    }

    fn finish(self) -> Vec<String> {
        if self.order.len() % self.opts.every() != 0 || self.order.is_empty() {
            self.progress.on_visit(self.order.len(), self.total);
        }
        self.order
    }
}

impl<'a> GraphTraversal<'a> {
    pub fn new(graph: &'a GenreGraph) -> Self {
        Self { graph }
    }

    /// Distinct labels in `genre`'s game list. This is the progress total
    /// reported by [`run`](Self::run).
    pub fn start_count(&self, genre: &str) -> usize {
        distinct(self.graph.games(genre))
    }

    /// Breadth-first traversal seeded with the games listed under `genre`.
    pub fn bfs(
        &self,
        genre: &str,
        opts: &TraversalOptions,
        progress: &mut dyn TraversalProgress,
    ) -> Result<TraversalOutcome> {
        self.run(TraversalKind::Bfs, genre, opts, progress)
    }

    /// Depth-first traversal seeded with the games listed under `genre`.
    pub fn dfs(
        &self,
        genre: &str,
        opts: &TraversalOptions,
        progress: &mut dyn TraversalProgress,
    ) -> Result<TraversalOutcome> {
        self.run(TraversalKind::Dfs, genre, opts, progress)
    }

    /// Run `kind` from `graph.games(genre)`. An unknown genre yields an
    /// empty outcome, not an error.
    pub fn run(
        &self,
        kind: TraversalKind,
        genre: &str,
        opts: &TraversalOptions,
        progress: &mut dyn TraversalProgress,
    ) -> Result<TraversalOutcome> {
        let start = self.graph.games(genre);
        let started = Instant::now();
        let visited = match kind {
            TraversalKind::Bfs => self.bfs_from(start, opts, progress)?,
            TraversalKind::Dfs => self.dfs_from(start, opts, progress)?,
        };
        let outcome = TraversalOutcome {
            kind,
            genre: genre.to_string(),
            start_count: self.start_count(genre),
            elapsed: started.elapsed(),
            visited,
        };
        info!(
            kind = %kind,
            genre,
            traversed = outcome.traversed_count(),
            elapsed_ms = outcome.elapsed.as_millis() as u64,
            "traversal finished"
        );
        Ok(outcome)
    }

    // -------------------------------------------------------------------
    // bfs_from
    // -------------------------------------------------------------------

    /// Breadth-first visit order from an explicit start set.
    ///
    /// A label is marked on its first dequeue; its adjacency goes to the
    /// back of the queue.
    pub fn bfs_from(
        &self,
        start: &[String],
        opts: &TraversalOptions,
        progress: &mut dyn TraversalProgress,
    ) -> Result<Vec<String>> {
        let mut state = VisitState::new(distinct(start), opts, progress);
        let mut queue: VecDeque<&str> = start.iter().map(String::as_str).collect();

        while let Some(label) = queue.pop_front() {
            opts.cancel.check()?;
            if !state.visit(label) {
                continue;
            }
            queue.extend(
                self.graph
                    .games(label)
                    .iter()
                    .map(String::as_str)
                    .filter(|n| !state.visited.contains(*n)),
            );
        }

        debug!(visited = state.order.len(), "bfs drained queue");
        Ok(state.finish())
    }

    // -------------------------------------------------------------------
    // dfs_from
    // -------------------------------------------------------------------

    /// Depth-first preorder from an explicit start set.
    ///
    /// Uses an explicit stack so chain length is bounded by heap, not by the
    /// thread's stack. Children are pushed in reverse so the first neighbour
    /// is expanded first, giving the same order as the recursive form.
    pub fn dfs_from(
        &self,
        start: &[String],
        opts: &TraversalOptions,
        progress: &mut dyn TraversalProgress,
    ) -> Result<Vec<String>> {
        let mut state = VisitState::new(distinct(start), opts, progress);

        for root in start {
            let mut stack: Vec<&str> = vec![root.as_str()];
            while let Some(label) = stack.pop() {
                opts.cancel.check()?;
                if !state.visit(label) {
                    continue;
                }
                stack.extend(
                    self.graph
                        .games(label)
                        .iter()
                        .rev()
                        .map(String::as_str)
                        .filter(|n| !state.visited.contains(*n)),
                );
            }
        }

        debug!(visited = state.order.len(), "dfs exhausted stack");
        Ok(state.finish())
    }
}

fn distinct(labels: &[String]) -> usize {
    labels.iter().collect::<HashSet<_>>().len()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
