//! Graph layer: in-memory genre graph, builder, traversals, and summaries.

pub mod cancel;
pub mod report;
pub mod store;
pub mod traversal;

pub use cancel::CancellationToken;
pub use store::{BuildStats, GenreGraph, GraphBuilder};
pub use traversal::{GraphTraversal, TraversalOptions, TraversalOutcome};
