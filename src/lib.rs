//! genregraph: genre graph construction and traversal.
//!
//! Loads a game dataset, links every genre to the games tagged with it, and
//! runs breadth-first and depth-first traversals with progress reporting.

pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod observability;
pub mod session;
pub mod types;
