//! Human-readable traversal summaries.
//!
//! The text layout matches what the results pane has always shown, so logs
//! from older runs stay comparable.

use std::fmt::Write as _;

use crate::graph::traversal::TraversalOutcome;
use crate::types::TraversalKind;

/// Width of the dashed rule under each summary header.
const RULE: &str = "---------------------------------------";

/// Header line announcing a traversal of `genre`.
pub fn header(kind: TraversalKind, genre: &str) -> String {
    format!("{} Traversal of {} Games:\n{}\n", kind.title(), genre, RULE)
}

/// Elapsed time and visited count, followed by a blank line.
pub fn summary(outcome: &TraversalOutcome) -> String {
    format!(
        "{} Time Elapsed: {:.2} Seconds\nTraversed {} {} games\n\n",
        outcome.kind.title(),
        outcome.elapsed.as_secs_f64(),
        outcome.traversed_count(),
        outcome.genre,
    )
}

/// Header plus summary, as appended to the results log.
pub fn full_block(outcome: &TraversalOutcome) -> String {
    let mut out = header(outcome.kind, &outcome.genre);
    out.push_str(&summary(outcome));
    out
}

/// Numbered list of the first `limit` visited labels.
pub fn preview(outcome: &TraversalOutcome, limit: usize) -> String {
    let mut out = String::new();
    for (i, label) in outcome.visited.iter().take(limit).enumerate() {
        let _ = writeln!(out, "{:>5}. {}", i + 1, label);
    }
    let rest = outcome.traversed_count().saturating_sub(limit);
    if rest > 0 {
        let _ = writeln!(out, "      ... and {rest} more");
    }
    out
}
