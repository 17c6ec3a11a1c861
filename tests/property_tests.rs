//! Property-based tests for genregraph using proptest.
//!
//! These tests verify invariants that must hold for all possible inputs,
//! finding edge cases that unit tests might miss.

use std::collections::HashSet;

use proptest::prelude::*;

use genregraph::graph::traversal::Silent;
use genregraph::graph::{GenreGraph, GraphTraversal, TraversalOptions};
use genregraph::types::{GameRecord, TraversalKind};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Labels drawn from a small alphabet so game names often collide with
/// genre keys, which is what makes traversal go beyond one hop.
fn arb_label() -> impl Strategy<Value = String> {
    "[A-F]{1,2}"
}

fn arb_record() -> impl Strategy<Value = GameRecord> {
    (
        prop::option::weighted(0.9, arb_label()),
        prop::option::weighted(0.9, prop::collection::vec(arb_label(), 1..4)),
    )
        .prop_map(|(name, genres)| GameRecord {
            name,
            genres: genres.map(|g| g.join("||")),
        })
}

fn arb_records() -> impl Strategy<Value = Vec<GameRecord>> {
    prop::collection::vec(arb_record(), 0..60)
}

fn run(graph: &GenreGraph, kind: TraversalKind, genre: &str) -> Vec<String> {
    GraphTraversal::new(graph)
        .run(kind, genre, &TraversalOptions::default(), &mut Silent)
        .unwrap()
        .visited
}

/// Everything reachable from `genre`'s games, computed independently.
fn reachable(graph: &GenreGraph, genre: &str) -> HashSet<String> {
    let mut seen = HashSet::new();
    let mut todo: Vec<String> = graph.games(genre).to_vec();
    while let Some(label) = todo.pop() {
        if seen.insert(label.clone()) {
            todo.extend(graph.games(&label).iter().cloned());
        }
    }
    seen
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// Every game under genre G had G in its split genres field.
    #[test]
    fn every_edge_comes_from_an_input_row(records in arb_records()) {
        let graph = GenreGraph::from_records(&records);
        for genre in graph.genres() {
            for game in graph.games(genre) {
                let backed = records.iter().any(|r| match r.fields() {
                    Some((name, genres)) => name == game && genres.split("||").any(|g| g == genre),
                    None => false,
                });
                prop_assert!(backed, "{game} under {genre} has no source row");
            }
        }
    }

    #[test]
    fn keys_always_have_games(records in arb_records()) {
        let graph = GenreGraph::from_records(&records);
        prop_assert!(graph.as_map().values().all(|games| !games.is_empty()));
    }

    #[test]
    fn build_is_deterministic(records in arb_records()) {
        prop_assert_eq!(GenreGraph::from_records(&records), GenreGraph::from_records(&records));
    }

    #[test]
    fn edge_count_matches_split_genres(records in arb_records()) {
        let graph = GenreGraph::from_records(&records);
        let expected: usize = records
            .iter()
            .filter_map(GameRecord::fields)
            .map(|(_, genres)| genres.split("||").count())
            .sum();
        prop_assert_eq!(graph.edge_count(), expected);
    }

    #[test]
    fn bfs_and_dfs_visit_the_same_set(records in arb_records(), genre in arb_label()) {
        let graph = GenreGraph::from_records(&records);
        let bfs: HashSet<String> = run(&graph, TraversalKind::Bfs, &genre).into_iter().collect();
        let dfs: HashSet<String> = run(&graph, TraversalKind::Dfs, &genre).into_iter().collect();
        prop_assert_eq!(bfs.len(), dfs.len());
        prop_assert_eq!(bfs, dfs);
    }

    #[test]
    fn traversal_never_repeats_and_stays_reachable(
        records in arb_records(),
        genre in arb_label(),
        dfs in any::<bool>(),
    ) {
        let graph = GenreGraph::from_records(&records);
        let kind = if dfs { TraversalKind::Dfs } else { TraversalKind::Bfs };
        let visited = run(&graph, kind, &genre);
        let unique: HashSet<&String> = visited.iter().collect();
        prop_assert_eq!(unique.len(), visited.len());

        let expected = reachable(&graph, &genre);
        prop_assert_eq!(visited.len(), expected.len());
        prop_assert!(visited.iter().all(|v| expected.contains(v)));
    }

    #[test]
    fn absent_genre_yields_nothing(records in arb_records()) {
        let graph = GenreGraph::from_records(&records);
        prop_assert!(run(&graph, TraversalKind::Bfs, "not-a-genre").is_empty());
        prop_assert!(run(&graph, TraversalKind::Dfs, "not-a-genre").is_empty());
    }
}
