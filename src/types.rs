//! Core domain types for genregraph.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// GameRecord
// ---------------------------------------------------------------------------

/// One row of the game dataset.
///
/// Both fields are optional because real exports routinely have empty
/// cells. Rows missing either one never reach the graph.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameRecord {
    pub name: Option<String>,
    /// Delimiter-separated genre labels, e.g. `"Board Games||Strategy"`.
    pub genres: Option<String>,
}

impl GameRecord {
    pub fn new(name: impl Into<String>, genres: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            genres: Some(genres.into()),
        }
    }

    /// Name and genres, or `None` if the row should be skipped.
    pub fn fields(&self) -> Option<(&str, &str)> {
        match (self.name.as_deref(), self.genres.as_deref()) {
            (Some(name), Some(genres)) => Some((name, genres)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Genre
// ---------------------------------------------------------------------------

/// The fixed set of genres offered for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Puzzle,
    Indie,
    Arcade,
    Strategy,
    #[serde(rename = "Massively Multiplayer")]
    MassivelyMultiplayer,
    Shooter,
    Platformer,
    Simulation,
    Adventure,
    Racing,
    Casual,
    Educational,
    Sports,
    #[serde(rename = "RPG")]
    Rpg,
    Fighting,
    Family,
    #[serde(rename = "Board Games")]
    BoardGames,
    Card,
}

impl Genre {
    /// Selection order.
    pub const ALL: [Genre; 18] = [
        Self::Puzzle,
        Self::Indie,
        Self::Arcade,
        Self::Strategy,
        Self::MassivelyMultiplayer,
        Self::Shooter,
        Self::Platformer,
        Self::Simulation,
        Self::Adventure,
        Self::Racing,
        Self::Casual,
        Self::Educational,
        Self::Sports,
        Self::Rpg,
        Self::Fighting,
        Self::Family,
        Self::BoardGames,
        Self::Card,
    ];

    /// The label as it appears in the dataset's genres column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Puzzle => "Puzzle",
            Self::Indie => "Indie",
            Self::Arcade => "Arcade",
            Self::Strategy => "Strategy",
            Self::MassivelyMultiplayer => "Massively Multiplayer",
            Self::Shooter => "Shooter",
            Self::Platformer => "Platformer",
            Self::Simulation => "Simulation",
            Self::Adventure => "Adventure",
            Self::Racing => "Racing",
            Self::Casual => "Casual",
            Self::Educational => "Educational",
            Self::Sports => "Sports",
            Self::Rpg => "RPG",
            Self::Fighting => "Fighting",
            Self::Family => "Family",
            Self::BoardGames => "Board Games",
            Self::Card => "Card",
        }
    }

    /// Parse from a loose string: case-insensitive, and `-`, `_` or no
    /// separator are all accepted in place of a space.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        let wanted = normalize(s);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .into_iter()
            .find(|g| normalize(g.label()) == wanted)
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

impl std::fmt::Display for Genre {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| format!("unknown genre: {s}"))
    }
}

// ---------------------------------------------------------------------------
// TraversalKind
// ---------------------------------------------------------------------------

/// Which traversal strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalKind {
    Bfs,
    Dfs,
}

impl TraversalKind {
    /// Human-readable name used in summaries and progress labels.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Bfs => "Breadth First Search",
            Self::Dfs => "Depth First Search",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bfs => "bfs",
            Self::Dfs => "dfs",
        }
    }
}

impl std::fmt::Display for TraversalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq as pa_eq;
    use test_case::test_case;

    #[test]
    fn record_with_both_fields_yields_fields() {
        let r = GameRecord::new("Chess", "Board Games||Strategy");
        pa_eq!(r.fields(), Some(("Chess", "Board Games||Strategy")));
    }

    #[test]
    fn record_missing_a_field_yields_none() {
        let no_name = GameRecord {
            name: None,
            genres: Some("Puzzle".into()),
        };
        let no_genres = GameRecord {
            name: Some("Tetris".into()),
            genres: None,
        };
        assert!(no_name.fields().is_none());
        assert!(no_genres.fields().is_none());
        assert!(GameRecord::default().fields().is_none());
    }

    #[test]
    fn genre_list_has_eighteen_unique_labels() {
        let labels: std::collections::HashSet<_> = Genre::ALL.iter().map(|g| g.label()).collect();
        pa_eq!(labels.len(), 18);
        pa_eq!(Genre::ALL[0], Genre::Puzzle);
        pa_eq!(Genre::ALL[17], Genre::Card);
    }

    #[test_case("Strategy", Some(Genre::Strategy) ; "exact")]
    #[test_case("strategy", Some(Genre::Strategy) ; "lowercase")]
    #[test_case("RPG", Some(Genre::Rpg) ; "acronym")]
    #[test_case("rpg", Some(Genre::Rpg) ; "acronym lowercase")]
    #[test_case("Board Games", Some(Genre::BoardGames) ; "two words")]
    #[test_case("board-games", Some(Genre::BoardGames) ; "hyphenated")]
    #[test_case("massively_multiplayer", Some(Genre::MassivelyMultiplayer) ; "underscored")]
    #[test_case("  Puzzle ", Some(Genre::Puzzle) ; "padded")]
    #[test_case("", None ; "empty")]
    #[test_case("Horror", None ; "not offered")]
    fn genre_from_str_loose(input: &str, expected: Option<Genre>) {
        pa_eq!(Genre::from_str_loose(input), expected);
    }

    #[test]
    fn genre_label_roundtrips_through_loose_parse() {
        for g in Genre::ALL {
            pa_eq!(Genre::from_str_loose(g.label()), Some(g));
            pa_eq!(g.to_string(), g.label());
        }
    }

    #[test]
    fn genre_serde_uses_dataset_labels() {
        let json = serde_json::to_string(&Genre::BoardGames).unwrap();
        pa_eq!(json, "\"Board Games\"");
        let back: Genre = serde_json::from_str("\"RPG\"").unwrap();
        pa_eq!(back, Genre::Rpg);
    }

    #[test]
    fn traversal_kind_titles() {
        pa_eq!(TraversalKind::Bfs.title(), "Breadth First Search");
        pa_eq!(TraversalKind::Dfs.title(), "Depth First Search");
        pa_eq!(TraversalKind::Dfs.to_string(), "dfs");
    }
}
