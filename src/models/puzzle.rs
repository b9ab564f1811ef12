use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::AlarmError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Easy
    }
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AlarmError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(AlarmError::InvalidInput(format!(
                "unknown difficulty '{other}'"
            ))),
        }
    }
}

/// A stored puzzle. Field names follow the on-disk puzzle file
/// (`fen`, `description`, `solution`, `difficulty`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PuzzleRecord {
    #[serde(rename = "fen")]
    pub position: String,
    pub description: String,
    /// Single solution move in UCI notation, e.g. `f3e5` or `e7e8q`.
    #[serde(rename = "solution")]
    pub solution_move: String,
    pub difficulty: Difficulty,
}

impl PuzzleRecord {
    pub fn new(
        position: impl Into<String>,
        description: impl Into<String>,
        solution_move: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            position: position.into(),
            description: description.into(),
            solution_move: solution_move.into(),
            difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" HARD ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!(matches!(
            "brutal".parse::<Difficulty>(),
            Err(AlarmError::InvalidInput(_))
        ));
    }

    #[test]
    fn record_uses_puzzle_file_field_names() {
        let json = r#"{
            "fen": "8/8/8/8/8/8/8/K1k5 w - - 0 1",
            "description": "Find the best move",
            "solution": "a1a2",
            "difficulty": "medium"
        }"#;

        let record: PuzzleRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.solution_move, "a1a2");
        assert_eq!(record.difficulty, Difficulty::Medium);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["solution"], "a1a2");
        assert_eq!(back["difficulty"], "medium");
    }
}
