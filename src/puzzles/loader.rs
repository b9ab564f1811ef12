use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::{info, warn};
use serde_json::Value;

use super::PuzzleRepository;
use crate::models::PuzzleRecord;

/// Where the puzzles in a repository came from after startup loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PuzzleSource {
    /// The puzzle file was absent or unusable; only builtins are loaded.
    BuiltinOnly { reason: String },
    /// The puzzle file was read; `skipped` entries were malformed or unsolvable.
    Extended { added: usize, skipped: usize },
}

/// Extends `repo` from the JSON puzzle file at `path`. Never fails: any
/// problem with the file leaves the builtins in place and is reported in the
/// returned [`PuzzleSource`].
pub fn load_with_fallback(repo: &mut PuzzleRepository, path: &Path) -> PuzzleSource {
    if !path.exists() {
        let reason = format!("no puzzle file at {}", path.display());
        info!("{reason}; using builtin puzzles");
        return PuzzleSource::BuiltinOnly { reason };
    }

    let entries = match read_puzzle_file(path) {
        Ok(entries) => entries,
        Err(err) => {
            let reason = format!("{err:#}");
            warn!("Ignoring puzzle file: {reason}");
            return PuzzleSource::BuiltinOnly { reason };
        }
    };

    let mut records = Vec::with_capacity(entries.len());
    let mut malformed = 0;
    for entry in entries {
        match serde_json::from_value::<PuzzleRecord>(entry) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!("Skipping malformed puzzle entry: {err}");
                malformed += 1;
            }
        }
    }

    let (added, skipped) = repo.extend(records);
    info!(
        "Loaded {added} puzzles from {} ({} skipped); {} total",
        path.display(),
        skipped + malformed,
        repo.len()
    );

    PuzzleSource::Extended {
        added,
        skipped: skipped + malformed,
    }
}

fn read_puzzle_file(path: &Path) -> Result<Vec<Value>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read puzzles from {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Puzzle file {} is not a JSON array", path.display()))
}
