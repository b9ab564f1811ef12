pub mod builtin;
pub mod loader;

pub use builtin::builtin_puzzles;
pub use loader::{load_with_fallback, PuzzleSource};

use log::warn;
use rand::seq::SliceRandom;

use crate::{
    chess_rules,
    error::{AlarmError, Result},
    models::{Difficulty, PuzzleRecord},
};

/// Append-only, in-memory puzzle collection. Never empty once constructed.
#[derive(Debug, Clone)]
pub struct PuzzleRepository {
    records: Vec<PuzzleRecord>,
}

impl PuzzleRepository {
    /// Seeds the repository. Every record must load and carry a legal
    /// solution; a broken seed fails the whole load.
    pub fn load(builtins: Vec<PuzzleRecord>) -> Result<Self> {
        if builtins.is_empty() {
            return Err(AlarmError::NoPuzzles);
        }
        for (index, record) in builtins.iter().enumerate() {
            validate_record(index, record)?;
        }
        Ok(Self { records: builtins })
    }

    /// Skips validation, for exercising how callers cope with a broken record.
    #[cfg(test)]
    pub(crate) fn unchecked(records: Vec<PuzzleRecord>) -> Self {
        Self { records }
    }

    /// Appends external records, skipping any that fail validation.
    /// Returns `(added, skipped)`.
    pub fn extend(&mut self, external: Vec<PuzzleRecord>) -> (usize, usize) {
        let mut added = 0;
        let mut skipped = 0;
        for record in external {
            let index = self.records.len();
            match validate_record(index, &record) {
                Ok(()) => {
                    self.records.push(record);
                    added += 1;
                }
                Err(err) => {
                    warn!("Skipping external puzzle: {err}");
                    skipped += 1;
                }
            }
        }
        (added, skipped)
    }

    /// Uniform choice among records of `difficulty`, or among all records if
    /// none match.
    pub fn pick_by_difficulty(&self, difficulty: Difficulty) -> Result<PuzzleRecord> {
        let matching: Vec<&PuzzleRecord> = self
            .records
            .iter()
            .filter(|record| record.difficulty == difficulty)
            .collect();

        if matching.is_empty() {
            warn!("No {difficulty} puzzles available; picking from the full set");
            return self.pick_any();
        }

        matching
            .choose(&mut rand::thread_rng())
            .map(|record| (*record).clone())
            .ok_or(AlarmError::NoPuzzles)
    }

    pub fn pick_any(&self) -> Result<PuzzleRecord> {
        self.records
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or(AlarmError::NoPuzzles)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn all(&self) -> &[PuzzleRecord] {
        &self.records
    }
}

fn validate_record(index: usize, record: &PuzzleRecord) -> Result<()> {
    let invalid = |reason: String| AlarmError::InvalidPuzzle { index, reason };

    let position =
        chess_rules::load_position(&record.position).map_err(|err| invalid(err.to_string()))?;
    let solution = chess_rules::parse_uci(&record.solution_move.to_ascii_lowercase())
        .map_err(|err| invalid(err.to_string()))?;

    if !chess_rules::is_legal(&position, &solution) {
        return Err(invalid(format!(
            "solution {solution} is not legal in '{}'",
            record.position
        )));
    }
    Ok(())
}
