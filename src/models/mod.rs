pub mod alarm;
pub mod puzzle;

pub use alarm::Alarm;
pub use puzzle::{Difficulty, PuzzleRecord};
