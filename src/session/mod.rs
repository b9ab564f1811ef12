pub mod controller;
pub mod state;

pub use controller::{interpret_move, PuzzleController};
pub use state::{
    AlarmSession, MoveRejection, PuzzleSession, SessionPhase, SessionSnapshot, SessionTicket,
    SolvedKind, SubmitOutcome,
};
