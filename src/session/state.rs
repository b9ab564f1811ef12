use serde::{Deserialize, Serialize};

use crate::{
    chess_rules::{ChessPosition, PuzzleMove},
    models::PuzzleRecord,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    NoPuzzle,
    Active,
    Solved,
}

impl Default for SessionPhase {
    fn default() -> Self {
        SessionPhase::NoPuzzle
    }
}

/// Identifies one `start_session` call. A newer session always carries a
/// larger ticket, and submissions made against an older one are refused.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionTicket(pub u64);

/// One presented puzzle. Owns its board; replaced wholesale by the next
/// session rather than mutated by it.
#[derive(Debug, Clone)]
pub struct PuzzleSession {
    pub ticket: SessionTicket,
    pub puzzle: PuzzleRecord,
    pub board: ChessPosition,
    /// Copied at start so the repository cannot change it mid-session.
    pub expected_move: PuzzleMove,
    pub phase: SessionPhase,
}

impl PuzzleSession {
    pub fn accepts_moves(&self) -> bool {
        self.phase == SessionPhase::Active
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SolvedKind {
    /// The move stopped a ringing alarm.
    AlarmStopped,
    /// Practice puzzle; no alarm was ringing.
    PuzzleSolved,
}

impl SolvedKind {
    pub fn message(&self) -> &'static str {
        match self {
            SolvedKind::AlarmStopped => "Great job! The alarm has been turned off.",
            SolvedKind::PuzzleSolved => "That's the correct move! Puzzle solved.",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum MoveRejection {
    InvalidInput,
    IllegalMove,
    WrongMove,
    /// No puzzle loaded, or the current one is already solved.
    NotAccepting,
    /// The move was aimed at a puzzle that has since been replaced.
    Superseded,
}

impl MoveRejection {
    pub fn message(&self) -> &'static str {
        match self {
            MoveRejection::InvalidInput => {
                "Please enter a valid chess move (e.g., e2e4 or Nf3)."
            }
            MoveRejection::IllegalMove => "That move is not legal in this position.",
            MoveRejection::WrongMove => {
                "That's not the best move for this position. Try again!"
            }
            MoveRejection::NotAccepting => "There is no puzzle waiting for a move.",
            MoveRejection::Superseded => "That puzzle was replaced by a new one.",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", content = "kind", rename_all = "camelCase")]
pub enum SubmitOutcome {
    Accepted(SolvedKind),
    Rejected(MoveRejection),
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted(_))
    }

    pub fn message(&self) -> &'static str {
        match self {
            SubmitOutcome::Accepted(kind) => kind.message(),
            SubmitOutcome::Rejected(reason) => reason.message(),
        }
    }
}

/// Result of loading a puzzle for a firing alarm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmSession {
    pub snapshot: SessionSnapshot,
    /// False when the alarm joined a ring that was already going.
    pub started_ringing: bool,
}

/// What a front end needs to draw the puzzle panel.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub ticket: Option<SessionTicket>,
    pub phase: SessionPhase,
    pub description: Option<String>,
    /// Board as `<placement> <side>`, e.g. `rnbqkbnr/... w`.
    pub board: Option<String>,
}

impl SessionSnapshot {
    pub fn empty() -> Self {
        Self {
            ticket: None,
            phase: SessionPhase::NoPuzzle,
            description: None,
            board: None,
        }
    }

    pub fn of(session: &PuzzleSession) -> Self {
        Self {
            ticket: Some(session.ticket),
            phase: session.phase,
            description: Some(session.puzzle.description.clone()),
            board: Some(session.board.to_string()),
        }
    }
}
