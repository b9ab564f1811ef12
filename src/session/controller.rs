use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;

use crate::{
    alarm::AlarmRing,
    chess_rules::{self, ChessPosition, PuzzleMove},
    error::{AlarmError, Result},
    events::{AlarmEvent, EventBroadcaster},
    models::{Difficulty, PuzzleRecord},
    puzzles::PuzzleRepository,
};

use super::{
    AlarmSession, MoveRejection, PuzzleSession, SessionPhase, SessionSnapshot, SessionTicket, SolvedKind,
    SubmitOutcome,
};

#[derive(Default)]
struct SessionSlot {
    issued: u64,
    current: Option<PuzzleSession>,
}

/// Owns the single live puzzle session and checks submitted moves against it.
#[derive(Clone)]
pub struct PuzzleController {
    slot: Arc<Mutex<SessionSlot>>,
    repo: Arc<PuzzleRepository>,
    ring: AlarmRing,
    events: EventBroadcaster,
}

impl PuzzleController {
    pub fn new(repo: Arc<PuzzleRepository>, ring: AlarmRing, events: EventBroadcaster) -> Self {
        Self {
            slot: Arc::new(Mutex::new(SessionSlot::default())),
            repo,
            ring,
            events,
        }
    }

    pub fn repository(&self) -> &PuzzleRepository {
        &self.repo
    }

    /// Replaces whatever session is live with a fresh one for `record`.
    pub async fn start_session(&self, record: PuzzleRecord) -> Result<SessionSnapshot> {
        let (snapshot, _) = self.install(record, false).await?;
        Ok(snapshot)
    }

    /// Loads a puzzle of `difficulty` for a firing alarm and starts the ring
    /// in the same critical section, so no move can be checked against the
    /// new session while the ring is still idle.
    pub async fn start_for_alarm(&self, difficulty: Difficulty) -> Result<AlarmSession> {
        let record = self.repo.pick_by_difficulty(difficulty)?;
        let (snapshot, started_ringing) = self.install(record, true).await?;
        Ok(AlarmSession {
            snapshot,
            started_ringing,
        })
    }

    async fn install(
        &self,
        record: PuzzleRecord,
        ring_alarm: bool,
    ) -> Result<(SessionSnapshot, bool)> {
        let board = chess_rules::load_position(&record.position)?;
        let expected_move = chess_rules::parse_uci(&record.solution_move.to_ascii_lowercase())?;

        let (session, started_ringing) = {
            let mut slot = self.slot.lock().await;
            slot.issued += 1;
            let session = PuzzleSession {
                ticket: SessionTicket(slot.issued),
                puzzle: record,
                board,
                expected_move,
                phase: SessionPhase::Active,
            };
            slot.current = Some(session.clone());
            let started_ringing = ring_alarm && self.ring.start_ringing();
            (session, started_ringing)
        };

        info!(
            "Puzzle session {} started: {} ({})",
            session.ticket.0, session.puzzle.description, session.puzzle.difficulty
        );
        self.events.emit(AlarmEvent::PuzzleLoaded {
            ticket: session.ticket,
            description: session.puzzle.description.clone(),
            difficulty: session.puzzle.difficulty,
        });

        Ok((SessionSnapshot::of(&session), started_ringing))
    }

    /// Manual practice: any puzzle, no alarm involved.
    pub async fn start_practice(&self) -> Result<SessionSnapshot> {
        let record = self.repo.pick_any()?;
        self.start_session(record).await
    }

    /// Checks `text` against whatever session is live right now.
    pub async fn submit_move(&self, text: &str) -> SubmitOutcome {
        let mut slot = self.slot.lock().await;
        self.submit_locked(&mut slot, None, text)
    }

    /// Checks `text` against the session identified by `ticket`, refusing it
    /// if that session has been replaced.
    pub async fn submit_move_for(&self, ticket: SessionTicket, text: &str) -> SubmitOutcome {
        let mut slot = self.slot.lock().await;
        self.submit_locked(&mut slot, Some(ticket), text)
    }

    pub async fn current_board_state(&self) -> Option<ChessPosition> {
        let slot = self.slot.lock().await;
        slot.current.as_ref().map(|session| session.board.clone())
    }

    pub async fn current_description(&self) -> Option<String> {
        let slot = self.slot.lock().await;
        slot.current
            .as_ref()
            .map(|session| session.puzzle.description.clone())
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let slot = self.slot.lock().await;
        slot.current
            .as_ref()
            .map(SessionSnapshot::of)
            .unwrap_or_else(SessionSnapshot::empty)
    }

    fn submit_locked(
        &self,
        slot: &mut SessionSlot,
        ticket: Option<SessionTicket>,
        text: &str,
    ) -> SubmitOutcome {
        let Some(session) = slot.current.as_mut() else {
            return SubmitOutcome::Rejected(MoveRejection::NotAccepting);
        };
        if ticket.is_some_and(|ticket| ticket != session.ticket) {
            return SubmitOutcome::Rejected(MoveRejection::Superseded);
        }
        if !session.accepts_moves() {
            return SubmitOutcome::Rejected(MoveRejection::NotAccepting);
        }

        let mv = match interpret_move(text, &session.board) {
            Ok(mv) => mv,
            Err(AlarmError::IllegalMove(_)) => {
                return SubmitOutcome::Rejected(MoveRejection::IllegalMove)
            }
            Err(_) => return SubmitOutcome::Rejected(MoveRejection::InvalidInput),
        };

        if !chess_rules::is_legal(&session.board, &mv) {
            return SubmitOutcome::Rejected(MoveRejection::IllegalMove);
        }
        if mv != session.expected_move {
            info!("Session {}: {mv} is legal but not the solution", session.ticket.0);
            return SubmitOutcome::Rejected(MoveRejection::WrongMove);
        }

        match chess_rules::apply(&session.board, &mv) {
            Ok(next) => session.board = next,
            Err(_) => return SubmitOutcome::Rejected(MoveRejection::IllegalMove),
        }
        session.phase = SessionPhase::Solved;

        let kind = if self.ring.dismiss() {
            info!("Session {} solved; alarm dismissed", session.ticket.0);
            self.events.emit(AlarmEvent::AlarmDismissed);
            SolvedKind::AlarmStopped
        } else {
            info!("Session {} solved", session.ticket.0);
            SolvedKind::PuzzleSolved
        };
        self.events.emit(AlarmEvent::PuzzleSolved {
            ticket: session.ticket,
        });

        SubmitOutcome::Accepted(kind)
    }
}

/// Turns player text into a move for `board`.
///
/// Four characters are read as UCI (`f3e5`); five with an `x` in the middle
/// as UCI with a capture marker (`f3xe5`). Either form that fails to parse is
/// invalid input, even when it would be SAN (`Nxe5`). Anything else is read
/// as SAN, then as a five-letter UCI promotion (`e7e8q`).
pub fn interpret_move(text: &str, board: &ChessPosition) -> Result<PuzzleMove> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AlarmError::InvalidInput("empty move".into()));
    }
    let lowered = trimmed.to_ascii_lowercase();
    let chars: Vec<char> = lowered.chars().collect();

    match chars.len() {
        4 => return chess_rules::parse_uci(&lowered),
        5 if chars[2] == 'x' => {
            let stripped: String = [chars[0], chars[1], chars[3], chars[4]].iter().collect();
            return chess_rules::parse_uci(&stripped);
        }
        _ => {}
    }

    match chess_rules::parse_san(trimmed, board) {
        Ok(mv) => Ok(mv),
        Err(AlarmError::InvalidInput(reason)) => {
            chess_rules::parse_uci(&lowered).map_err(|_| AlarmError::InvalidInput(reason))
        }
        Err(err) => Err(err),
    }
}
