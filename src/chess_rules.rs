//! Narrow adapter over the `shakmaty` rules engine.
//!
//! The rest of the crate never touches `shakmaty` types directly; it only sees
//! [`ChessPosition`] and [`PuzzleMove`]. Moves are compared in their UCI form
//! with standard castling notation (`e1g1`, not king-takes-rook).

use std::fmt;

use shakmaty::{
    fen::Fen,
    san::{SanError, SanPlus},
    uci::UciMove,
    CastlingMode, Chess, Color, Position, Square,
};

use crate::error::{AlarmError, Result};

/// A move in UCI form. Equality is origin, destination and promotion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleMove(UciMove);

impl fmt::Display for PuzzleMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An immutable snapshot of a board. Applying a move yields a new snapshot.
#[derive(Debug, Clone)]
pub struct ChessPosition {
    inner: Chess,
}

impl ChessPosition {
    /// Piece placement field of the FEN, rank 8 first.
    pub fn placement(&self) -> String {
        self.inner.board().to_string()
    }

    pub fn white_to_move(&self) -> bool {
        self.inner.turn() == Color::White
    }

    /// Piece letter on `square` (`N` white knight, `n` black knight), if any.
    pub fn piece_at(&self, square: &str) -> Option<char> {
        let square: Square = square.parse().ok()?;
        self.inner.board().piece_at(square).map(|piece| piece.char())
    }
}

impl fmt::Display for ChessPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.white_to_move() { 'w' } else { 'b' };
        write!(f, "{} {}", self.placement(), side)
    }
}

pub fn load_position(fen: &str) -> Result<ChessPosition> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|err| AlarmError::InvalidPosition(format!("'{fen}': {err}")))?;
    let inner: Chess = parsed
        .into_position(CastlingMode::Standard)
        .map_err(|err| AlarmError::InvalidPosition(format!("'{fen}': {err}")))?;
    Ok(ChessPosition { inner })
}

pub fn legal_moves(position: &ChessPosition) -> Vec<PuzzleMove> {
    position
        .inner
        .legal_moves()
        .iter()
        .map(|m| PuzzleMove(UciMove::from_move(m, CastlingMode::Standard)))
        .collect()
}

pub fn is_legal(position: &ChessPosition, mv: &PuzzleMove) -> bool {
    legal_moves(position).contains(mv)
}

/// Syntactic UCI parse; says nothing about legality.
pub fn parse_uci(text: &str) -> Result<PuzzleMove> {
    text.parse::<UciMove>()
        .map(PuzzleMove)
        .map_err(|_| AlarmError::InvalidInput(format!("'{text}' is not a UCI move")))
}

/// SAN parse against `position`. Well-formed SAN naming no legal move is
/// reported as [`AlarmError::IllegalMove`]; malformed or ambiguous SAN as
/// [`AlarmError::InvalidInput`].
pub fn parse_san(text: &str, position: &ChessPosition) -> Result<PuzzleMove> {
    let san: SanPlus = text
        .parse()
        .map_err(|_| AlarmError::InvalidInput(format!("'{text}' is not a SAN move")))?;

    match san.san.to_move(&position.inner) {
        Ok(m) => Ok(PuzzleMove(UciMove::from_move(&m, CastlingMode::Standard))),
        Err(SanError::AmbiguousSan) => Err(AlarmError::InvalidInput(format!(
            "'{text}' is ambiguous in this position"
        ))),
        Err(_) => Err(AlarmError::IllegalMove(text.to_string())),
    }
}

pub fn apply(position: &ChessPosition, mv: &PuzzleMove) -> Result<ChessPosition> {
    let m = mv
        .0
        .to_move(&position.inner)
        .map_err(|_| AlarmError::IllegalMove(mv.to_string()))?;

    let mut next = position.inner.clone();
    next.play_unchecked(&m);
    Ok(ChessPosition { inner: next })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITALIAN: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1";

    #[test]
    fn rejects_malformed_fen() {
        assert!(matches!(
            load_position("not a fen"),
            Err(AlarmError::InvalidPosition(_))
        ));
        assert!(matches!(
            load_position("8/8/8/8/8/8/8/8 w - - 0 1"),
            Err(AlarmError::InvalidPosition(_))
        ));
    }

    #[test]
    fn uci_parse_is_syntactic_only() {
        assert!(parse_uci("d1d3").is_ok());
        assert!(matches!(parse_uci("z9z9"), Err(AlarmError::InvalidInput(_))));
    }

    #[test]
    fn castling_uses_king_destination() {
        let position = load_position(ITALIAN).unwrap();
        let castle = parse_uci("e1g1").unwrap();
        assert!(is_legal(&position, &castle));

        let after = apply(&position, &castle).unwrap();
        assert_eq!(after.piece_at("g1"), Some('K'));
        assert_eq!(after.piece_at("f1"), Some('R'));
    }

    #[test]
    fn san_resolves_against_position() {
        let position = load_position(ITALIAN).unwrap();
        assert_eq!(parse_san("Nxe5", &position).unwrap(), parse_uci("f3e5").unwrap());
        assert!(matches!(
            parse_san("Qh5", &position),
            Err(AlarmError::IllegalMove(_))
        ));
        assert!(matches!(
            parse_san("hello", &position),
            Err(AlarmError::InvalidInput(_))
        ));
    }

    #[test]
    fn apply_returns_new_snapshot() {
        let position = load_position(ITALIAN).unwrap();
        let after = apply(&position, &parse_uci("f3e5").unwrap()).unwrap();

        assert_eq!(position.piece_at("f3"), Some('N'));
        assert_eq!(after.piece_at("f3"), None);
        assert_eq!(after.piece_at("e5"), Some('N'));
        assert!(!after.white_to_move());
    }
}
