use crate::models::{Difficulty, PuzzleRecord};

/// The puzzles shipped with the app. Always present, even when the puzzle
/// file is missing or broken.
pub fn builtin_puzzles() -> Vec<PuzzleRecord> {
    vec![
        PuzzleRecord::new(
            "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1",
            "Find the best move for White",
            "f3e5", // Nxe5
            Difficulty::Easy,
        ),
        PuzzleRecord::new(
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 0 1",
            "Find the fork",
            "f3g5",
            Difficulty::Easy,
        ),
        PuzzleRecord::new(
            "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 1",
            "Find the best defense",
            "g7g6", // covers f7 and hits the queen
            Difficulty::Medium,
        ),
        PuzzleRecord::new(
            "r3k2r/pp3ppp/2p5/4Pb2/2B2P2/8/PPP3PP/R3K2R w KQkq - 0 1",
            "Find the forcing move",
            "c4f7",
            Difficulty::Easy,
        ),
        PuzzleRecord::new(
            "3r1rk1/pp3ppp/2p5/8/3P4/8/PPP2PPP/R3K2R w KQ - 0 1",
            "Find the best move",
            "e1c1", // O-O-O
            Difficulty::Medium,
        ),
        PuzzleRecord::new(
            "r1bq1rk1/pp2ppbp/2np1np1/8/2BNP3/2N1BP2/PPP3PP/R2QK2R w KQ - 0 1",
            "Find the best move for White",
            "d4f5",
            Difficulty::Medium,
        ),
        PuzzleRecord::new(
            "r4rk1/pp1n1ppp/2p1p3/q2p4/8/P1NPP1P1/1PPQ1PBP/R3K2R w KQ - 0 1",
            "Find the best move for White",
            "d3d4",
            Difficulty::Medium,
        ),
        PuzzleRecord::new(
            "r1b1kb1r/pp3ppp/2n1pn2/q1pp4/3P4/P1N1PN2/1PP1BPPP/R1BQK2R w KQkq - 0 1",
            "Find a strong developing move",
            "c1d2", // breaks the pin on c3
            Difficulty::Medium,
        ),
        PuzzleRecord::new(
            "r3kb1r/ppp2ppp/2n1b3/3q4/3pN3/8/PPP2PPP/RNBQR1K1 w kq - 0 1",
            "Find the winning tactic",
            "e4d6",
            Difficulty::Easy,
        ),
        PuzzleRecord::new(
            "2r3k1/pp2ppbp/3p2p1/3P4/3b4/P4N2/1P3PPP/2B1R1K1 w - - 0 1",
            "Find the best move for White",
            "c1h6",
            Difficulty::Hard,
        ),
    ]
}
