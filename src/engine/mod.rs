pub mod utils;

use std::str::FromStr;

use chess::{Board, BoardStatus, ChessMove, Color, MoveGen, Piece, Square};
use log::debug;

use crate::error::GameError;
use crate::models::CandidateMove;

/// FEN of the fixed starting layout every game begins from.
pub const INITIAL_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// Wraps the rules-complete move generator around a single mutable
/// "loaded position".
///
/// Every mutation is either a validated single-move application or a full
/// reload from an authoritative serialization; a failed operation never
/// leaves a partially mutated position behind.
///
/// The `chess` crate's `Board` does not carry the half-move clock or the
/// full-move number, so the engine tracks both alongside it and splices them
/// into the serialization.
pub struct PositionEngine {
    board: Board,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for PositionEngine {
    fn default() -> Self {
        PositionEngine::new()
    }
}

impl PositionEngine {
    /// Engine loaded with the starting position.
    pub fn new() -> PositionEngine {
        PositionEngine {
            board: Board::default(),
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// Replace the loaded position with a parsed serialization.
    ///
    /// Only the canonical six-field form is accepted. Fails with
    /// `MalformedPosition` if the string is not a syntactically and
    /// semantically valid board state; on failure the currently loaded
    /// position is untouched.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), GameError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(GameError::MalformedPosition(format!(
                "expected 6 fields, got {}",
                fields.len()
            )));
        }
        let halfmove_clock = fields[4].parse::<u32>().map_err(|_| {
            GameError::MalformedPosition(format!("bad half-move clock {:?}", fields[4]))
        })?;
        let fullmove_number = fields[5].parse::<u32>().map_err(|_| {
            GameError::MalformedPosition(format!("bad full-move number {:?}", fields[5]))
        })?;
        let board = Board::from_str(fen)
            .map_err(|e| GameError::MalformedPosition(e.to_string()))?;

        self.board = board;
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number.max(1);
        Ok(())
    }

    /// Reload the fixed starting position.
    pub fn reset_to_initial(&mut self) {
        *self = PositionEngine::new();
    }

    /// Legal destination squares for the piece on `from`.
    ///
    /// Empty when the square is empty, holds the opponent's piece, or every
    /// move from it would leave the mover's own king in check.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut destinations = Vec::new();
        for mv in MoveGen::new_legal(&self.board) {
            // The three promotion variants share one destination square.
            if mv.get_source() == from && !destinations.contains(&mv.get_dest()) {
                destinations.push(mv.get_dest());
            }
        }
        destinations
    }

    /// Apply a single validated move, returning the new serialization.
    ///
    /// Fails with `IllegalMove` (leaving the position unchanged) when the
    /// destination is not reachable, a pawn reaches the last rank without a
    /// promotion piece, or a promotion piece is given for a non-promoting
    /// move.
    pub fn apply_move(&mut self, mv: &CandidateMove) -> Result<String, GameError> {
        let chess_move = ChessMove::new(mv.from, mv.to, mv.promotion);
        let legal = MoveGen::new_legal(&self.board).any(|m| m == chess_move);
        if !legal {
            return Err(GameError::IllegalMove(self.explain_illegal(mv)));
        }

        let moved_pawn = self.board.piece_on(mv.from) == Some(Piece::Pawn);
        let occupied_before = self.board.combined().popcnt();
        let next = self.board.make_move_new(chess_move);
        let captured = next.combined().popcnt() < occupied_before;

        if moved_pawn || captured {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }
        if self.board.side_to_move() == Color::Black {
            self.fullmove_number += 1;
        }
        self.board = next;

        let fen = self.current_fen();
        debug!("applied move {} -> {}", mv, fen);
        Ok(fen)
    }

    /// Canonical serialization of the loaded position.
    ///
    /// Round-trip stable: loading the returned string back is a no-op.
    pub fn current_fen(&self) -> String {
        let base = self.board.to_string();
        let head: Vec<&str> = base.split_whitespace().take(4).collect();
        format!(
            "{} {} {}",
            head.join(" "),
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Rebuild the position by replaying a comma separated move history from
    /// the starting layout. Recovery path for an authoritative record whose
    /// serialized position failed to parse.
    pub fn replay_history(&mut self, moves: &str) -> Result<(), GameError> {
        let mut fresh = PositionEngine::new();
        for token in moves.split(',').filter(|m| !m.is_empty()) {
            let mv = CandidateMove::from_uci(token).ok_or_else(|| {
                GameError::MalformedPosition(format!("unparseable move {token:?} in history"))
            })?;
            fresh.apply_move(&mv)?;
        }
        *self = fresh;
        Ok(())
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn board_status(&self) -> BoardStatus {
        self.board.status()
    }

    pub fn in_check(&self) -> bool {
        self.board.checkers().popcnt() > 0
    }

    fn explain_illegal(&self, mv: &CandidateMove) -> String {
        let piece = self.board.piece_on(mv.from);
        let mover = self.board.side_to_move();
        if piece.is_none() {
            return format!("no piece on {}", mv.from);
        }
        if self.board.color_on(mv.from) != Some(mover) {
            return format!("the piece on {} is not yours to move", mv.from);
        }
        if piece == Some(Piece::Pawn) && utils::is_back_rank(mv.to, mover) && mv.promotion.is_none()
        {
            return format!("{} requires a promotion piece", mv);
        }
        if mv.promotion.is_some()
            && !(piece == Some(Piece::Pawn) && utils::is_back_rank(mv.to, mover))
        {
            return format!("{} is not a promoting move", mv);
        }
        format!("{} is not legal in the current position", mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess::Piece;

    fn sq(name: &str) -> Square {
        Square::from_str(name).unwrap()
    }

    fn mv(uci: &str) -> CandidateMove {
        CandidateMove::from_uci(uci).unwrap()
    }

    #[test]
    fn starts_from_the_initial_layout() {
        let engine = PositionEngine::new();
        assert_eq!(engine.current_fen(), INITIAL_FEN);
        assert_eq!(engine.side_to_move(), Color::White);
    }

    #[test]
    fn serialization_round_trips_as_a_no_op() {
        let mut engine = PositionEngine::new();
        engine.apply_move(&mv("e2e4")).unwrap();
        engine.apply_move(&mv("e7e5")).unwrap();
        engine.apply_move(&mv("g1f3")).unwrap();

        let fen = engine.current_fen();
        engine.load_fen(&fen).unwrap();
        assert_eq!(engine.current_fen(), fen);
    }

    #[test]
    fn pawn_push_resets_the_halfmove_clock() {
        let mut engine = PositionEngine::new();
        let fen = engine.apply_move(&mv("e2e4")).unwrap();
        let fields: Vec<&str> = fen.split_whitespace().collect();
        assert_eq!(fields[1], "b", "black to move after e2e4");
        assert_eq!(fields[4], "0", "half-move clock resets on a pawn move");
        assert_eq!(fields[5], "1", "full-move number bumps only after black");

        let fen = engine.apply_move(&mv("e7e5")).unwrap();
        let fields: Vec<&str> = fen.split_whitespace().collect();
        assert_eq!(fields[1], "w");
        assert_eq!(fields[5], "2");

        // A quiet knight move advances the clock again.
        let fen = engine.apply_move(&mv("g1f3")).unwrap();
        let fields: Vec<&str> = fen.split_whitespace().collect();
        assert_eq!(fields[4], "1");
    }

    #[test]
    fn illegal_move_leaves_the_position_unchanged() {
        let mut engine = PositionEngine::new();
        let before = engine.current_fen();
        let err = engine.apply_move(&mv("e2e5")).unwrap_err();
        assert!(matches!(err, GameError::IllegalMove(_)));
        assert_eq!(engine.current_fen(), before);
    }

    #[test]
    fn legal_destinations_for_the_side_to_move() {
        let engine = PositionEngine::new();
        let mut from_e2 = engine.legal_destinations(sq("e2"));
        from_e2.sort_by_key(|s| s.to_string());
        assert_eq!(
            from_e2.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            vec!["e3", "e4"]
        );
        // Opponent piece and empty square both yield nothing.
        assert!(engine.legal_destinations(sq("e7")).is_empty());
        assert!(engine.legal_destinations(sq("e5")).is_empty());
    }

    #[test]
    fn pinned_piece_has_no_destinations() {
        let mut engine = PositionEngine::new();
        // Bishop on e2 shields the king on e1 from the rook on e4.
        engine
            .load_fen("4k3/8/8/8/4r3/8/4B3/4K3 w - - 0 1")
            .unwrap();
        assert!(engine.legal_destinations(sq("e2")).is_empty());
    }

    #[test]
    fn promotion_requires_a_piece() {
        let mut engine = PositionEngine::new();
        engine.load_fen("k7/4P3/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let before = engine.current_fen();

        let err = engine.apply_move(&mv("e7e8")).unwrap_err();
        match err {
            GameError::IllegalMove(msg) => assert!(msg.contains("promotion"), "{msg}"),
            other => panic!("expected IllegalMove, got {other:?}"),
        }
        assert_eq!(engine.current_fen(), before);

        let fen = engine.apply_move(&mv("e7e8q")).unwrap();
        assert!(fen.starts_with("k3Q3/"), "{fen}");
    }

    #[test]
    fn promotion_on_a_non_promoting_move_is_illegal() {
        let mut engine = PositionEngine::new();
        let before = engine.current_fen();
        let err = engine
            .apply_move(&CandidateMove::with_promotion(sq("e2"), sq("e4"), Piece::Queen))
            .unwrap_err();
        match err {
            GameError::IllegalMove(msg) => assert!(msg.contains("not a promoting"), "{msg}"),
            other => panic!("expected IllegalMove, got {other:?}"),
        }
        assert_eq!(engine.current_fen(), before);
    }

    #[test]
    fn malformed_serialization_keeps_the_loaded_position() {
        let mut engine = PositionEngine::new();
        engine.apply_move(&mv("d2d4")).unwrap();
        let before = engine.current_fen();

        for bad in [
            "not a position at all",
            "8/8 w",
            // Truncated forms without the move counters are not canonical.
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR z KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1 extra",
        ] {
            let err = engine.load_fen(bad).unwrap_err();
            assert!(matches!(err, GameError::MalformedPosition(_)), "{bad:?}");
            assert_eq!(engine.current_fen(), before, "{bad:?}");
        }
    }

    #[test]
    fn replays_a_recorded_history() {
        let mut engine = PositionEngine::new();
        engine.replay_history("e2e4,e7e5,g1f3").unwrap();
        assert_eq!(engine.side_to_move(), Color::Black);

        let fields: Vec<String> = engine
            .current_fen()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        assert_eq!(fields[5], "2");
    }

    #[test]
    fn replay_rejects_garbage_history() {
        let mut engine = PositionEngine::new();
        engine.apply_move(&mv("e2e4")).unwrap();
        let before = engine.current_fen();

        let err = engine.replay_history("e2e4,???").unwrap_err();
        assert!(matches!(err, GameError::MalformedPosition(_)));
        // A failed replay must not disturb the loaded position.
        assert_eq!(engine.current_fen(), before);
    }

    #[test]
    fn reset_returns_to_the_initial_layout() {
        let mut engine = PositionEngine::new();
        engine.apply_move(&mv("e2e4")).unwrap();
        engine.reset_to_initial();
        assert_eq!(engine.current_fen(), INITIAL_FEN);
    }
}
