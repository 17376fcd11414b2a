use chess::{BoardStatus, Color, Rank, Square};

use crate::engine::PositionEngine;

/// True when `square` is the promotion rank for the given mover.
pub fn is_back_rank(square: Square, mover: Color) -> bool {
    match mover {
        Color::White => square.get_rank() == Rank::Eighth,
        Color::Black => square.get_rank() == Rank::First,
    }
}

/// Human readable label for the loaded position, for status rendering.
pub fn board_status_label(engine: &PositionEngine) -> &'static str {
    match engine.board_status() {
        BoardStatus::Checkmate => "checkmate",
        BoardStatus::Stalemate => "stalemate",
        BoardStatus::Ongoing => {
            if engine.in_check() {
                "check"
            } else if engine.side_to_move() == Color::White {
                "white_turn"
            } else {
                "black_turn"
            }
        }
    }
}
