use chess::{Piece, Square};
use std::fmt;
use std::str::FromStr;

/// A move as produced by user interaction: a pair of board coordinates plus
/// an optional promotion piece. Consumed once by the move coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl CandidateMove {
    pub fn new(from: Square, to: Square) -> CandidateMove {
        CandidateMove {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Square, to: Square, promotion: Piece) -> CandidateMove {
        CandidateMove {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Coordinate notation as recorded in the ledger's move history,
    /// e.g. "e2e4" or "a7a8q".
    pub fn uci(&self) -> String {
        match self.promotion.and_then(promotion_char) {
            Some(p) => format!("{}{}{}", self.from, self.to, p),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parse coordinate notation; None if the token is not a well formed
    /// move string.
    pub fn from_uci(token: &str) -> Option<CandidateMove> {
        if !token.is_ascii() || token.len() < 4 || token.len() > 5 {
            return None;
        }
        let from = Square::from_str(&token[0..2]).ok()?;
        let to = Square::from_str(&token[2..4]).ok()?;
        let promotion = match token.as_bytes().get(4) {
            Some(&c) => Some(promotion_piece(c as char)?),
            None => None,
        };
        Some(CandidateMove {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for CandidateMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uci())
    }
}

/// A speculatively applied move that has not been confirmed by the ledger,
/// together with the snapshot needed to undo it. At most one exists at a
/// time.
#[derive(Debug, Clone)]
pub struct PendingMove {
    pub mv: CandidateMove,
    /// Position serialization immediately before the speculative apply.
    pub pre_move_fen: String,
    /// Position the engine produced for the speculative apply. Carried for
    /// audit, never trusted over authoritative data.
    pub resulting_fen: String,
}

fn promotion_char(piece: Piece) -> Option<char> {
    match piece {
        Piece::Queen => Some('q'),
        Piece::Rook => Some('r'),
        Piece::Bishop => Some('b'),
        Piece::Knight => Some('n'),
        _ => None,
    }
}

fn promotion_piece(c: char) -> Option<Piece> {
    match c {
        'q' => Some(Piece::Queen),
        'r' => Some(Piece::Rook),
        'b' => Some(Piece::Bishop),
        'n' => Some(Piece::Knight),
        _ => None,
    }
}
