use thiserror::Error;

/// Errors surfaced by the client-side game core.
///
/// Nothing here is fatal: legality and format problems are resolved without
/// any partial mutation escaping, and a rejected submission leaves the board
/// back on the last authoritative position before the error is reported.
#[derive(Debug, Error)]
pub enum GameError {
    /// An authoritative position string could not be parsed into a valid
    /// board state. The previously loaded position is kept.
    #[error("malformed position: {0}")]
    MalformedPosition(String),

    /// The attempted move is not legal in the loaded position. Rejected
    /// synchronously with no state change.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// A speculative move is already awaiting confirmation; at most one may
    /// be outstanding.
    #[error("another move is already awaiting confirmation")]
    MoveInProgress,

    /// The write path rejected the move, or an authoritative update
    /// superseded it. The speculative move has been rolled back.
    #[error("move submission rejected: {0}")]
    SubmissionRejected(String),
}
