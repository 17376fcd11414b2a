//! Client-side core for a chess game whose authoritative state lives in a
//! slow, poll-only ledger contract.
//!
//! A move is applied speculatively against the local rules engine so the
//! player gets instant feedback, then handed to the external write path; the
//! sync poller periodically fetches the authoritative record and either
//! confirms the speculation or forces a rollback. The board shown to the
//! user is always the last confirmed authoritative position, or that
//! position plus exactly one legal speculative move.
//!
//! Everything runs on a single-threaded cooperative scheduler; the read and
//! write paths and the visibility event source are injected capabilities.

pub mod clock;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod models;
pub mod remote;
pub mod session;
pub mod sync;

// Re-export the types callers wire together
pub use coordinator::MoveCoordinator;
pub use engine::{PositionEngine, INITIAL_FEN};
pub use error::GameError;
pub use models::{CandidateMove, GameRecord, GameStatus, PlayerColor, TimeStatus};
pub use remote::{GameReadPath, GameWritePath, RemoteError};
pub use session::GameSession;
pub use sync::{PollOutcome, SyncPoller, DEFAULT_POLL_INTERVAL};
