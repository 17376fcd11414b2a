pub mod game_record;
pub mod moves;
pub mod time_status;

// Re-export important types
pub use game_record::{GameRecord, GameStatus, PlayerColor};
pub use moves::{CandidateMove, PendingMove};
pub use time_status::TimeStatus;
