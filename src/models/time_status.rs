use serde::{Deserialize, Serialize};

use crate::models::PlayerColor;

/// Clock snapshot returned by the ledger's time-status query.
///
/// The remaining counters are denominated in blocks and are accurate as of
/// the block the query was evaluated at; the clock calculator derives live
/// values from them. Never persisted, recomputed on every poll tick.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TimeStatus {
    pub white_time_remaining: u64,
    pub black_time_remaining: u64,
    pub current_player: PlayerColor,
    pub time_expired: bool,
    pub move_count: u32,
    pub time_since_last_move: u64,
}

impl TimeStatus {
    /// Parse a snapshot from the JSON shape the contract's check_time_status
    /// query returns.
    pub fn from_json(raw: &str) -> serde_json::Result<TimeStatus> {
        serde_json::from_str(raw)
    }
}
