//! Block-based chess clock calculator.
//!
//! Pure functions over a [`TimeStatus`] snapshot: nothing here owns state and
//! nothing here is authoritative. The real increment accounting happens in
//! the ledger contract; these values exist to drive a live display between
//! polls. One block is roughly one second.

use crate::models::{PlayerColor, TimeStatus};

/// Neither clock runs until both sides have made their first move.
pub const CLOCK_START_MOVE_COUNT: u32 = 2;
/// Per-move increment, in blocks, credited through the opening phase.
pub const OPENING_INCREMENT_BLOCKS: u64 = 600;
/// Per-move increment, in blocks, credited after the opening phase.
pub const LATE_INCREMENT_BLOCKS: u64 = 60;
/// Last move count that still earns the opening increment.
pub const OPENING_MOVE_LIMIT: u32 = 20;

const LOW_TIME_BLOCKS: u64 = 600;
const CRITICAL_TIME_BLOCKS: u64 = 60;

/// Display emphasis bucket for a remaining-time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUrgency {
    Normal,
    /// Under ten minutes.
    Low,
    /// Under one minute.
    Critical,
}

/// Clock values projected for one side of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockReading {
    pub side: PlayerColor,
    pub remaining_blocks: u64,
    /// True while this side's clock is counting down.
    pub running: bool,
    pub expired: bool,
    pub urgency: TimeUrgency,
    pub display: String,
}

/// Live remaining time for `side`: the snapshot counter, minus the time
/// elapsed since the authoritative last-move mark when it is this side's
/// turn, floored at zero. Before both sides have moved the raw counter is
/// returned untouched.
pub fn live_remaining(status: &TimeStatus, side: PlayerColor) -> u64 {
    let remaining = match side {
        PlayerColor::White => status.white_time_remaining,
        PlayerColor::Black => status.black_time_remaining,
    };
    if status.move_count < CLOCK_START_MOVE_COUNT {
        return remaining;
    }
    if status.current_player == side {
        remaining.saturating_sub(status.time_since_last_move)
    } else {
        remaining
    }
}

/// True when the side to move has run its clock to zero.
pub fn time_expired(status: &TimeStatus) -> bool {
    status.move_count >= CLOCK_START_MOVE_COUNT
        && live_remaining(status, status.current_player) == 0
}

/// Per-move increment mirrored for display; None before both sides have
/// made their first move.
pub fn increment_for(move_count: u32) -> Option<u64> {
    if move_count < CLOCK_START_MOVE_COUNT {
        None
    } else if move_count <= OPENING_MOVE_LIMIT {
        Some(OPENING_INCREMENT_BLOCKS)
    } else {
        Some(LATE_INCREMENT_BLOCKS)
    }
}

pub fn urgency(remaining_blocks: u64) -> TimeUrgency {
    if remaining_blocks < CRITICAL_TIME_BLOCKS {
        TimeUrgency::Critical
    } else if remaining_blocks < LOW_TIME_BLOCKS {
        TimeUrgency::Low
    } else {
        TimeUrgency::Normal
    }
}

/// Format a block count for display: days+hours+minutes at a day or more,
/// h:mm:ss at an hour or more, m:ss otherwise.
pub fn format_remaining(blocks: u64) -> String {
    if blocks == 0 {
        return "0:00".to_string();
    }
    let days = blocks / 86_400;
    let hours = (blocks % 86_400) / 3_600;
    let minutes = (blocks % 3_600) / 60;
    let seconds = blocks % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Project the full display state for one side from a snapshot.
pub fn reading(status: &TimeStatus, side: PlayerColor) -> ClockReading {
    let remaining_blocks = live_remaining(status, side);
    let running =
        status.move_count >= CLOCK_START_MOVE_COUNT && status.current_player == side;
    ClockReading {
        side,
        remaining_blocks,
        running,
        expired: running && remaining_blocks == 0,
        urgency: urgency(remaining_blocks),
        display: format_remaining(remaining_blocks),
    }
}
