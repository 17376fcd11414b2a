use std::cell::{RefCell, RefMut};

use chess::Square;
use log::{info, warn};
use uuid::Uuid;

use crate::clock::{self, ClockReading};
use crate::engine::{utils::board_status_label, PositionEngine};
use crate::models::{CandidateMove, GameRecord, GameStatus, PendingMove, PlayerColor, TimeStatus};

/// Session-scoped context for one game.
///
/// The move coordinator and the sync poller share a single `GameSession`;
/// there is no process-wide game state. It owns the one mutable position the
/// engine has loaded, the cached authoritative record, the at-most-one
/// pending move marker, and the dismissible move error.
///
/// All mutation happens on one logical thread, so interior mutability is
/// plain `RefCell`; no borrow is ever held across a suspension point.
pub struct GameSession {
    session_id: Uuid,
    game_id: String,
    player: PlayerColor,
    engine: RefCell<PositionEngine>,
    record: RefCell<Option<GameRecord>>,
    time_status: RefCell<Option<TimeStatus>>,
    pending: RefCell<Option<PendingMove>>,
    move_error: RefCell<Option<String>>,
}

impl GameSession {
    /// New session for `game_id`, playing `player`, with the engine loaded
    /// with the starting position until the first authoritative reload.
    pub fn new(game_id: impl Into<String>, player: PlayerColor) -> GameSession {
        let game_id = game_id.into();
        let session_id = Uuid::new_v4();
        info!("session {} opened for game {} as {}", session_id, game_id, player);
        GameSession {
            session_id,
            game_id,
            player,
            engine: RefCell::new(PositionEngine::new()),
            record: RefCell::new(None),
            time_status: RefCell::new(None),
            pending: RefCell::new(None),
            move_error: RefCell::new(None),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn player(&self) -> PlayerColor {
        self.player
    }

    /// Serialization of the position currently shown to the user: the last
    /// confirmed authoritative position, or that position plus exactly one
    /// legal speculative move.
    pub fn current_fen(&self) -> String {
        self.engine.borrow().current_fen()
    }

    /// Legal destinations for the piece on `from`; empty while a speculative
    /// move is outstanding, since nothing is selectable until it resolves.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        if self.pending.borrow().is_some() {
            return Vec::new();
        }
        self.engine.borrow().legal_destinations(from)
    }

    pub fn is_move_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    pub fn pending_move(&self) -> Option<CandidateMove> {
        self.pending.borrow().as_ref().map(|p| p.mv)
    }

    /// The last surfaced move error, if the user has not dismissed it.
    pub fn move_error(&self) -> Option<String> {
        self.move_error.borrow().clone()
    }

    pub fn clear_move_error(&self) {
        self.move_error.borrow_mut().take();
    }

    /// Status from the cached authoritative record; None before the first
    /// successful fetch.
    pub fn status(&self) -> Option<GameStatus> {
        self.record.borrow().as_ref().map(|r| r.status)
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_some_and(|s| s.is_terminal())
    }

    /// Label for the loaded position (check/checkmate/stalemate/whose turn),
    /// derived locally for rendering between polls.
    pub fn position_label(&self) -> &'static str {
        board_status_label(&self.engine.borrow())
    }

    pub fn record(&self) -> Option<GameRecord> {
        self.record.borrow().clone()
    }

    pub fn time_status(&self) -> Option<TimeStatus> {
        self.time_status.borrow().clone()
    }

    /// Live clock projection for one side; None before the first snapshot.
    pub fn clock(&self, side: PlayerColor) -> Option<ClockReading> {
        self.time_status
            .borrow()
            .as_ref()
            .map(|status| clock::reading(status, side))
    }

    /// True when the local player may submit a move right now.
    pub fn is_my_turn(&self) -> bool {
        if self.is_move_pending() {
            return false;
        }
        self.record
            .borrow()
            .as_ref()
            .map(|r| r.status == GameStatus::Active && r.current_turn == self.player)
            .unwrap_or(false)
    }

    pub(crate) fn engine_mut(&self) -> RefMut<'_, PositionEngine> {
        self.engine.borrow_mut()
    }

    pub(crate) fn set_pending(&self, pending: PendingMove) {
        *self.pending.borrow_mut() = Some(pending);
    }

    /// Clear the pending marker if it still refers to `mv`. Returns false
    /// when an authoritative reload already resolved it.
    pub(crate) fn clear_pending_matching(&self, mv: &CandidateMove) -> bool {
        let mut pending = self.pending.borrow_mut();
        match pending.as_ref() {
            Some(p) if p.mv == *mv => {
                pending.take();
                true
            }
            _ => false,
        }
    }

    pub(crate) fn set_move_error(&self, message: String) {
        *self.move_error.borrow_mut() = Some(message);
    }

    pub(crate) fn set_time_status(&self, status: TimeStatus) {
        *self.time_status.borrow_mut() = Some(status);
    }

    /// Revert the engine to a pre-move snapshot after a rejected submission.
    pub(crate) fn rollback_to(&self, fen: &str) {
        if let Err(err) = self.engine.borrow_mut().load_fen(fen) {
            // The snapshot came from the engine itself, so this cannot
            // normally happen; keep whatever position is loaded.
            warn!("session {}: rollback failed: {}", self.session_id, err);
        }
    }

    /// Fold a fresh authoritative record into the session. Returns true when
    /// the move history changed and the engine was reloaded.
    ///
    /// Authoritative data always wins: a pending speculative move that the
    /// fresh history does not account for is rolled back with a surfaced
    /// error, and one it does account for is confirmed silently.
    pub(crate) fn apply_authoritative(&self, fresh: GameRecord) -> bool {
        let moves_changed = self
            .record
            .borrow()
            .as_ref()
            .map(|cached| cached.moves != fresh.moves)
            .unwrap_or(true);

        if moves_changed {
            self.resolve_pending(&fresh);
            self.reload_engine(&fresh);
        }
        *self.record.borrow_mut() = Some(fresh);
        moves_changed
    }

    fn resolve_pending(&self, fresh: &GameRecord) {
        let Some(pending) = self.pending.borrow_mut().take() else {
            return;
        };
        let cached_moves = self
            .record
            .borrow()
            .as_ref()
            .map(|r| r.moves.clone())
            .unwrap_or_default();
        let expected = if cached_moves.is_empty() {
            pending.mv.uci()
        } else {
            format!("{},{}", cached_moves, pending.mv.uci())
        };

        // Confirmed as long as the fresh history records the pending move for
        // its turn; the opponent may already have replied in the same window.
        let confirmed = fresh.moves == expected
            || fresh
                .moves
                .strip_prefix(&expected)
                .is_some_and(|rest| rest.starts_with(','));

        if confirmed {
            info!(
                "session {}: pending move {} confirmed by the authoritative record",
                self.session_id, pending.mv
            );
        } else {
            warn!(
                "session {}: pending move {} superseded by the authoritative record",
                self.session_id, pending.mv
            );
            self.set_move_error(format!(
                "move {} was superseded by the authoritative record",
                pending.mv
            ));
        }
    }

    fn reload_engine(&self, fresh: &GameRecord) {
        let mut engine = self.engine.borrow_mut();
        if let Err(err) = engine.load_fen(&fresh.current_fen) {
            warn!(
                "session {}: authoritative position rejected ({}); replaying move history",
                self.session_id, err
            );
            if let Err(err) = engine.replay_history(&fresh.moves) {
                // Keep the last good position rather than show garbage.
                warn!(
                    "session {}: history replay failed ({}); keeping last good position",
                    self.session_id, err
                );
            }
        }
    }
}
