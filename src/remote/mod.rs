//! Collaborator boundaries: the read and write paths to the ledger.
//!
//! Transport, retry policy and confirmation latency all live behind these
//! traits. The futures are `LocalBoxFuture` because the whole core runs on a
//! single-threaded cooperative scheduler.

use futures::future::LocalBoxFuture;
use thiserror::Error;

use crate::models::{CandidateMove, GameRecord, TimeStatus};

/// Failure reported by a collaborator on the read or write path.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("game not found")]
    NotFound,
    /// Transient transport failure; safe to retry on the next tick.
    #[error("request failed: {0}")]
    Transport(String),
    /// The ledger refused the submission.
    #[error("rejected by the ledger: {0}")]
    Rejected(String),
}

/// Read path to the authoritative record. Poll-only; there is no push
/// channel, so freshness is whatever the last fetch returned.
pub trait GameReadPath {
    fn fetch_game<'a>(
        &'a self,
        game_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<Option<GameRecord>, RemoteError>>;

    fn fetch_time_status<'a>(
        &'a self,
        game_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<TimeStatus, RemoteError>>;
}

/// Write path to the ledger. Success means the transaction was accepted for
/// inclusion, not that the record is already visible on the read path.
pub trait GameWritePath {
    fn submit_move<'a>(
        &'a self,
        game_id: &'a str,
        mv: CandidateMove,
    ) -> LocalBoxFuture<'a, Result<(), RemoteError>>;

    fn submit_resign<'a>(&'a self, game_id: &'a str)
        -> LocalBoxFuture<'a, Result<(), RemoteError>>;

    fn submit_propose_draw<'a>(
        &'a self,
        game_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), RemoteError>>;

    fn submit_respond_to_draw<'a>(
        &'a self,
        game_id: &'a str,
        accept: bool,
    ) -> LocalBoxFuture<'a, Result<(), RemoteError>>;

    fn submit_claim_checkmate<'a>(
        &'a self,
        game_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), RemoteError>>;

    fn submit_accept_defeat<'a>(
        &'a self,
        game_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), RemoteError>>;

    fn submit_dispute<'a>(&'a self, game_id: &'a str)
        -> LocalBoxFuture<'a, Result<(), RemoteError>>;
}
