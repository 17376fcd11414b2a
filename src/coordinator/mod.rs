//! Optimistic move application over the external write path.

use std::rc::Rc;

use chess::Square;
use log::{info, warn};

use crate::error::GameError;
use crate::models::{CandidateMove, PendingMove};
use crate::remote::GameWritePath;
use crate::session::GameSession;

/// Applies a candidate move speculatively, hands it to the write path, and
/// rolls back cleanly if the ledger rejects it.
///
/// At most one speculative move is ever outstanding; a second `submit_move`
/// while the first is awaiting confirmation fails with `MoveInProgress`
/// without touching any state.
pub struct MoveCoordinator<W: GameWritePath> {
    session: Rc<GameSession>,
    write_path: W,
}

impl<W: GameWritePath> MoveCoordinator<W> {
    pub fn new(session: Rc<GameSession>, write_path: W) -> MoveCoordinator<W> {
        MoveCoordinator {
            session,
            write_path,
        }
    }

    pub fn session(&self) -> &Rc<GameSession> {
        &self.session
    }

    /// Legal destinations for a selected origin, for restricting what the
    /// user can even attempt.
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        self.session.legal_destinations(from)
    }

    /// Validate and speculatively apply `mv`, then submit it to the write
    /// path.
    ///
    /// Synchronous rejections (`IllegalMove`, `MoveInProgress`) leave the
    /// position untouched. A write-path rejection rolls the engine back to
    /// the pre-move snapshot and surfaces a dismissible move error; by the
    /// time the error is reported the displayed position is consistent
    /// again.
    pub async fn submit_move(&self, mv: CandidateMove) -> Result<(), GameError> {
        if self.session.is_move_pending() {
            return Err(GameError::MoveInProgress);
        }

        // Speculative apply. The engine borrow must end before the await
        // below, so the poller can touch the session while the write is in
        // flight.
        let (pre_move_fen, resulting_fen) = {
            let mut engine = self.session.engine_mut();
            let pre = engine.current_fen();
            let resulting = engine.apply_move(&mv)?;
            (pre, resulting)
        };
        self.session.set_pending(PendingMove {
            mv,
            pre_move_fen: pre_move_fen.clone(),
            resulting_fen,
        });
        info!(
            "submitting move {} for game {}",
            mv,
            self.session.game_id()
        );

        match self.write_path.submit_move(self.session.game_id(), mv).await {
            Ok(()) => {
                // Accepted for inclusion. The next authoritative reload
                // supplies the confirmed position; if a poll already resolved
                // the marker while we were waiting, there is nothing to do.
                self.session.clear_pending_matching(&mv);
                Ok(())
            }
            Err(err) => {
                warn!("move {} rejected by the write path: {}", mv, err);
                let message = err.to_string();
                // Only roll back if an authoritative reload has not already
                // superseded this move; authoritative data always wins.
                if self.session.clear_pending_matching(&mv) {
                    self.session.rollback_to(&pre_move_fen);
                    self.session.set_move_error(message.clone());
                }
                Err(GameError::SubmissionRejected(message))
            }
        }
    }

    /// Resign the game. The status change lands on the next poll.
    pub async fn resign(&self) -> Result<(), GameError> {
        self.submit_simple("resign", self.write_path.submit_resign(self.session.game_id()))
            .await
    }

    /// Offer the opponent a draw.
    pub async fn propose_draw(&self) -> Result<(), GameError> {
        self.submit_simple(
            "propose draw",
            self.write_path.submit_propose_draw(self.session.game_id()),
        )
        .await
    }

    /// Accept or decline the opponent's draw proposal.
    pub async fn respond_to_draw(&self, accept: bool) -> Result<(), GameError> {
        self.submit_simple(
            if accept { "accept draw" } else { "decline draw" },
            self.write_path
                .submit_respond_to_draw(self.session.game_id(), accept),
        )
        .await
    }

    /// Claim victory by checkmate; the opponent may accept or dispute.
    pub async fn claim_checkmate(&self) -> Result<(), GameError> {
        self.submit_simple(
            "claim checkmate",
            self.write_path
                .submit_claim_checkmate(self.session.game_id()),
        )
        .await
    }

    /// Concede a claimed checkmate.
    pub async fn accept_defeat(&self) -> Result<(), GameError> {
        self.submit_simple(
            "accept defeat",
            self.write_path.submit_accept_defeat(self.session.game_id()),
        )
        .await
    }

    /// Dispute a claimed checkmate.
    pub async fn dispute(&self) -> Result<(), GameError> {
        self.submit_simple("dispute", self.write_path.submit_dispute(self.session.game_id()))
            .await
    }

    async fn submit_simple(
        &self,
        what: &str,
        request: futures::future::LocalBoxFuture<'_, Result<(), crate::remote::RemoteError>>,
    ) -> Result<(), GameError> {
        info!("submitting {} for game {}", what, self.session.game_id());
        request.await.map_err(|err| {
            warn!("{} failed for game {}: {}", what, self.session.game_id(), err);
            GameError::SubmissionRejected(err.to_string())
        })
    }
}
