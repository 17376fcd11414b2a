//! Poll-based synchronization with the authoritative record.
//!
//! There is no push channel: an opponent's move only becomes visible when a
//! periodic fetch happens to observe it. The poller keeps that loop cheap by
//! suspending entirely while the controlling view is hidden and by never
//! letting two fetch passes overlap.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use futures::stream::Stream;
use futures::{pin_mut, select, FutureExt, StreamExt};
use log::{debug, info, warn};

use crate::remote::GameReadPath;
use crate::session::GameSession;

/// Reference polling interval: ten seconds between authoritative fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// What a single poll pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Fresh authoritative data changed the move history; the engine was
    /// reloaded.
    Updated,
    /// Nothing new; only display values were refreshed.
    Unchanged,
    /// A previous pass was still outstanding, so this one was skipped.
    Skipped,
    /// The read path failed; logged and retried on the next tick.
    Failed,
}

/// Periodically fetches the authoritative record and clock snapshot and
/// folds them into the shared session.
pub struct SyncPoller<R: GameReadPath> {
    session: Rc<GameSession>,
    read_path: R,
    interval: Duration,
    visible: Cell<bool>,
    in_flight: Cell<bool>,
}

impl<R: GameReadPath> SyncPoller<R> {
    /// Poller starting visible, at the reference interval.
    pub fn new(session: Rc<GameSession>, read_path: R) -> SyncPoller<R> {
        SyncPoller {
            session,
            read_path,
            interval: DEFAULT_POLL_INTERVAL,
            visible: Cell::new(true),
            in_flight: Cell::new(false),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> SyncPoller<R> {
        self.interval = interval;
        self
    }

    pub fn session(&self) -> &Rc<GameSession> {
        &self.session
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// One independent, idempotent poll pass. Passes never overlap: if one
    /// is still outstanding this returns `Skipped` immediately.
    pub async fn poll(&self) -> PollOutcome {
        if self.in_flight.get() {
            debug!(
                "game {}: previous poll still outstanding, skipping",
                self.session.game_id()
            );
            return PollOutcome::Skipped;
        }
        let _guard = InFlightGuard::arm(&self.in_flight);
        self.poll_inner().await
    }

    async fn poll_inner(&self) -> PollOutcome {
        let game_id = self.session.game_id();

        let record = match self.read_path.fetch_game(game_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!("game {} not found on the read path", game_id);
                return PollOutcome::Failed;
            }
            Err(err) => {
                warn!("fetch of game {} failed: {}", game_id, err);
                return PollOutcome::Failed;
            }
        };
        let updated = self.session.apply_authoritative(record);
        if updated {
            info!("game {}: authoritative update applied", game_id);
        }

        match self.read_path.fetch_time_status(game_id).await {
            Ok(status) => self.session.set_time_status(status),
            // Transient: the clock keeps showing the last snapshot.
            Err(err) => warn!("time status fetch for game {} failed: {}", game_id, err),
        }

        if updated {
            PollOutcome::Updated
        } else {
            PollOutcome::Unchanged
        }
    }

    /// Visibility transition. Hiding gates the timer loop; becoming visible
    /// again triggers exactly one immediate fetch before interval polling
    /// resumes.
    pub async fn set_visible(&self, visible: bool) -> Option<PollOutcome> {
        let was_visible = self.visible.replace(visible);
        if visible && !was_visible {
            info!(
                "game {}: view visible again, refreshing immediately",
                self.session.game_id()
            );
            Some(self.poll().await)
        } else {
            if !visible && was_visible {
                info!("game {}: view hidden, polling suspended", self.session.game_id());
            }
            None
        }
    }

    /// Drive interval polling until the game reaches a terminal status or
    /// the visibility source closes (teardown).
    ///
    /// `visibility` delivers view shown/hidden events. While hidden no timer
    /// is armed at all; an in-flight write elsewhere is unaffected.
    pub async fn run<V>(&self, visibility: V)
    where
        V: Stream<Item = bool>,
    {
        pin_mut!(visibility);
        let mut visibility = visibility.fuse();

        if self.visible.get() {
            self.poll().await;
        }

        loop {
            if self.session.is_terminal() {
                info!(
                    "game {} reached a terminal status, sync stopped",
                    self.session.game_id()
                );
                return;
            }

            if self.visible.get() {
                let tick = actix_rt::time::sleep(self.interval).fuse();
                pin_mut!(tick);
                select! {
                    _ = tick => {
                        self.poll().await;
                    }
                    event = visibility.next() => match event {
                        Some(visible) => {
                            self.set_visible(visible).await;
                        }
                        None => return,
                    },
                }
            } else {
                match visibility.next().await {
                    Some(visible) => {
                        self.set_visible(visible).await;
                    }
                    None => return,
                }
            }
        }
    }
}

/// Clears the in-flight flag even if the poll future is dropped mid-await.
struct InFlightGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> InFlightGuard<'a> {
    fn arm(flag: &'a Cell<bool>) -> InFlightGuard<'a> {
        flag.set(true);
        InFlightGuard { flag }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}
