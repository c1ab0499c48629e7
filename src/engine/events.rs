//! Activity Events & Fire-and-Forget Dispatch
//!
//! Request handlers report "user activity occurred" and move on; a worker
//! task applies the event's direct score delta and runs a refresh pass for
//! the credited user. The producer side never blocks and never observes
//! gamification failures.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::evaluator::ReputationEngine;
use crate::engine::{ActivityCounts, ReputationStore};

/// What happened, from the engine's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    /// A reading-progress record was created
    ReadingProgressStarted,
    /// An existing streak grew by a day
    StreakExtended,
    /// A review was submitted (pending approval)
    ReviewSubmitted,
    /// A review was approved by an admin
    ReviewApproved,
    /// The user finished a book
    BookFinished,
    ReviewUpvoteCast,
    ReviewUpvoteRetracted,
    QuoteCreated,
    QuoteUpvoteCast,
    QuoteUpvoteRetracted,
    CommentPosted,
    CommentUpvoteCast,
    CommentUpvoteRetracted,
}

impl ActivityKind {
    /// Direct rank-score delta credited to the user for this event,
    /// independent of any badges the follow-up refresh may grant
    pub fn score_delta(self) -> i64 {
        match self {
            ActivityKind::ReadingProgressStarted => 1,
            ActivityKind::StreakExtended => 1,
            ActivityKind::ReviewSubmitted => 0,
            ActivityKind::ReviewApproved => 5,
            ActivityKind::BookFinished => 10,
            ActivityKind::ReviewUpvoteCast => 2,
            ActivityKind::ReviewUpvoteRetracted => -2,
            ActivityKind::QuoteCreated => 0,
            ActivityKind::QuoteUpvoteCast => 2,
            ActivityKind::QuoteUpvoteRetracted => -2,
            ActivityKind::CommentPosted => 1,
            ActivityKind::CommentUpvoteCast => 1,
            ActivityKind::CommentUpvoteRetracted => -1,
        }
    }
}

/// An activity notification for one user
///
/// `user_id` is the user credited with the activity: for upvote events
/// that is the content's author, not the upvoter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub user_id: String,
    pub kind: ActivityKind,
}

impl ActivityEvent {
    pub fn new(user_id: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
        }
    }
}

/// Producer handle for the engine's event queue
///
/// `dispatch` is cheap and non-blocking; when the queue is full the event
/// is dropped with a warning rather than backpressuring the caller.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    tx: mpsc::Sender<ActivityEvent>,
}

impl EventDispatcher {
    /// Spawn the consumer worker and return the dispatcher plus the worker
    /// handle. The worker exits once every dispatcher clone is dropped.
    pub fn spawn<S>(
        engine: ReputationEngine<S>,
        queue_capacity: usize,
    ) -> (Self, JoinHandle<()>)
    where
        S: ReputationStore + ActivityCounts + 'static,
    {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let handle = tokio::spawn(run_worker(engine, rx));
        (Self { tx }, handle)
    }

    /// Report an activity event, best-effort
    pub fn dispatch(&self, event: ActivityEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!(error = %e, "activity event dropped");
        }
    }
}

async fn run_worker<S>(engine: ReputationEngine<S>, mut rx: mpsc::Receiver<ActivityEvent>)
where
    S: ReputationStore + ActivityCounts + 'static,
{
    info!("reputation event worker started");

    while let Some(event) = rx.recv().await {
        let delta = event.kind.score_delta();
        if delta != 0 {
            if let Err(e) = engine.apply_score_delta(&event.user_id, delta).await {
                warn!(
                    user_id = %event.user_id,
                    kind = ?event.kind,
                    delta,
                    error = %e,
                    "failed to apply activity score delta"
                );
            }
        }

        match engine.refresh(&event.user_id).await {
            Ok(outcome) => {
                debug!(
                    user_id = %event.user_id,
                    kind = ?event.kind,
                    granted = ?outcome.granted,
                    class_tag = %outcome.class_tag,
                    "processed activity event"
                );
            }
            Err(e) => {
                warn!(
                    user_id = %event.user_id,
                    kind = ?event.kind,
                    error = %e,
                    "reputation refresh failed"
                );
            }
        }
    }

    info!("reputation event worker stopped");
}
