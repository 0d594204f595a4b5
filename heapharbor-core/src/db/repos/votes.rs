//! Vote toggle engine
//!
//! One call casts, retracts or flips a user's vote on a question or answer:
//! - lock the (user, target) pair for the rest of the transaction
//! - read the current edges
//! - apply the `TogglePlan` for the requested direction
//!
//! The lock makes the read-then-write safe under read committed; the
//! composite primary keys on the edge tables back it up.

use tracing::{debug, info};

use crate::db::{ledger, DbError, Store};
use crate::models::{Direction, UserId, VoteReceipt, VoteState, VoteTarget, TogglePlan};

/// Vote repository
pub struct VoteRepo<'a> {
    store: &'a Store,
}

impl<'a> VoteRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Toggle `user`'s vote on `target` in `direction`.
    ///
    /// Returns `NotFound` if the user or the target does not exist.
    pub async fn toggle(
        &self,
        user: UserId,
        target: VoteTarget,
        direction: Direction,
    ) -> Result<VoteReceipt, DbError> {
        let store = self.store;
        store
            .run("vote.toggle", move || async move {
                let mut tx = store.begin().await?;

                ledger::lock_key(&mut tx, &target.lock_key(user)).await?;

                if !ledger::user_exists(&mut tx, user).await? {
                    return Err(DbError::not_found("user", user));
                }
                if !ledger::target_exists(&mut tx, target).await? {
                    return Err(DbError::not_found(target.kind(), target.id()));
                }

                let current = ledger::vote_state(&mut tx, user, target).await?;
                let plan = TogglePlan::for_state(current, direction);
                debug!(%user, %target, %direction, ?current, outcome = ?plan.outcome, "Toggle planned");

                if let Some(removed) = plan.remove {
                    ledger::remove_edge(&mut tx, user, target, removed).await?;
                }
                if let Some(inserted) = plan.insert {
                    ledger::insert_edge(&mut tx, user, target, inserted)
                        .await
                        .map_err(DbError::missing_reference)?;
                }

                tx.commit().await?;

                let receipt = VoteReceipt {
                    user_id: user,
                    target,
                    direction,
                    outcome: plan.outcome,
                    state: current.apply(&plan),
                };
                info!(%user, %target, %direction, outcome = ?receipt.outcome, "Vote toggled");
                Ok(receipt)
            })
            .await
    }

    pub async fn upvote(&self, user: UserId, target: VoteTarget) -> Result<VoteReceipt, DbError> {
        self.toggle(user, target, Direction::Up).await
    }

    pub async fn downvote(&self, user: UserId, target: VoteTarget) -> Result<VoteReceipt, DbError> {
        self.toggle(user, target, Direction::Down).await
    }

    /// Current edges for one pair.
    pub async fn state(&self, user: UserId, target: VoteTarget) -> Result<VoteState, DbError> {
        let store = self.store;
        store
            .run("vote.state", move || async move {
                let mut tx = store.begin().await?;
                if !ledger::target_exists(&mut tx, target).await? {
                    return Err(DbError::not_found(target.kind(), target.id()));
                }
                let state = ledger::vote_state(&mut tx, user, target).await?;
                tx.commit().await?;
                Ok(state)
            })
            .await
    }
}
