//! Saved-question bookmarks
//!
//! Same shape as a vote toggle with a single edge set: saving twice
//! unsaves.

use tracing::info;

use crate::db::{ledger, DbError, Store};
use crate::models::user::saved_lock_key;
use crate::models::{QuestionId, SaveOutcome, SaveReceipt, UserId, VoteTarget};

/// Bookmark repository
pub struct SavedRepo<'a> {
    store: &'a Store,
}

impl<'a> SavedRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Save `question` for `user`, or unsave it if already saved.
    pub async fn toggle(&self, user: UserId, question: QuestionId) -> Result<SaveReceipt, DbError> {
        let store = self.store;
        store
            .run("saved.toggle", move || async move {
                let mut tx = store.begin().await?;

                ledger::lock_key(&mut tx, &saved_lock_key(user, question)).await?;

                if !ledger::user_exists(&mut tx, user).await? {
                    return Err(DbError::not_found("user", user));
                }
                if !ledger::target_exists(&mut tx, VoteTarget::Question(question)).await? {
                    return Err(DbError::not_found("question", question));
                }

                let outcome = if ledger::remove_saved(&mut tx, user, question).await? {
                    SaveOutcome::Unsaved
                } else {
                    ledger::insert_saved(&mut tx, user, question)
                        .await
                        .map_err(DbError::missing_reference)?;
                    SaveOutcome::Saved
                };

                tx.commit().await?;
                info!(%user, %question, ?outcome, "Bookmark toggled");

                Ok(SaveReceipt {
                    user_id: user,
                    question_id: question,
                    outcome,
                })
            })
            .await
    }
}
