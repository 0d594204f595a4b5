//! Answer repository

use tracing::info;

use crate::db::{ledger, DbError, Store};
use crate::models::{Answer, AnswerId, PostContent, QuestionId, UserId, VoteTarget};

pub struct AnswerRepo<'a> {
    store: &'a Store,
}

impl<'a> AnswerRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Post an answer to an existing question.
    pub async fn create(
        &self,
        question: QuestionId,
        author: UserId,
        content: &PostContent,
    ) -> Result<Answer, DbError> {
        let store = self.store;
        store
            .run("answer.create", move || async move {
                let mut tx = store.begin().await?;

                if !ledger::target_exists(&mut tx, VoteTarget::Question(question)).await? {
                    return Err(DbError::not_found("question", question));
                }
                if !ledger::user_exists(&mut tx, author).await? {
                    return Err(DbError::not_found("user", author));
                }

                let answer = sqlx::query_as::<_, Answer>(
                    r#"
                    INSERT INTO answers (content, question_id, author_id)
                    VALUES ($1, $2, $3)
                    RETURNING id, question_id, author_id, content, created_at
                    "#,
                )
                .bind(content.as_str())
                .bind(question)
                .bind(author)
                .fetch_one(&mut *tx)
                .await
                .map_err(DbError::missing_reference)?;

                tx.commit().await?;
                info!(answer = %answer.id, %question, "Answer created");
                Ok(answer)
            })
            .await
    }

    /// Delete an answer; its vote edges cascade.
    pub async fn delete(&self, id: AnswerId) -> Result<(), DbError> {
        let store = self.store;
        store
            .run("answer.delete", move || async move {
                let mut tx = store.begin().await?;
                let result = sqlx::query("DELETE FROM answers WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("answer", id));
                }
                tx.commit().await?;
                info!(answer = %id, "Answer deleted");
                Ok(())
            })
            .await
    }
}
