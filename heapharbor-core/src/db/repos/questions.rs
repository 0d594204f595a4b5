//! Question write orchestrator
//!
//! Creates and edits a question together with its tag associations in one
//! transaction: the question never exists without its tags, and a failure
//! at any step leaves no question, tag or association behind.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use tracing::{info, warn, Instrument};

use super::tags::resolve_tx;
use crate::db::{ledger, DbError, Store};
use crate::models::{
    PostContent, Question, QuestionId, QuestionTitle, Tag, TagList, UserId, ValidationError,
    VoteTarget,
};

/// Validated input for a new question
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub title: QuestionTitle,
    pub content: PostContent,
    pub author: UserId,
    pub tags: TagList,
}

impl NewQuestion {
    pub fn new<S: AsRef<str>>(
        title: &str,
        content: &str,
        author: UserId,
        tags: &[S],
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            title: QuestionTitle::new(title)?,
            content: PostContent::new(content)?,
            author,
            tags: TagList::new(tags)?,
        })
    }
}

/// Validated replacement text and tags for an existing question
#[derive(Debug, Clone)]
pub struct QuestionEdit {
    pub title: QuestionTitle,
    pub content: PostContent,
    pub tags: TagList,
}

impl QuestionEdit {
    pub fn new<S: AsRef<str>>(title: &str, content: &str, tags: &[S]) -> Result<Self, ValidationError> {
        Ok(Self {
            title: QuestionTitle::new(title)?,
            content: PostContent::new(content)?,
            tags: TagList::new(tags)?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct QuestionRow {
    id: QuestionId,
    title: String,
    content: String,
    author_id: UserId,
    views: i64,
    created_at: DateTime<Utc>,
}

impl QuestionRow {
    fn with_tags(self, tags: Vec<Tag>) -> Question {
        Question {
            id: self.id,
            title: self.title,
            content: self.content,
            author_id: self.author_id,
            views: self.views,
            created_at: self.created_at,
            tags,
        }
    }
}

/// Log which step of a multi-step write failed before the error is
/// flattened for the caller.
fn step<T>(name: &'static str, result: Result<T, DbError>) -> Result<T, DbError> {
    if let Err(err) = &result {
        warn!(step = name, error = %err, "Question write step failed, rolling back");
    }
    result
}

/// Resolve every tag in lock order and associate it with `question`.
///
/// Returns the tags in the list's first-seen order.
async fn attach_tags(
    tx: &mut Transaction<'_, Postgres>,
    question: QuestionId,
    tags: &TagList,
) -> Result<Vec<Tag>, DbError> {
    let mut resolved: Vec<Tag> = Vec::with_capacity(tags.len());
    for name in tags.lock_order() {
        let tag = step("resolve_tag", resolve_tx(tx, name).await)?.tag;
        step(
            "associate_tag",
            ledger::associate(tx, question, tag.id).await.map_err(DbError::from),
        )?;
        resolved.push(tag);
    }

    let ordered = tags
        .names()
        .iter()
        .filter_map(|name| resolved.iter().find(|t| t.name == name.as_str()).cloned())
        .collect();
    Ok(ordered)
}

/// Question repository
pub struct QuestionRepo<'a> {
    store: &'a Store,
}

impl<'a> QuestionRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Insert a question and associate its tags, atomically.
    pub async fn create(&self, input: &NewQuestion) -> Result<Question, DbError> {
        let store = self.store;
        let span = tracing::info_span!("question.create", author = %input.author, tags = input.tags.len());
        store
            .run("question.create", move || async move {
                let mut tx = store.begin().await?;

                if !ledger::user_exists(&mut tx, input.author).await? {
                    return Err(DbError::not_found("user", input.author));
                }

                let row: QuestionRow = step(
                    "insert_question",
                    sqlx::query_as::<_, QuestionRow>(
                        r#"
                        INSERT INTO questions (title, content, author_id)
                        VALUES ($1, $2, $3)
                        RETURNING id, title, content, author_id, views, created_at
                        "#,
                    )
                    .bind(input.title.as_str())
                    .bind(input.content.as_str())
                    .bind(input.author)
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(DbError::missing_reference),
                )?;

                let tags = attach_tags(&mut tx, row.id, &input.tags).await?;

                step("commit", tx.commit().await.map_err(DbError::from))?;

                let question = row.with_tags(tags);
                info!(question = %question.id, "Question created");
                Ok(question)
            })
            .instrument(span)
            .await
    }

    /// Replace a question's title, content and tag set, atomically.
    ///
    /// Tags no longer listed are dissociated; tag rows themselves are kept.
    pub async fn edit(&self, id: QuestionId, edit: &QuestionEdit) -> Result<Question, DbError> {
        let store = self.store;
        let span = tracing::info_span!("question.edit", question = %id);
        store
            .run("question.edit", move || async move {
                let mut tx = store.begin().await?;

                let row = sqlx::query_as::<_, QuestionRow>(
                    r#"
                    UPDATE questions SET title = $2, content = $3
                    WHERE id = $1
                    RETURNING id, title, content, author_id, views, created_at
                    "#,
                )
                .bind(id)
                .bind(edit.title.as_str())
                .bind(edit.content.as_str())
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("question", id))?;

                let tags = attach_tags(&mut tx, id, &edit.tags).await?;
                let keep: Vec<_> = tags.iter().map(|t| t.id).collect();
                let dropped = step(
                    "dissociate_tags",
                    ledger::dissociate_except(&mut tx, id, &keep)
                        .await
                        .map_err(DbError::from),
                )?;

                tx.commit().await?;

                info!(question = %id, dropped, "Question edited");
                Ok(row.with_tags(tags))
            })
            .instrument(span)
            .await
    }

    /// Delete a question; answers, votes, bookmarks and associations cascade.
    pub async fn delete(&self, id: QuestionId) -> Result<(), DbError> {
        let store = self.store;
        store
            .run("question.delete", move || async move {
                let mut tx = store.begin().await?;
                let result = sqlx::query("DELETE FROM questions WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                if result.rows_affected() == 0 {
                    return Err(DbError::not_found("question", id));
                }
                tx.commit().await?;
                info!(question = %id, "Question deleted");
                Ok(())
            })
            .await
    }

    /// Increment the view counter and return the new count.
    pub async fn record_view(&self, id: QuestionId) -> Result<i64, DbError> {
        let store = self.store;
        store
            .run("question.record_view", move || async move {
                let mut tx = store.begin().await?;
                let views: Option<i64> =
                    sqlx::query_scalar("UPDATE questions SET views = views + 1 WHERE id = $1 RETURNING views")
                        .bind(id)
                        .fetch_optional(&mut *tx)
                        .await?;
                let views = views.ok_or_else(|| DbError::not_found("question", id))?;
                tx.commit().await?;
                Ok(views)
            })
            .await
    }

    /// Tags currently associated with a question, by name.
    pub async fn tags(&self, id: QuestionId) -> Result<Vec<Tag>, DbError> {
        let store = self.store;
        store
            .run("question.tags", move || async move {
                let mut tx = store.begin().await?;
                if !ledger::target_exists(&mut tx, VoteTarget::Question(id)).await? {
                    return Err(DbError::not_found("question", id));
                }
                let tags = ledger::question_tags(&mut tx, id).await?;
                tx.commit().await?;
                Ok(tags)
            })
            .await
    }
}
