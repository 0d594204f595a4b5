//! Ledger primitives: vote edges, bookmarks and tag associations
//!
//! Existence checks, inserts and deletes, each taking the caller's
//! transaction so repositories can compose several of them atomically.
//! No decisions are made here.
//!
//! Table and column names come from `VoteTarget`, never from caller input,
//! so formatting them into SQL is safe.

use sqlx::{Postgres, Transaction};

use crate::models::{Direction, QuestionId, Tag, TagId, UserId, VoteState, VoteTarget};

type Tx<'c> = Transaction<'c, Postgres>;

/// Take a transaction-scoped advisory lock on `key`.
///
/// Released automatically on commit or rollback. Different keys may hash to
/// the same lock; that only adds contention.
pub async fn lock_key(tx: &mut Tx<'_>, key: &str) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
        .bind(key)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Whether a row with `id` exists in the target's table.
pub async fn target_exists(tx: &mut Tx<'_>, target: VoteTarget) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", target.table());
    let (exists,): (bool,) = sqlx::query_as(&sql)
        .bind(target.id())
        .fetch_one(&mut **tx)
        .await?;
    Ok(exists)
}

pub async fn user_exists(tx: &mut Tx<'_>, user: UserId) -> Result<bool, sqlx::Error> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(user)
        .fetch_one(&mut **tx)
        .await?;
    Ok(exists)
}

// ============================================================================
// Vote edges
// ============================================================================

pub async fn edge_exists(
    tx: &mut Tx<'_>,
    user: UserId,
    target: VoteTarget,
    direction: Direction,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM {} WHERE user_id = $1 AND {} = $2)",
        target.edge_table(direction),
        target.edge_column()
    );
    let (exists,): (bool,) = sqlx::query_as(&sql)
        .bind(user)
        .bind(target.id())
        .fetch_one(&mut **tx)
        .await?;
    Ok(exists)
}

/// Both edge flags for one (user, target) pair.
pub async fn vote_state(
    tx: &mut Tx<'_>,
    user: UserId,
    target: VoteTarget,
) -> Result<VoteState, sqlx::Error> {
    Ok(VoteState {
        up: edge_exists(tx, user, target, Direction::Up).await?,
        down: edge_exists(tx, user, target, Direction::Down).await?,
    })
}

/// Insert an edge; `false` if it was already there.
pub async fn insert_edge(
    tx: &mut Tx<'_>,
    user: UserId,
    target: VoteTarget,
    direction: Direction,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} (user_id, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        target.edge_table(direction),
        target.edge_column()
    );
    let result = sqlx::query(&sql)
        .bind(user)
        .bind(target.id())
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Delete an edge; `false` if there was none.
pub async fn remove_edge(
    tx: &mut Tx<'_>,
    user: UserId,
    target: VoteTarget,
    direction: Direction,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "DELETE FROM {} WHERE user_id = $1 AND {} = $2",
        target.edge_table(direction),
        target.edge_column()
    );
    let result = sqlx::query(&sql)
        .bind(user)
        .bind(target.id())
        .execute(&mut **tx)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Bookmarks
// ============================================================================

pub async fn insert_saved(
    tx: &mut Tx<'_>,
    user: UserId,
    question: QuestionId,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users_saved_questions (user_id, question_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(user)
    .bind(question)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn remove_saved(
    tx: &mut Tx<'_>,
    user: UserId,
    question: QuestionId,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM users_saved_questions WHERE user_id = $1 AND question_id = $2")
            .bind(user)
            .bind(question)
            .execute(&mut **tx)
            .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Tags and associations
// ============================================================================

pub async fn find_tag(tx: &mut Tx<'_>, name: &str) -> Result<Option<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
}

/// Insert a tag unless the name is taken.
///
/// `None` means another transaction holds the name; it may have committed
/// after this statement's snapshot, so the caller must re-read in a new
/// statement rather than trust a `SELECT` in the same one.
pub async fn insert_tag_if_absent(tx: &mut Tx<'_>, name: &str) -> Result<Option<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(
        r#"
        INSERT INTO tags (name) VALUES ($1)
        ON CONFLICT (name) DO NOTHING
        RETURNING id, name
        "#,
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await
}

/// Associate a question with a tag; `false` if the pair already existed.
pub async fn associate(tx: &mut Tx<'_>, question: QuestionId, tag: TagId) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO questions_tags (question_id, tag_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
    )
    .bind(question)
    .bind(tag)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Drop every association of `question` whose tag is not in `keep`.
pub async fn dissociate_except(
    tx: &mut Tx<'_>,
    question: QuestionId,
    keep: &[TagId],
) -> Result<u64, sqlx::Error> {
    let keep: Vec<i64> = keep.iter().map(|id| id.get()).collect();
    let result = sqlx::query(
        "DELETE FROM questions_tags WHERE question_id = $1 AND NOT (tag_id = ANY($2))",
    )
    .bind(question)
    .bind(&keep)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected())
}

/// Tags associated with `question`, by name.
pub async fn question_tags(tx: &mut Tx<'_>, question: QuestionId) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name
        FROM tags t
        JOIN questions_tags qt ON qt.tag_id = t.id
        WHERE qt.question_id = $1
        ORDER BY t.name
        "#,
    )
    .bind(question)
    .fetch_all(&mut **tx)
    .await
}
