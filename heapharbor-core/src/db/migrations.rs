//! Schema migrations
//!
//! Idempotent DDL, run in order on startup. Uniqueness of tag names,
//! associations and vote edges is enforced here; the repositories rely on
//! these constraints for `ON CONFLICT` handling.

use sqlx::PgPool;

use super::DbError;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id BIGSERIAL PRIMARY KEY,
            external_id TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            username TEXT NOT NULL,
            email TEXT NOT NULL,
            bio TEXT,
            picture TEXT,
            location TEXT,
            portfolio_website TEXT,
            reputation INTEGER NOT NULL DEFAULT 0,
            joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "questions",
        r#"
        CREATE TABLE IF NOT EXISTS questions (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            views BIGINT NOT NULL DEFAULT 0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "answers",
        r#"
        CREATE TABLE IF NOT EXISTS answers (
            id BIGSERIAL PRIMARY KEY,
            content TEXT NOT NULL,
            question_id BIGINT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "tags",
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "questions_tags",
        r#"
        CREATE TABLE IF NOT EXISTS questions_tags (
            question_id BIGINT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            tag_id BIGINT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (question_id, tag_id)
        )
        "#,
    ),
    (
        "questions_upvotes",
        r#"
        CREATE TABLE IF NOT EXISTS questions_upvotes (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            question_id BIGINT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, question_id)
        )
        "#,
    ),
    (
        "questions_downvotes",
        r#"
        CREATE TABLE IF NOT EXISTS questions_downvotes (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            question_id BIGINT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, question_id)
        )
        "#,
    ),
    (
        "answers_upvotes",
        r#"
        CREATE TABLE IF NOT EXISTS answers_upvotes (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            answer_id BIGINT NOT NULL REFERENCES answers(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, answer_id)
        )
        "#,
    ),
    (
        "answers_downvotes",
        r#"
        CREATE TABLE IF NOT EXISTS answers_downvotes (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            answer_id BIGINT NOT NULL REFERENCES answers(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, answer_id)
        )
        "#,
    ),
    (
        "users_saved_questions",
        r#"
        CREATE TABLE IF NOT EXISTS users_saved_questions (
            user_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            question_id BIGINT NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
            saved_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            PRIMARY KEY (user_id, question_id)
        )
        "#,
    ),
    (
        "indexes",
        r#"
        CREATE INDEX IF NOT EXISTS idx_questions_author ON questions(author_id);
        CREATE INDEX IF NOT EXISTS idx_answers_question ON answers(question_id);
        CREATE INDEX IF NOT EXISTS idx_questions_tags_tag ON questions_tags(tag_id);
        CREATE INDEX IF NOT EXISTS idx_questions_upvotes_question ON questions_upvotes(question_id);
        CREATE INDEX IF NOT EXISTS idx_questions_downvotes_question ON questions_downvotes(question_id);
        CREATE INDEX IF NOT EXISTS idx_answers_upvotes_answer ON answers_upvotes(answer_id);
        CREATE INDEX IF NOT EXISTS idx_answers_downvotes_answer ON answers_downvotes(answer_id);
        "#,
    ),
];

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    tracing::info!("Running schema migrations...");

    for (name, statement) in STATEMENTS {
        // raw_sql allows the multi-statement index batch
        sqlx::raw_sql(statement).execute(pool).await?;
        tracing::debug!(step = name, "Migration step applied");
    }

    tracing::info!(steps = STATEMENTS.len(), "Schema migrations complete");
    Ok(())
}
