//! Shared fixtures for database integration tests
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p heapharbor-core -- --ignored
//!
//! Every fixture uses fresh, uniquely named rows so tests can share one
//! database and run in parallel.

#![allow(dead_code)]

use heapharbor_core::config::UnitOfWorkConfig;
use heapharbor_core::db::{create_pool_with_options, migrations, QuestionRepo, UserRepo};
use heapharbor_core::models::{NewUser, Question, UserId};
use heapharbor_core::Store;
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

static MIGRATED: OnceCell<()> = OnceCell::const_new();

pub fn database_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL required")
}

async fn migrate_once() {
    MIGRATED
        .get_or_init(|| async {
            let pool = create_pool_with_options(&database_url(), 1)
                .await
                .expect("pool creation failed");
            migrations::run(&pool).await.expect("migrations failed");
            pool.close().await;
        })
        .await;
}

pub async fn store() -> Store {
    store_with(UnitOfWorkConfig::default()).await
}

pub async fn store_with(limits: UnitOfWorkConfig) -> Store {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("heapharbor_core=debug")
        .with_test_writer()
        .try_init();

    migrate_once().await;
    let pool = create_pool_with_options(&database_url(), 10)
        .await
        .expect("pool creation failed");
    Store::new(pool, limits)
}

/// Short random suffix; keeps tag names within their length limit.
pub fn unique(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}{}", &id[..8])
}

pub async fn user(store: &Store) -> UserId {
    let external_id = unique("clerk_");
    let input = NewUser::new(&external_id, "Test User", &external_id, "test@example.com", None)
        .expect("valid user");
    UserRepo::new(store).create(&input).await.expect("user create").id
}

pub async fn question(store: &Store, author: UserId, tags: &[&str]) -> Question {
    let input = heapharbor_core::db::NewQuestion::new(
        &unique("Question "),
        "Body text",
        author,
        tags,
    )
    .expect("valid question");
    QuestionRepo::new(store).create(&input).await.expect("question create")
}

pub async fn count(pool: &PgPool, sql: &str, id: i64) -> i64 {
    sqlx::query_scalar(sql)
        .bind(id)
        .fetch_one(pool)
        .await
        .expect("count query")
}

pub async fn tag_exists(pool: &PgPool, name: &str) -> bool {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tags WHERE name = $1)")
        .bind(name)
        .fetch_one(pool)
        .await
        .expect("tag lookup")
}
