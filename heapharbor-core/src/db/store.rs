//! Storage handle and unit of work
//!
//! `Store` is passed explicitly to every repository; there is no global
//! pool. Each operation runs through [`Store::run`], which gives it a fresh
//! transaction per attempt and one deadline for all attempts. A
//! `sqlx::Transaction` that is dropped without `commit` rolls back, so an
//! error, an early return or the deadline firing all leave the ledger
//! untouched.

use std::future::Future;

use sqlx::{PgPool, Postgres, Transaction};
use tracing::warn;

use super::{migrations, pool, DbError};
use crate::config::{HarborConfig, UnitOfWorkConfig};

/// Explicit storage handle threaded through every core call
#[derive(Debug, Clone)]
pub struct Store {
    pool: PgPool,
    limits: UnitOfWorkConfig,
}

impl Store {
    pub fn new(pool: PgPool, limits: UnitOfWorkConfig) -> Self {
        Self { pool, limits }
    }

    /// Open a pool from config and bring the schema up to date.
    pub async fn connect(config: &HarborConfig) -> Result<Self, DbError> {
        let pool = pool::create_pool_from_config(&config.database).await?;
        migrations::run(&pool).await?;
        Ok(Self::new(pool, config.unit_of_work.clone()))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Begin a transaction with the configured statement and lock timeouts.
    ///
    /// Both settings are transaction-local and vanish on commit or rollback.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "SELECT set_config('statement_timeout', $1, true), set_config('lock_timeout', $2, true)",
        )
        .bind(format!("{}ms", self.limits.statement_timeout_ms))
        .bind(format!("{}ms", self.limits.lock_timeout_ms))
        .execute(&mut *tx)
        .await?;

        Ok(tx)
    }

    /// Run `work` as one bounded unit of work.
    ///
    /// `work` is called once per attempt and must open (and commit) its own
    /// transaction via [`Store::begin`]. Serialization failures, deadlocks
    /// and lost insert races are retried up to `max_attempts`; the deadline
    /// covers all attempts together.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut work: F) -> Result<T, DbError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbError>>,
    {
        let deadline = self.limits.deadline();
        let max_attempts = self.limits.max_attempts.max(1);

        let attempts = async {
            let mut attempt = 1;
            loop {
                match work().await {
                    Err(err) if err.is_transient() && attempt < max_attempts => {
                        warn!(operation, attempt, error = %err, "Retrying unit of work");
                        attempt += 1;
                    }
                    result => return result,
                }
            }
        };

        match tokio::time::timeout(deadline, attempts).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, ?deadline, "Unit of work timed out, rolled back");
                Err(DbError::Timeout {
                    operation,
                    after: deadline,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use sqlx::postgres::PgPoolOptions;

    /// A store whose pool never connects; `run` never touches it here.
    fn offline_store(limits: UnitOfWorkConfig) -> Store {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool");
        Store::new(pool, limits)
    }

    fn lost_race() -> DbError {
        DbError::RaceLost {
            resource: "tag",
            key: "go".into(),
        }
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let store = offline_store(UnitOfWorkConfig::default());
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = store
            .run("test.retry", move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(lost_race())
                } else {
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn stops_after_max_attempts() {
        let limits = UnitOfWorkConfig {
            max_attempts: 3,
            ..UnitOfWorkConfig::default()
        };
        let store = offline_store(limits);
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = store
            .run("test.exhaust", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(lost_race())
            })
            .await;

        assert!(matches!(result, Err(DbError::RaceLost { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let store = offline_store(UnitOfWorkConfig::default());
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = store
            .run("test.not_found", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(DbError::not_found("question", 1))
            })
            .await;

        assert!(matches!(result, Err(DbError::NotFound { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_cancels_slow_work() {
        let limits = UnitOfWorkConfig {
            deadline_ms: 50,
            ..UnitOfWorkConfig::default()
        };
        let store = offline_store(limits);

        let result: Result<(), _> = store
            .run("test.slow", || async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;

        match result {
            Err(DbError::Timeout { operation, after }) => {
                assert_eq!(operation, "test.slow");
                assert_eq!(after, Duration::from_millis(50));
            }
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
