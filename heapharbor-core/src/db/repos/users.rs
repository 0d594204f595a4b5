//! User repository
//!
//! Users come from the external identity provider; the write core only
//! needs them to exist so edges have something to point at.

use tracing::info;

use crate::db::{DbError, Store};
use crate::models::{NewUser, User, UserId};

const USER_COLUMNS: &str =
    "id, external_id, name, username, email, picture, reputation, joined_at";

pub struct UserRepo<'a> {
    store: &'a Store,
}

impl<'a> UserRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Register a user. A taken external id is a `Conflict`.
    pub async fn create(&self, input: &NewUser) -> Result<User, DbError> {
        let store = self.store;
        let sql = format!(
            "INSERT INTO users (external_id, name, username, email, picture) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let sql = sql.as_str();
        let user = store
            .run("user.create", move || async move {
                let mut tx = store.begin().await?;
                let user = sqlx::query_as::<_, User>(sql)
                    .bind(input.external_id())
                    .bind(input.name())
                    .bind(input.username())
                    .bind(input.email())
                    .bind(input.picture())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| DbError::unique_conflict(e, "user", input.external_id()))?;
                tx.commit().await?;
                Ok(user)
            })
            .await?;

        info!(user = %user.id, "User created");
        Ok(user)
    }

    pub async fn get(&self, id: UserId) -> Result<User, DbError> {
        let store = self.store;
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let sql = sql.as_str();
        store
            .run("user.get", move || async move {
                let mut tx = store.begin().await?;
                let user = sqlx::query_as::<_, User>(sql)
                    .bind(id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| DbError::not_found("user", id))?;
                tx.commit().await?;
                Ok(user)
            })
            .await
    }
}
