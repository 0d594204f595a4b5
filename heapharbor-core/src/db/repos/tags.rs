//! Tag resolver
//!
//! Maps a tag name to its row, creating the row on first use. Safe under
//! concurrent creation of the same name: the unique index on `tags.name`
//! decides the winner and the loser re-reads the winner's row.

use sqlx::{Postgres, Transaction};
use tracing::debug;

use crate::db::{ledger, DbError, Store};
use crate::models::{Tag, TagName};

/// A resolved tag and whether this call created it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTag {
    pub tag: Tag,
    pub created: bool,
}

/// Resolve `name` inside the caller's transaction.
///
/// 1. Look the name up.
/// 2. If absent, insert with `ON CONFLICT DO NOTHING`.
/// 3. If the insert lost a race, read again. Under read committed a new
///    statement sees the row the winner committed.
pub async fn resolve_tx(
    tx: &mut Transaction<'_, Postgres>,
    name: &TagName,
) -> Result<ResolvedTag, DbError> {
    if let Some(tag) = ledger::find_tag(tx, name.as_str()).await? {
        return Ok(ResolvedTag {
            tag,
            created: false,
        });
    }

    if let Some(tag) = ledger::insert_tag_if_absent(tx, name.as_str()).await? {
        debug!(tag = %tag.name, id = %tag.id, "Created tag");
        return Ok(ResolvedTag { tag, created: true });
    }

    debug!(tag = name.as_str(), "Lost tag insert race, re-reading");
    match ledger::find_tag(tx, name.as_str()).await? {
        Some(tag) => Ok(ResolvedTag {
            tag,
            created: false,
        }),
        None => Err(DbError::RaceLost {
            resource: "tag",
            key: name.as_str().to_owned(),
        }),
    }
}

/// Tag repository
pub struct TagRepo<'a> {
    store: &'a Store,
}

impl<'a> TagRepo<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// Resolve a single tag name in its own unit of work.
    pub async fn resolve(&self, name: &TagName) -> Result<ResolvedTag, DbError> {
        let store = self.store;
        store
            .run("tag.resolve", move || async move {
                let mut tx = store.begin().await?;
                let resolved = resolve_tx(&mut tx, name).await?;
                tx.commit().await?;
                Ok(resolved)
            })
            .await
    }
}
