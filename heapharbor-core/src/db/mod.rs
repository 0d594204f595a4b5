//! Database layer - connection pool, schema, ledger primitives, repositories
//!
//! # Design Principles
//!
//! - One explicit `Store` handle, no global pool
//! - Every write is a single transaction with a deadline
//! - Rely on DB constraints, handle conflicts - no unguarded check-then-insert
//! - Primitives in `ledger`, decisions in `repos`

pub mod error;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod repos;
pub mod store;

pub use error::{DbError, ErrorKind};
pub use pool::{create_pool_from_config, create_pool_with_options};
pub use repos::*;
pub use store::Store;
