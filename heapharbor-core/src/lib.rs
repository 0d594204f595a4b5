//! heapharbor-core: transactional write core for the HeapHarbor Q&A forum
//!
//! Keeps per-user vote state on questions and answers consistent, resolves
//! tags by name and creates questions together with their tags. Reads,
//! HTTP and JSON envelopes live elsewhere and call into this crate.
//!
//! ```ignore
//! let config = HarborConfig::load()?;
//! let store = Store::connect(&config).await?;
//!
//! let question = NewQuestion::new("How to model DB relations", "...", author, &["go", "postgres"])?;
//! let created = QuestionRepo::new(&store).create(&question).await?;
//!
//! VoteRepo::new(&store)
//!     .upvote(voter, VoteTarget::Question(created.id))
//!     .await?;
//! ```

pub mod config;
pub mod db;
pub mod models;

pub use config::HarborConfig;
pub use db::{DbError, ErrorKind, Store};
