//! Repository implementations for the write core
//!
//! Each repository follows these patterns:
//! - Every operation is one `Store::run` unit of work
//! - Conflicts are handled with ON CONFLICT, not check-then-insert
//! - Read-then-write sequences hold an advisory lock on their key

pub mod answers;
pub mod questions;
pub mod saved;
pub mod tags;
pub mod users;
pub mod votes;

pub use answers::AnswerRepo;
pub use questions::{NewQuestion, QuestionEdit, QuestionRepo};
pub use saved::SavedRepo;
pub use tags::{resolve_tx, ResolvedTag, TagRepo};
pub use users::UserRepo;
pub use votes::VoteRepo;
