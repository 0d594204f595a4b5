//! Domain models with validation at construction
//!
//! All caller input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod ids;
pub mod question;
pub mod tag;
pub mod user;
pub mod validation;
pub mod vote;

pub use ids::{AnswerId, QuestionId, TagId, UserId};
pub use question::{Answer, PostContent, Question, QuestionTitle};
pub use tag::{Tag, TagList, TagName, MAX_TAGS_PER_QUESTION};
pub use user::{NewUser, SaveOutcome, SaveReceipt, User};
pub use validation::ValidationError;
pub use vote::{Direction, ToggleOutcome, TogglePlan, VoteReceipt, VoteState, VoteTarget};
