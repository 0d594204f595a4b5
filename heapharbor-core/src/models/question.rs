//! Question and answer text validation

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::validation::bounded_text;
use super::{AnswerId, QuestionId, Tag, UserId, ValidationError};

const MIN_TITLE_LEN: usize = 5;
const MAX_TITLE_LEN: usize = 130;

/// Upper bound shared by question and answer bodies
const MAX_CONTENT_LEN: usize = 100_000;

/// Validated question title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionTitle(String);

impl QuestionTitle {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("title", s, MIN_TITLE_LEN, MAX_TITLE_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validated question or answer body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostContent(String);

impl PostContent {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        bounded_text("content", s, 1, MAX_CONTENT_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Question as returned by the write core
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

/// Answer as returned by the write core
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Answer {
    pub id: AnswerId,
    pub question_id: QuestionId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_bounds() {
        assert!(QuestionTitle::new("How to model DB relations").is_ok());
        assert!(matches!(
            QuestionTitle::new("Why"),
            Err(ValidationError::TooShort { min: 5, .. })
        ));
        assert!(matches!(
            QuestionTitle::new(&"x".repeat(131)),
            Err(ValidationError::TooLong { max: 130, .. })
        ));
    }

    #[test]
    fn content_rejects_blank() {
        assert!(matches!(
            PostContent::new("\n\t "),
            Err(ValidationError::Empty { field: "content" })
        ));
        assert_eq!(PostContent::new(" body ").unwrap().as_str(), "body");
    }
}
