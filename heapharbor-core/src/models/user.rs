//! User identity and bookmarks

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::validation::bounded_text;
use super::{QuestionId, UserId, ValidationError};

const MAX_NAME_LEN: usize = 50;
const MAX_EXTERNAL_ID_LEN: usize = 255;

/// Validated input for a new user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    external_id: String,
    name: String,
    username: String,
    email: String,
    picture: Option<String>,
}

impl NewUser {
    /// `external_id` is the id issued by the authentication provider.
    pub fn new(
        external_id: &str,
        name: &str,
        username: &str,
        email: &str,
        picture: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let external_id = bounded_text("external id", external_id, 1, MAX_EXTERNAL_ID_LEN)?;
        let name = bounded_text("name", name, 1, MAX_NAME_LEN)?;
        let username = bounded_text("username", username, 1, MAX_NAME_LEN)?;
        let email = bounded_text("email", email, 3, 254)?;
        if !email.contains('@') {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must contain '@'",
            });
        }
        let picture = picture
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        Ok(Self {
            external_id,
            name,
            username,
            email,
            picture,
        })
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn picture(&self) -> Option<&str> {
        self.picture.as_deref()
    }
}

/// User row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub external_id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub picture: Option<String>,
    pub reputation: i32,
    pub joined_at: DateTime<Utc>,
}

/// What a bookmark toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveOutcome {
    Saved,
    Unsaved,
}

/// Result of a bookmark toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveReceipt {
    pub user_id: UserId,
    pub question_id: QuestionId,
    pub outcome: SaveOutcome,
}

/// Advisory lock key serializing bookmark toggles on one pair
pub(crate) fn saved_lock_key(user: UserId, question: QuestionId) -> String {
    format!("saved:{}:{}", user, question)
}
