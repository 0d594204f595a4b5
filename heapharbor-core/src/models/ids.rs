//! Surrogate key newtypes
//!
//! All tables use `BIGSERIAL` keys. Wrapping them keeps a question id from
//! being passed where an answer id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize, sqlx::Type,
        )]
        #[serde(transparent)]
        #[sqlx(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// Row id in `users`
    UserId
);
id_type!(
    /// Row id in `questions`
    QuestionId
);
id_type!(
    /// Row id in `answers`
    AnswerId
);
id_type!(
    /// Row id in `tags`
    TagId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_integer() {
        let json = serde_json::to_string(&QuestionId(10)).unwrap();
        assert_eq!(json, "10");

        let id: UserId = serde_json::from_str("7").unwrap();
        assert_eq!(id, UserId(7));
    }

    #[test]
    fn display_is_the_number() {
        assert_eq!(AnswerId(42).to_string(), "42");
    }
}
