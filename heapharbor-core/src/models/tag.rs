//! Tag name validation and tag list normalization
//!
//! Names are matched exactly (case-sensitive) against `tags.name`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::{TagId, ValidationError};

/// Maximum length for a tag name, in characters
const MAX_TAG_NAME_LEN: usize = 15;

/// Maximum number of distinct tags on one question
pub const MAX_TAGS_PER_QUESTION: usize = 5;

/// A single token: no whitespace anywhere
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+$").expect("invalid tag regex"));

/// Validated tag name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagName(String);

impl TagName {
    /// Create a tag name, trimming surrounding whitespace.
    ///
    /// # Example
    /// ```
    /// use heapharbor_core::models::TagName;
    ///
    /// assert_eq!(TagName::new(" rust ").unwrap().as_str(), "rust");
    /// assert!(TagName::new("two words").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: "tag name" });
        }

        if trimmed.chars().count() > MAX_TAG_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "tag name",
                max: MAX_TAG_NAME_LEN,
            });
        }

        if !TAG_RE.is_match(trimmed) {
            return Err(ValidationError::InvalidFormat {
                field: "tag name",
                reason: "must not contain whitespace",
            });
        }

        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Distinct tag names for one question, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList(Vec<TagName>);

impl TagList {
    /// Validate every name and collapse duplicates.
    ///
    /// The limit applies to distinct names, so `["go", "go"]` counts once.
    /// Stops at the first distinct name past the limit; later input is
    /// never looked at.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, ValidationError> {
        let mut distinct: Vec<TagName> = Vec::with_capacity(MAX_TAGS_PER_QUESTION);
        for raw in names {
            let name = TagName::new(raw.as_ref())?;
            if distinct.contains(&name) {
                continue;
            }
            if distinct.len() == MAX_TAGS_PER_QUESTION {
                return Err(ValidationError::TooMany {
                    field: "tags",
                    max: MAX_TAGS_PER_QUESTION,
                });
            }
            distinct.push(name);
        }

        Ok(Self(distinct))
    }

    pub fn names(&self) -> &[TagName] {
        &self.0
    }

    /// Names in lexical order.
    ///
    /// Resolving in this order makes concurrent writers with overlapping
    /// tag sets take the `tags.name` index locks in the same sequence.
    pub fn lock_order(&self) -> Vec<&TagName> {
        let mut ordered: Vec<&TagName> = self.0.iter().collect();
        ordered.sort();
        ordered
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Tag row as seen by the write core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(TagName::new("go").is_ok());
        assert!(TagName::new("c++").is_ok());
        assert!(TagName::new("next.js").is_ok());
        assert!(TagName::new("PostgreSQL").is_ok());
    }

    #[test]
    fn case_is_preserved() {
        assert_eq!(TagName::new("Rust").unwrap().as_str(), "Rust");
        assert_ne!(TagName::new("Rust").unwrap(), TagName::new("rust").unwrap());
    }

    #[test]
    fn rejects_empty_and_blank() {
        assert!(matches!(TagName::new(""), Err(ValidationError::Empty { .. })));
        assert!(matches!(TagName::new("   "), Err(ValidationError::Empty { .. })));
    }

    #[test]
    fn rejects_internal_whitespace() {
        let err = TagName::new("two words").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn max_length() {
        assert!(TagName::new(&"a".repeat(15)).is_ok());
        let err = TagName::new(&"a".repeat(16)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { max: 15, .. }));
    }

    #[test]
    fn list_collapses_duplicates_in_first_seen_order() {
        let list = TagList::new(&["go", "postgres", "go"]).unwrap();
        let names: Vec<&str> = list.names().iter().map(TagName::as_str).collect();
        assert_eq!(names, vec!["go", "postgres"]);
    }

    #[test]
    fn list_trims_before_deduplicating() {
        let list = TagList::new(&["go", " go "]).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn list_limit_counts_distinct_names() {
        assert!(TagList::new(&["a", "b", "c", "d", "e", "a", "b"]).is_ok());
        let err = TagList::new(&["a", "b", "c", "d", "e", "f"]).unwrap_err();
        assert!(matches!(err, ValidationError::TooMany { max: 5, .. }));
    }

    #[test]
    fn oversized_list_is_rejected_before_reading_the_rest() {
        let mut names: Vec<String> = (0..40_000).map(|i| format!("t{i}")).collect();
        // Would fail validation if it were ever reached
        names.push("not a tag".to_owned());

        let err = TagList::new(&names).unwrap_err();
        assert!(matches!(err, ValidationError::TooMany { field: "tags", max: 5 }));
    }

    #[test]
    fn empty_list_is_allowed() {
        let list = TagList::new::<&str>(&[]).unwrap();
        assert!(list.is_empty());
    }

    #[test]
    fn lock_order_is_sorted() {
        let list = TagList::new(&["sql", "go", "postgres"]).unwrap();
        let ordered: Vec<&str> = list.lock_order().into_iter().map(TagName::as_str).collect();
        assert_eq!(ordered, vec!["go", "postgres", "sql"]);
    }
}
