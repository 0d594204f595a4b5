//! Vote edges and the toggle decision
//!
//! A vote is an edge in one of two tables per target kind (up or down),
//! never a signed column. `TogglePlan` decides which edges a toggle removes
//! and inserts given the edges that exist now; the vote repository applies
//! the plan inside one transaction.

use std::fmt;

use serde::Serialize;

use super::{AnswerId, QuestionId, UserId};

/// Which way a vote points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Something a user can vote on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum VoteTarget {
    Question(QuestionId),
    Answer(AnswerId),
}

impl VoteTarget {
    pub fn id(self) -> i64 {
        match self {
            Self::Question(id) => id.get(),
            Self::Answer(id) => id.get(),
        }
    }

    /// Resource name used in errors and lock keys
    pub fn kind(self) -> &'static str {
        match self {
            Self::Question(_) => "question",
            Self::Answer(_) => "answer",
        }
    }

    /// Table holding the target rows
    pub(crate) fn table(self) -> &'static str {
        match self {
            Self::Question(_) => "questions",
            Self::Answer(_) => "answers",
        }
    }

    /// Edge table for one direction on this target kind
    pub(crate) fn edge_table(self, direction: Direction) -> &'static str {
        match (self, direction) {
            (Self::Question(_), Direction::Up) => "questions_upvotes",
            (Self::Question(_), Direction::Down) => "questions_downvotes",
            (Self::Answer(_), Direction::Up) => "answers_upvotes",
            (Self::Answer(_), Direction::Down) => "answers_downvotes",
        }
    }

    /// Target column inside the edge tables
    pub(crate) fn edge_column(self) -> &'static str {
        match self {
            Self::Question(_) => "question_id",
            Self::Answer(_) => "answer_id",
        }
    }

    /// Advisory lock key serializing toggles on one (user, target) pair
    pub(crate) fn lock_key(self, user: UserId) -> String {
        format!("vote:{}:{}:{}", self.kind(), user, self.id())
    }
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.id())
    }
}

/// Edges present for one (user, target) pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteState {
    pub up: bool,
    pub down: bool,
}

impl VoteState {
    pub fn has(self, direction: Direction) -> bool {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
        }
    }

    /// The active vote, if exactly one edge exists.
    pub fn current(self) -> Option<Direction> {
        match (self.up, self.down) {
            (true, false) => Some(Direction::Up),
            (false, true) => Some(Direction::Down),
            _ => None,
        }
    }

    fn set(&mut self, direction: Direction, present: bool) {
        match direction {
            Direction::Up => self.up = present,
            Direction::Down => self.down = present,
        }
    }

    /// State after `plan` has been applied.
    pub fn apply(mut self, plan: &TogglePlan) -> Self {
        if let Some(direction) = plan.remove {
            self.set(direction, false);
        }
        if let Some(direction) = plan.insert {
            self.set(direction, true);
        }
        self
    }
}

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// No prior vote; the requested edge was inserted
    Cast,
    /// The same-direction edge existed and was removed
    Retracted,
    /// The opposite edge was removed and the requested edge inserted
    Flipped,
}

/// Edge changes for one toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TogglePlan {
    pub outcome: ToggleOutcome,
    pub remove: Option<Direction>,
    pub insert: Option<Direction>,
}

impl TogglePlan {
    /// Decide the edge changes for a `requested` vote given `current` edges.
    ///
    /// The opposite edge is checked first, so a pair that somehow holds both
    /// edges still ends with only the requested one.
    pub fn for_state(current: VoteState, requested: Direction) -> Self {
        let opposite = requested.opposite();
        if current.has(opposite) {
            Self {
                outcome: ToggleOutcome::Flipped,
                remove: Some(opposite),
                insert: Some(requested),
            }
        } else if current.has(requested) {
            Self {
                outcome: ToggleOutcome::Retracted,
                remove: Some(requested),
                insert: None,
            }
        } else {
            Self {
                outcome: ToggleOutcome::Cast,
                remove: None,
                insert: Some(requested),
            }
        }
    }
}

/// Result of a toggle, echoed back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteReceipt {
    pub user_id: UserId,
    pub target: VoteTarget,
    pub direction: Direction,
    pub outcome: ToggleOutcome,
    pub state: VoteState,
}
