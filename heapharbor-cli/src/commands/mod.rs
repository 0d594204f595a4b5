//! Command implementations for the heapharbor CLI

pub mod posts;
pub mod users;
pub mod votes;

use anyhow::{Context, Result};
use serde::Serialize;

// Re-export dispatcher functions for flat access from main.rs
pub use posts::{run_answer, run_ask, run_delete, run_edit, run_tags, run_view};
pub use users::run_user;
pub use votes::{run_save, run_vote};

/// Pretty-print a result on stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to serialize result")?;
    println!("{rendered}");
    Ok(())
}
