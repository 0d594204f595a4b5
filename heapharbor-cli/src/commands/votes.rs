//! Vote and bookmark toggles

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use heapharbor_core::db::{SavedRepo, VoteRepo};
use heapharbor_core::models::{AnswerId, Direction, QuestionId, UserId, VoteTarget};
use heapharbor_core::Store;
use serde_json::json;

use super::print_json;

#[derive(Parser, Debug)]
pub struct VoteArgs {
    #[command(subcommand)]
    pub target: VoteOn,
}

#[derive(Subcommand, Debug)]
pub enum VoteOn {
    /// Vote on a question
    Question(VoteFlags),
    /// Vote on an answer
    Answer(VoteFlags),
}

#[derive(Args, Debug)]
pub struct VoteFlags {
    /// Question or answer id
    pub id: i64,

    /// Voting user's id
    #[arg(long)]
    pub user: i64,

    /// Toggle a downvote instead of an upvote
    #[arg(long, conflicts_with = "show")]
    pub down: bool,

    /// Print the current vote state without changing it
    #[arg(long)]
    pub show: bool,
}

#[derive(Parser, Debug)]
pub struct SaveArgs {
    /// Question id
    pub question: i64,

    /// Saving user's id
    #[arg(long)]
    pub user: i64,
}

pub async fn run_vote(store: &Store, args: VoteArgs) -> Result<()> {
    let (target, flags) = match args.target {
        VoteOn::Question(flags) => (VoteTarget::Question(QuestionId(flags.id)), flags),
        VoteOn::Answer(flags) => (VoteTarget::Answer(AnswerId(flags.id)), flags),
    };
    let user = UserId(flags.user);
    let repo = VoteRepo::new(store);

    if flags.show {
        let state = repo.state(user, target).await?;
        return print_json(&json!({
            "user_id": user,
            "target": target,
            "state": state,
        }));
    }

    let direction = if flags.down { Direction::Down } else { Direction::Up };
    let receipt = repo.toggle(user, target, direction).await?;
    print_json(&receipt)
}

pub async fn run_save(store: &Store, args: SaveArgs) -> Result<()> {
    let receipt = SavedRepo::new(store)
        .toggle(UserId(args.user), QuestionId(args.question))
        .await?;
    print_json(&receipt)
}
