//! Question and answer commands

use anyhow::Result;
use clap::{Parser, Subcommand};
use heapharbor_core::db::{AnswerRepo, NewQuestion, QuestionEdit, QuestionRepo};
use heapharbor_core::models::{AnswerId, PostContent, QuestionId, UserId};
use heapharbor_core::Store;
use serde_json::json;

use super::print_json;

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// Author's user id
    #[arg(long)]
    pub author: i64,

    /// Question title (5-130 characters)
    #[arg(long)]
    pub title: String,

    /// Question body
    #[arg(long)]
    pub content: String,

    /// Tag name; repeat for several (duplicates collapse, at most 5)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct EditArgs {
    /// Question id
    pub id: i64,

    #[arg(long)]
    pub title: String,

    #[arg(long)]
    pub content: String,

    /// Full replacement tag set; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct AnswerArgs {
    /// Question id
    pub question: i64,

    /// Author's user id
    #[arg(long)]
    pub author: i64,

    #[arg(long)]
    pub content: String,
}

#[derive(Parser, Debug)]
pub struct QuestionRef {
    /// Question id
    pub id: i64,
}

#[derive(Parser, Debug)]
pub struct DeleteArgs {
    #[command(subcommand)]
    pub target: DeleteTarget,
}

#[derive(Subcommand, Debug)]
pub enum DeleteTarget {
    /// Delete a question with its answers, votes and tag links
    Question(QuestionRef),
    /// Delete an answer with its votes
    Answer {
        /// Answer id
        id: i64,
    },
}

pub async fn run_ask(store: &Store, args: AskArgs) -> Result<()> {
    let input = NewQuestion::new(&args.title, &args.content, UserId(args.author), &args.tags)?;
    let question = QuestionRepo::new(store).create(&input).await?;
    print_json(&question)
}

pub async fn run_edit(store: &Store, args: EditArgs) -> Result<()> {
    let edit = QuestionEdit::new(&args.title, &args.content, &args.tags)?;
    let question = QuestionRepo::new(store).edit(QuestionId(args.id), &edit).await?;
    print_json(&question)
}

pub async fn run_answer(store: &Store, args: AnswerArgs) -> Result<()> {
    let content = PostContent::new(&args.content)?;
    let answer = AnswerRepo::new(store)
        .create(QuestionId(args.question), UserId(args.author), &content)
        .await?;
    print_json(&answer)
}

pub async fn run_view(store: &Store, args: QuestionRef) -> Result<()> {
    let views = QuestionRepo::new(store).record_view(QuestionId(args.id)).await?;
    print_json(&json!({ "question_id": args.id, "views": views }))
}

pub async fn run_tags(store: &Store, args: QuestionRef) -> Result<()> {
    let tags = QuestionRepo::new(store).tags(QuestionId(args.id)).await?;
    print_json(&tags)
}

pub async fn run_delete(store: &Store, args: DeleteArgs) -> Result<()> {
    let deleted = match args.target {
        DeleteTarget::Question(q) => {
            QuestionRepo::new(store).delete(QuestionId(q.id)).await?;
            json!({ "deleted": { "kind": "question", "id": q.id } })
        }
        DeleteTarget::Answer { id } => {
            AnswerRepo::new(store).delete(AnswerId(id)).await?;
            json!({ "deleted": { "kind": "answer", "id": id } })
        }
    };
    print_json(&deleted)
}
