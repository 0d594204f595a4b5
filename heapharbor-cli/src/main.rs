//! heapharbor CLI - drive the HeapHarbor write core from the shell
//!
//! Every command runs one unit of work against PostgreSQL and prints the
//! result as JSON on stdout:
//! - `migrate` brings the schema up to date
//! - `user` registers and looks up users
//! - `ask`, `edit`, `answer`, `view`, `tags`, `delete` manage posts
//! - `vote` and `save` toggle per-user state
//!
//! ```bash
//! heapharbor ask --author 1 --title "How to model DB relations" \
//!     --content "..." --tag go --tag postgres | jq '.tags'
//! ```

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use heapharbor_core::config::load_dotenv;
use heapharbor_core::{DbError, ErrorKind, HarborConfig, Store};
use heapharbor_core::models::ValidationError;
use tracing::debug;

mod commands;
mod tracing_setup;

#[derive(Parser, Debug)]
#[command(
    name = "heapharbor",
    author,
    version,
    about = "Transactional writes for the HeapHarbor Q&A forum",
    long_about = "Create questions with their tags, toggle votes and bookmarks, and manage \
                  answers. Each command is atomic: it either fully applies or leaves no trace."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Export spans over OTLP (requires the telemetry feature)
    #[arg(long, global = true)]
    otel: bool,

    /// PostgreSQL connection URL (overrides DATABASE_URL and config.toml)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or update the database schema
    Migrate,
    /// Register and look up users
    User(commands::users::UserArgs),
    /// Ask a question with up to five tags
    Ask(commands::posts::AskArgs),
    /// Replace a question's title, content and tags
    Edit(commands::posts::EditArgs),
    /// Answer a question
    Answer(commands::posts::AnswerArgs),
    /// Record a view on a question
    View(commands::posts::QuestionRef),
    /// List the tags on a question
    Tags(commands::posts::QuestionRef),
    /// Delete a question or an answer
    Delete(commands::posts::DeleteArgs),
    /// Toggle an upvote or downvote, or show current vote state
    Vote(commands::votes::VoteArgs),
    /// Save a question, or unsave it if already saved
    Save(commands::votes::SaveArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let tracing_config = tracing_setup::TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    };
    tracing_setup::init(&tracing_config).ok();

    let result = run(cli).await;
    tracing_setup::shutdown_otel();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    load_dotenv()?;
    let mut config = HarborConfig::load()?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    debug!(max_connections = config.database.max_connections, "Connecting");
    let store = Store::connect(&config).await?;

    match cli.command {
        Commands::Migrate => commands::print_json(&serde_json::json!({ "migrated": true }))?,
        Commands::User(args) => commands::run_user(&store, args).await?,
        Commands::Ask(args) => commands::run_ask(&store, args).await?,
        Commands::Edit(args) => commands::run_edit(&store, args).await?,
        Commands::Answer(args) => commands::run_answer(&store, args).await?,
        Commands::View(args) => commands::run_view(&store, args).await?,
        Commands::Tags(args) => commands::run_tags(&store, args).await?,
        Commands::Delete(args) => commands::run_delete(&store, args).await?,
        Commands::Vote(args) => commands::run_vote(&store, args).await?,
        Commands::Save(args) => commands::run_save(&store, args).await?,
    }
    Ok(())
}

/// Exit status per error kind, so scripts can branch without parsing stderr.
fn exit_code(err: &anyhow::Error) -> u8 {
    let kind = if let Some(db) = err.downcast_ref::<DbError>() {
        Some(db.kind())
    } else if err.downcast_ref::<ValidationError>().is_some() {
        Some(ErrorKind::Invalid)
    } else {
        None
    };

    match kind {
        Some(ErrorKind::NotFound) => 2,
        Some(ErrorKind::Invalid) => 3,
        Some(ErrorKind::Conflict) => 4,
        Some(ErrorKind::Unavailable) => 5,
        None => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_kind() {
        let err = anyhow::Error::from(DbError::not_found("question", 10));
        assert_eq!(exit_code(&err), 2);

        let err = anyhow::Error::from(ValidationError::Empty { field: "content" });
        assert_eq!(exit_code(&err), 3);

        let err = anyhow::Error::from(DbError::Conflict {
            resource: "user",
            key: "clerk_1".into(),
        });
        assert_eq!(exit_code(&err), 4);

        assert_eq!(exit_code(&anyhow::anyhow!("config broken")), 1);
    }

    #[test]
    fn cli_parses_repeated_tags() {
        let cli = Cli::try_parse_from([
            "heapharbor",
            "ask",
            "--author",
            "1",
            "--title",
            "How to model DB relations",
            "--content",
            "body",
            "--tag",
            "go",
            "--tag",
            "postgres",
        ])
        .unwrap();
        match cli.command {
            Commands::Ask(args) => assert_eq!(args.tags, vec!["go", "postgres"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_downvote_on_answer() {
        let cli = Cli::try_parse_from([
            "heapharbor", "vote", "answer", "42", "--user", "3", "--down",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Vote(_)));
    }
}
