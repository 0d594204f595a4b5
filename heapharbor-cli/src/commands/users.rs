//! User commands: add, show

use anyhow::Result;
use clap::{Parser, Subcommand};
use heapharbor_core::db::UserRepo;
use heapharbor_core::models::{NewUser, UserId};
use heapharbor_core::Store;

use super::print_json;

#[derive(Parser, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommands,
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Register a user
    Add(AddUserArgs),
    /// Show a user by id
    Show(ShowUserArgs),
}

#[derive(Parser, Debug)]
pub struct AddUserArgs {
    /// Id issued by the authentication provider
    #[arg(long)]
    pub external_id: String,

    /// Display name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub username: String,

    #[arg(long)]
    pub email: String,

    /// Avatar URL
    #[arg(long)]
    pub picture: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ShowUserArgs {
    /// User id
    pub id: i64,
}

pub async fn run_user(store: &Store, args: UserArgs) -> Result<()> {
    let repo = UserRepo::new(store);
    match args.command {
        UserCommands::Add(add) => {
            let input = NewUser::new(
                &add.external_id,
                &add.name,
                &add.username,
                &add.email,
                add.picture.as_deref(),
            )?;
            print_json(&repo.create(&input).await?)
        }
        UserCommands::Show(show) => print_json(&repo.get(UserId(show.id)).await?),
    }
}
