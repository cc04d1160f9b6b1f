//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

use goaltrack_client::ClientConfig;
use goaltrack_observability::LogFormat;

use crate::context::AppContext;

pub mod goals;
pub mod timer;
pub mod transfer;

/// Track personal goals against the goal store
#[derive(Parser)]
#[command(name = "goaltrack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log output format (pretty or json)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List goals
    List(goals::ListArgs),

    /// Create a goal
    Add(goals::AddArgs),

    /// Edit fields of a goal
    Edit(goals::EditArgs),

    /// Flip a goal between pending and completed
    Toggle(goals::IdArgs),

    /// Delete a goal
    Delete(goals::DeleteArgs),

    /// Delete every completed goal
    ClearCompleted(goals::ConfirmArgs),

    /// Show progress statistics
    Stats,

    /// Write all goals to a backup file
    Export(transfer::ExportArgs),

    /// Create goals from a backup file
    Import(transfer::ImportArgs),

    /// Run a focus timer
    Timer(timer::TimerArgs),
}

impl Cli {
    pub async fn execute(self, config: ClientConfig) -> Result<()> {
        let mut app = AppContext::build(&config)?;

        match self.command {
            Commands::List(args) => goals::list(&mut app, args).await,
            Commands::Add(args) => goals::add(&mut app, args).await,
            Commands::Edit(args) => goals::edit(&mut app, args).await,
            Commands::Toggle(args) => goals::toggle(&mut app, args).await,
            Commands::Delete(args) => goals::delete(&mut app, args).await,
            Commands::ClearCompleted(args) => goals::clear_completed(&mut app, args).await,
            Commands::Stats => goals::stats(&mut app).await,
            Commands::Export(args) => transfer::export(&mut app, args).await,
            Commands::Import(args) => transfer::import(&mut app, args).await,
            Commands::Timer(args) => timer::run(&mut app, args).await,
        }
    }
}

/// Ask before a destructive action unless `assume_yes` is set.
pub(crate) fn confirm(prompt: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    Ok(dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?)
}
