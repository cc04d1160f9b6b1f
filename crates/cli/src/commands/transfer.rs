//! Export and import of goal backups.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use goaltrack_core::{Clock, SystemClock};
use goaltrack_goals::{ImportDocument, export_file_name};

use crate::commands::confirm;
use crate::context::AppContext;
use crate::output;

#[derive(Args)]
pub struct ExportArgs {
    /// Output file (defaults to goals-backup-YYYY-MM-DD.json)
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Backup file containing a `goals` array
    pub file: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

pub async fn export(app: &mut AppContext, args: ExportArgs) -> Result<()> {
    app.load().await?;

    let document = app.sync.export()?;
    let path = args
        .out
        .unwrap_or_else(|| PathBuf::from(export_file_name(SystemClock.today())));

    std::fs::write(&path, document.to_pretty_json()?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!(
        "{} {} goal(s) to {}",
        "Exported".green().bold(),
        document.stats.total,
        path.display()
    );
    Ok(())
}

pub async fn import(app: &mut AppContext, args: ImportArgs) -> Result<()> {
    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let count = ImportDocument::parse(&text)
        .map(|doc| doc.len())
        .map_err(|e| anyhow::anyhow!("{}: {e}", args.file.display()))?;
    if !confirm(&format!("Import {count} goal(s)?"), args.yes)? {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    app.load().await?;
    let report = app.sync.import_document(&text).await?;
    output::print_batch("Imported", &report);
    Ok(())
}
