//! Goal commands.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use clap::Args;
use colored::Colorize;

use goaltrack_client::{ClientError, GoalSynchronizer};
use goaltrack_core::{Clock, GoalId, SystemClock};
use goaltrack_goals::{Category, GoalDraft, GoalFilter, GoalPatch, Priority, Reminder, SortKey};

use crate::commands::confirm;
use crate::context::AppContext;
use crate::output;

#[derive(Args)]
pub struct ListArgs {
    /// all, today, week, month, completed, pending
    #[arg(long, short, default_value = "all")]
    pub filter: GoalFilter,

    /// date-desc, date-asc, priority, deadline
    #[arg(long, short, default_value = "date-desc")]
    pub sort: SortKey,
}

#[derive(Args)]
pub struct AddArgs {
    /// Goal title (omit to restore the last unsaved draft)
    pub title: Option<String>,

    #[arg(long, short)]
    pub description: Option<String>,

    /// Deadline as YYYY-MM-DD
    #[arg(long)]
    pub deadline: Option<NaiveDate>,

    #[arg(long, short, default_value = "skill")]
    pub category: Category,

    #[arg(long, short, default_value = "medium")]
    pub priority: Priority,

    #[arg(long, short, default_value = "none")]
    pub reminder: Reminder,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    /// Empty string clears the description
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub deadline: Option<NaiveDate>,

    #[arg(long)]
    pub category: Option<Category>,

    #[arg(long)]
    pub priority: Option<Priority>,

    #[arg(long)]
    pub reminder: Option<Reminder>,
}

#[derive(Args)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Args)]
pub struct ConfirmArgs {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub id: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

pub async fn list(app: &mut AppContext, args: ListArgs) -> Result<()> {
    app.load().await?;
    app.sync.set_filter(args.filter);
    app.sync.set_sort(args.sort);

    output::print_goals_table(&app.sync.current_view(), SystemClock.today());
    Ok(())
}

pub async fn add(app: &mut AppContext, args: AddArgs) -> Result<()> {
    let drafts = app.drafts();

    let draft = match args.title {
        Some(title) => GoalDraft {
            title,
            description: args.description,
            category: args.category,
            priority: args.priority,
            deadline: args.deadline,
            reminder: args.reminder,
        },
        None => match drafts.take().await? {
            Some(draft) => {
                println!("{} {}", "Restoring draft:".dimmed(), draft.title);
                draft
            }
            None => bail!("a title is required (no saved draft to restore)"),
        },
    };

    app.load().await?;
    match app.sync.create(draft.clone()).await {
        Ok(goal) => {
            println!("{} {}", "Created".green().bold(), goal.title);
            output::print_goal(&goal, SystemClock.today());
            Ok(())
        }
        Err(err @ ClientError::Sync(_)) => {
            drafts.save(&draft).await?;
            eprintln!(
                "{} draft saved; run `goaltrack add` without a title to retry",
                "note:".cyan()
            );
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn edit(app: &mut AppContext, args: EditArgs) -> Result<()> {
    let id = parse_id(&args.id)?;
    let patch = GoalPatch {
        title: args.title,
        description: args.description,
        category: args.category,
        priority: args.priority,
        deadline: args.deadline,
        reminder: args.reminder,
        completed: None,
    };
    if patch.is_empty() {
        bail!("nothing to change; pass at least one field option");
    }

    app.load().await?;
    let goal = app.sync.update(&id, patch).await?;
    println!("{} {}", "Updated".green().bold(), goal.title);
    output::print_goal(&goal, SystemClock.today());
    Ok(())
}

pub async fn toggle(app: &mut AppContext, args: IdArgs) -> Result<()> {
    let id = parse_id(&args.id)?;
    app.load().await?;

    let goal = app.sync.toggle_complete(&id).await?;
    let state = if goal.completed {
        "completed".green()
    } else {
        "pending".yellow()
    };
    println!("{} is now {}", goal.title.bold(), state);
    output::print_progress(&app.sync.stats());
    Ok(())
}

pub async fn delete(app: &mut AppContext, args: DeleteArgs) -> Result<()> {
    let id = parse_id(&args.id)?;
    app.load().await?;

    let title = title_of(&app.sync, &id)?;
    if !confirm(&format!("Delete \"{title}\"?"), args.yes)? {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    app.sync.delete(&id).await?;
    println!("{} {}", "Deleted".red().bold(), title);
    Ok(())
}

pub async fn clear_completed(app: &mut AppContext, args: ConfirmArgs) -> Result<()> {
    app.load().await?;

    let completed = app.sync.filter(GoalFilter::Completed).len();
    if completed == 0 {
        println!("{}", "No completed goals to clear.".dimmed());
        return Ok(());
    }
    if !confirm(&format!("Delete {completed} completed goal(s)?"), args.yes)? {
        println!("{}", "Cancelled.".dimmed());
        return Ok(());
    }

    let report = app.sync.bulk_delete_completed().await?;
    output::print_batch("Cleared", &report);
    Ok(())
}

pub async fn stats(app: &mut AppContext) -> Result<()> {
    app.load().await?;
    output::print_stats(&app.sync.stats());
    Ok(())
}

fn parse_id(raw: &str) -> Result<GoalId> {
    GoalId::parse(raw).context("invalid goal id")
}

fn title_of(sync: &GoalSynchronizer, id: &GoalId) -> Result<String> {
    sync.get(id)
        .map(|g| g.title.clone())
        .ok_or_else(|| ClientError::NotFound(id.clone()).into())
}
