//! Focus timer command.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use goaltrack_client::{FocusTimer, TickOutcome, TimerPreset};

use crate::context::AppContext;

#[derive(Args)]
pub struct TimerArgs {
    /// pomodoro, deep-work, extended (or 25, 50, 90)
    #[arg(long, short)]
    pub preset: Option<TimerPreset>,

    /// Stop and rewind the timer instead of running it
    #[arg(long)]
    pub reset: bool,
}

pub async fn run(app: &mut AppContext, args: TimerArgs) -> Result<()> {
    let mut timer = FocusTimer::restore(app.store.clone()).await;
    timer.set_user(app.session.user_id());

    if args.reset {
        timer.reset().await?;
        println!("{} {}", "Timer reset to".dimmed(), timer.display());
        return Ok(());
    }

    if let Some(preset) = args.preset {
        if !timer.select_preset(preset).await? {
            println!(
                "{} keeping the running {} session",
                "note:".cyan(),
                timer.state().session.display_name()
            );
        }
    }

    if timer.is_running() {
        println!("{} {}", "Resuming".bold(), timer.state().session.display_name());
    } else {
        println!("{} {}", "Starting".bold(), timer.state().session.display_name());
    }
    timer.start().await?;

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    interval.tick().await;

    loop {
        print!("\r  {}  ", timer.display().cyan().bold());
        std::io::stdout().flush()?;

        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{} {} left; run again to resume", "Paused.".yellow(), timer.display());
                return Ok(());
            }
        }

        match timer.tick().await? {
            TickOutcome::Running { .. } => {}
            TickOutcome::Completed => {
                println!("\r  {}  ", timer.display().cyan().bold());
                println!("{}", "Timer completed! Take a break.".green().bold());
                let total = timer.sessions().await?.len();
                println!("{} focus session(s) logged", total);
                return Ok(());
            }
            TickOutcome::Idle => return Ok(()),
        }
    }
}
