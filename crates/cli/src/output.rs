//! Terminal output formatting.

use chrono::NaiveDate;
use colored::{ColoredString, Colorize};

use goaltrack_client::BatchReport;
use goaltrack_goals::{Goal, GoalStats, Priority};

/// Print a filtered, sorted view as a table.
pub fn print_goals_table(goals: &[&Goal], today: NaiveDate) {
    if goals.is_empty() {
        println!("{}", "No goals found. Create one with 'goaltrack add <title>'.".dimmed());
        return;
    }

    println!(
        "{:<3} {:<38} {:<32} {:<18} {:<8} {:<12}",
        "", "ID", "Title", "Category", "Priority", "Deadline"
    );
    println!("{}", "─".repeat(115));

    for goal in goals {
        let marker = if goal.completed { "✓".green() } else { "·".dimmed() };
        let title = truncate(&goal.title, 30);
        let title = if goal.completed {
            title.dimmed().strikethrough()
        } else {
            title.normal()
        };

        println!(
            "{:<3} {:<38} {:<32} {:<18} {:<8} {}",
            marker,
            goal.id.as_str().dimmed(),
            title,
            goal.category.display_name(),
            priority_colored(goal.priority),
            deadline_colored(goal, today)
        );
    }

    println!();
    println!("{} goal(s)", goals.len());
}

/// Print a single goal.
pub fn print_goal(goal: &Goal, today: NaiveDate) {
    println!("  {} {}", goal.title.cyan().bold(), format!("({})", goal.id).dimmed());
    if let Some(description) = &goal.description {
        println!("  {}", description);
    }
    println!("  {}: {}", "Category".bold(), goal.category.display_name());
    println!("  {}: {}", "Priority".bold(), priority_colored(goal.priority));
    println!("  {}: {}", "Deadline".bold(), deadline_colored(goal, today));
    println!("  {}: {}", "Reminder".bold(), goal.reminder.display_name());
}

/// Print the stats overview with a per-category breakdown.
pub fn print_stats(stats: &GoalStats) {
    println!("{}", "Progress".bold());
    println!();
    println!("  {:<12} {}", "Total", stats.total.to_string().bold());
    println!("  {:<12} {}", "Completed", stats.completed.to_string().green());
    println!("  {:<12} {}", "Pending", stats.pending.to_string().yellow());
    println!("  {:<12} {}", "Overdue", stats.overdue.to_string().red());
    println!();
    print_progress(stats);

    if stats.by_category.is_empty() {
        return;
    }

    println!();
    println!("{}", "By category".bold());
    for (category, progress) in &stats.by_category {
        println!(
            "  {:<20} {}/{} {}",
            category.display_name(),
            progress.completed,
            progress.total,
            format!("({:.0}%)", progress.percent()).dimmed()
        );
    }
}

/// One-line completion bar.
pub fn print_progress(stats: &GoalStats) {
    const WIDTH: usize = 30;
    let filled = (stats.completion_rate as usize * WIDTH) / 100;
    println!(
        "  {}{} {}%",
        "█".repeat(filled).green(),
        "░".repeat(WIDTH - filled).dimmed(),
        stats.completion_rate
    );
}

pub fn print_batch(verb: &str, report: &BatchReport) {
    let summary = format!("{} {}/{} goal(s)", verb, report.succeeded, report.attempted);
    if report.failed() == 0 {
        println!("{}", summary.green().bold());
    } else {
        println!(
            "{} {}",
            summary.yellow().bold(),
            format!("({} failed; see log)", report.failed()).red()
        );
    }
}

fn priority_colored(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => priority.display_name().red().bold(),
        Priority::Medium => priority.display_name().yellow(),
        Priority::Low => priority.display_name().dimmed(),
    }
}

fn deadline_colored(goal: &Goal, today: NaiveDate) -> String {
    let date = goal.deadline.format("%Y-%m-%d").to_string();
    if goal.completed {
        return date.dimmed().to_string();
    }

    let days = goal.days_left(today);
    match days {
        d if d < 0 => format!("{} {}", date.red(), format!("({} days overdue)", -d).red()),
        0 => format!("{} {}", date.yellow(), "(due today)".yellow()),
        d => format!("{} {}", date, format!("({d} days left)").dimmed()),
    }
}

/// Truncate a string to a maximum number of characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Health & Fitness goal", 10), "Health ...");
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }
}
