use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use goaltrack_core::{GoalId, UserId};
use goaltrack_goals::{
    Category, Goal, GoalDraft, GoalFilter, GoalStats, Priority, SortKey, filter_goals, sort_goals,
};
use proptest::prelude::*;

fn base_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
}

fn today() -> NaiveDate {
    base_now().date_naive()
}

fn priority_strategy() -> impl Strategy<Value = Priority> {
    prop_oneof![Just(Priority::High), Just(Priority::Medium), Just(Priority::Low)]
}

fn category_strategy() -> impl Strategy<Value = Category> {
    prop::sample::select(Category::ALL.to_vec())
}

prop_compose! {
    fn goal_fields()(
        priority in priority_strategy(),
        category in category_strategy(),
        deadline_offset in -40i64..40,
        created_offset in 0i64..10_000,
        completed in any::<bool>(),
    ) -> (Priority, Category, i64, i64, bool) {
        (priority, category, deadline_offset, created_offset, completed)
    }
}

fn goals_strategy() -> impl Strategy<Value = Vec<Goal>> {
    prop::collection::vec(goal_fields(), 0..40).prop_map(|fields| {
        fields
            .into_iter()
            .enumerate()
            .map(|(idx, (priority, category, deadline_offset, created_offset, completed))| {
                let mut draft = GoalDraft::new(format!("goal {idx}"), today() + Duration::days(deadline_offset));
                draft.priority = priority;
                draft.category = category;
                let mut goal = draft
                    .into_new_goal(
                        UserId::parse("user").unwrap(),
                        base_now() - Duration::minutes(created_offset),
                    )
                    .unwrap()
                    .into_goal(GoalId::parse(format!("id-{idx}")).unwrap());
                goal.completed = completed;
                goal
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Property: completed and pending partition the full view.
    #[test]
    fn completed_and_pending_partition_all(goals in goals_strategy()) {
        let all = filter_goals(&goals, GoalFilter::All, today());
        let completed = filter_goals(&goals, GoalFilter::Completed, today());
        let pending = filter_goals(&goals, GoalFilter::Pending, today());

        prop_assert_eq!(all.len(), goals.len());
        prop_assert_eq!(completed.len() + pending.len(), all.len());

        for goal in &all {
            let in_completed = completed.iter().any(|g| g.id == goal.id);
            let in_pending = pending.iter().any(|g| g.id == goal.id);
            prop_assert!(in_completed ^ in_pending);
        }
    }

    /// Property: priority sort groups high < medium < low and keeps input order within a group.
    #[test]
    fn priority_sort_is_grouped_and_stable(goals in goals_strategy(), filter_idx in 0usize..6) {
        let filter = GoalFilter::ALL[filter_idx];
        let input = filter_goals(&goals, filter, today());
        let mut sorted = input.clone();
        sort_goals(&mut sorted, SortKey::Priority);

        prop_assert_eq!(sorted.len(), input.len());
        for pair in sorted.windows(2) {
            prop_assert!(pair[0].priority.rank() <= pair[1].priority.rank());
        }

        for priority in Priority::ALL {
            let before: Vec<_> = input.iter().filter(|g| g.priority == priority).map(|g| &g.id).collect();
            let after: Vec<_> = sorted.iter().filter(|g| g.priority == priority).map(|g| &g.id).collect();
            prop_assert_eq!(before, after);
        }
    }

    /// Property: date windows nest (today within week within month).
    #[test]
    fn date_windows_nest(goals in goals_strategy()) {
        let today_view = filter_goals(&goals, GoalFilter::Today, today());
        let week = filter_goals(&goals, GoalFilter::Week, today());
        let month = filter_goals(&goals, GoalFilter::Month, today());

        for goal in &today_view {
            prop_assert!(week.iter().any(|g| g.id == goal.id));
        }
        for goal in &week {
            prop_assert!(month.iter().any(|g| g.id == goal.id));
        }
    }

    /// Property: stats arithmetic is internally consistent.
    #[test]
    fn stats_are_consistent(goals in goals_strategy()) {
        let stats = GoalStats::compute(&goals, base_now());

        prop_assert_eq!(stats.total, goals.len());
        prop_assert_eq!(stats.pending, stats.total - stats.completed);
        prop_assert!(stats.overdue <= stats.pending);
        prop_assert!(stats.completion_rate <= 100);

        let category_total: usize = stats.by_category.values().map(|c| c.total).sum();
        let category_completed: usize = stats.by_category.values().map(|c| c.completed).sum();
        prop_assert_eq!(category_total, stats.total);
        prop_assert_eq!(category_completed, stats.completed);
    }
}
