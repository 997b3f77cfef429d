use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::init_store;
use crate::engine::calendar::{parse_date, week_range, weeks_of_month};
use crate::engine::{Clock, HabitDayPlan, SystemClock, WeekProgress, monthly_progress, plan_day};
use crate::store::Store;

#[derive(Serialize)]
struct TodayOutput {
    date: NaiveDate,
    week_start: NaiveDate,
    week_end: NaiveDate,
    habits: Vec<HabitDayPlan>,
}

#[derive(Serialize)]
struct ProgressOutput {
    year: i32,
    month: u32,
    weeks: Vec<WeekProgress>,
}

/// Prints the day plan for `date`, or for today.
pub fn run_today(data_dir: &Path, date: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = init_store(data_dir)?;
    let today = SystemClock.today();
    let date = match date {
        Some(raw) => parse_date(raw)?,
        None => today,
    };
    let (week_start, week_end) = week_range(date);

    let habits = store.list_habits(false)?;
    let completions = store.list_completions(week_start, week_end)?;

    let output = TodayOutput {
        date,
        week_start,
        week_end,
        habits: plan_day(&habits, &completions, date, today),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} (week {} to {})",
        date.weekday(),
        date,
        output.week_start,
        output.week_end
    );
    if output.habits.is_empty() {
        println!("  No habits active this week.");
    }
    for habit in &output.habits {
        println!(
            "  {:<24} {}/{} this week, {} remaining",
            habit.name, habit.plan.completed_count, habit.weekly_target, habit.plan.remaining
        );
        for completion in &habit.plan.completed_for_date {
            if let Some(text) = &completion.text {
                println!("      - {text}");
            }
        }
    }

    Ok(())
}

/// Prints week-by-week progress for a `YYYY-MM` month, or the current one.
pub fn run_progress(data_dir: &Path, month: Option<&str>, json: bool) -> anyhow::Result<()> {
    let store = init_store(data_dir)?;
    let today = SystemClock.today();
    let first = match month {
        Some(raw) => parse_date(&format!("{raw}-01"))?,
        None => today.with_day(1).unwrap_or(today),
    };
    let (year, month) = (first.year(), first.month());

    let weeks = weeks_of_month(year, month)?;
    let (Some(start), Some(last)) = (weeks.first(), weeks.last()) else {
        anyhow::bail!("{year}-{month:02} has no weeks");
    };

    let habits = store.list_habits(false)?;
    let completions = store.list_completions(*start, *last + Duration::days(6))?;

    let output = ProgressOutput {
        year,
        month,
        weeks: monthly_progress(&habits, &completions, year, month, today)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("Progress for {year}-{month:02}");
    for week in &output.weeks {
        println!(
            "  {} to {}  {:>3}/{:<3} {:>6.1}%  {}",
            week.week_start,
            week.week_end,
            week.completed,
            week.required,
            week.percentage,
            week.band.as_str()
        );
    }

    Ok(())
}
