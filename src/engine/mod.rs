//! Habit version resolution and weekly progress accounting.
//!
//! Everything in this module is a pure function of its inputs and a calendar
//! date. Nothing here performs I/O; callers fetch habits and completions and
//! pass "today" in explicitly.

pub mod calendar;
pub mod planner;
pub mod progress;
pub mod resolver;
pub mod rules;

#[cfg(test)]
pub(crate) mod fixtures;

pub use calendar::{Clock, FixedClock, SystemClock};
pub use planner::{HabitDayPlan, InstancePlan, plan_day, plan_instances};
pub use progress::{
    Band, DayCell, HabitWeekRow, WeekProgress, daily_grid, monthly_progress, weekly_progress,
};
pub use resolver::{active_version, check_timeline, latest_version};
