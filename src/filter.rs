//! Scene and calendar filtering over the memo list.
//!
//! Everything here is a pure function of its arguments. The current instant
//! is passed in explicitly, and its timezone defines what "local" means for
//! calendar bucketing.

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone};

use crate::classify::{TODO_MARKER, normalize_tag};
use crate::model::{Memo, SceneMode};

/// Length of the rolling to-do window, in days after today.
pub const SEVEN_DAY_SPAN: u64 = 7;

/// How the to-do lens narrows by date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    /// Today through today + 7, both days included in full.
    SevenDay,
    /// A single local calendar day.
    Day(NaiveDate),
}

/// One cell of the to-do schedule strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub task_count: usize,
    pub is_today: bool,
}

/// Format an instant as its `YYYY-MM-DD` calendar date in its own timezone.
pub fn local_date_string<Tz: TimeZone>(instant: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant.format("%Y-%m-%d").to_string()
}

/// Memos visible under `mode`, in store order.
///
/// The calendar view only applies to the to-do lens.
pub fn filter_memos<'a, Tz: TimeZone>(
    memos: &'a [Memo],
    mode: SceneMode,
    calendar: CalendarView,
    now: &DateTime<Tz>,
) -> Vec<&'a Memo>
where
    Tz::Offset: std::fmt::Display,
{
    let by_mode = memos.iter().filter(|memo| matches_mode(memo, mode));

    if mode != SceneMode::Todo {
        return by_mode.collect();
    }

    let tz = now.timezone();
    match calendar {
        CalendarView::SevenDay => {
            let (start, end) = seven_day_window(now.naive_local().date());
            by_mode
                .filter(|memo| {
                    effective_local_datetime(memo, &tz).is_some_and(|at| at >= start && at <= end)
                })
                .collect()
        }
        CalendarView::Day(day) => {
            let target = day.format("%Y-%m-%d").to_string();
            by_mode
                .filter(|memo| effective_date_string(memo, &tz) == target)
                .collect()
        }
    }
}

/// The seven-day schedule strip starting today, with the number of to-do
/// tagged memos falling on each day.
pub fn calendar_strip<Tz: TimeZone>(memos: &[Memo], now: &DateTime<Tz>) -> Vec<CalendarDay>
where
    Tz::Offset: std::fmt::Display,
{
    let tz = now.timezone();
    let today = now.naive_local().date();
    let todo_dates: Vec<String> = memos
        .iter()
        .filter(|memo| {
            memo.analysis.as_ref().is_some_and(|analysis| {
                analysis
                    .categories
                    .iter()
                    .any(|cat| normalize_tag(cat).contains(TODO_MARKER))
            })
        })
        .map(|memo| effective_date_string(memo, &tz))
        .collect();

    (0..SEVEN_DAY_SPAN)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| {
            let key = date.format("%Y-%m-%d").to_string();
            CalendarDay {
                date,
                task_count: todo_dates.iter().filter(|d| **d == key).count(),
                is_today: date == today,
            }
        })
        .collect()
}

fn matches_mode(memo: &Memo, mode: SceneMode) -> bool {
    if mode == SceneMode::All {
        return true;
    }
    match &memo.analysis {
        Some(analysis) => {
            let needle = normalize_tag(mode.as_str());
            analysis
                .categories
                .iter()
                .any(|cat| normalize_tag(cat).contains(&needle))
        }
        None => memo.scene_mode == mode,
    }
}

/// `[today 00:00:00.000, today+7 23:59:59.999]` in local wall-clock time.
fn seven_day_window(today: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = today.and_time(NaiveTime::MIN);
    let end = today
        .checked_add_days(Days::new(SEVEN_DAY_SPAN + 1))
        .map_or(NaiveDateTime::MAX, |next| {
            next.and_time(NaiveTime::MIN) - TimeDelta::milliseconds(1)
        });
    (start, end)
}

/// Effective date as local wall-clock time. A due date counts as local
/// midnight of that day; an unparseable one has no position in time.
fn effective_local_datetime<Tz: TimeZone>(memo: &Memo, tz: &Tz) -> Option<NaiveDateTime> {
    match due_date(memo) {
        Some(due) => NaiveDate::parse_from_str(due, "%Y-%m-%d")
            .ok()
            .map(|date| date.and_time(NaiveTime::MIN)),
        None => Some(memo.timestamp.with_timezone(tz).naive_local()),
    }
}

/// Effective date as a `YYYY-MM-DD` string. Due dates are used verbatim.
fn effective_date_string<Tz: TimeZone>(memo: &Memo, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match due_date(memo) {
        Some(due) => due.to_string(),
        None => local_date_string(&memo.timestamp.with_timezone(tz)),
    }
}

fn due_date(memo: &Memo) -> Option<&str> {
    memo.analysis
        .as_ref()
        .and_then(|analysis| analysis.due_date.as_deref())
}
