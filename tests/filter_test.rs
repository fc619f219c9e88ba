//! Tests for scene and calendar filtering.
//!
//! All instants are built in a fixed +08:00 zone so local-date bucketing is
//! deterministic regardless of the machine's timezone.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, TimeZone, Utc};
use voxmind::filter::{CalendarView, calendar_strip, filter_memos, local_date_string};
use voxmind::model::{Memo, MemoId, MemoType, SceneMode, StructuredAnalysis};

fn tz() -> FixedOffset {
    FixedOffset::east_opt(8 * 3600).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<FixedOffset> {
    tz().with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 2024-03-01 10:00 local.
fn now() -> DateTime<FixedOffset> {
    at(2024, 3, 1, 10, 0, 0)
}

fn analysis(categories: &[&str], due: Option<&str>) -> StructuredAnalysis {
    StructuredAnalysis {
        title: "t".to_string(),
        summary: "s".to_string(),
        categories: categories.iter().map(|c| c.to_string()).collect(),
        memo_type: MemoType::Note,
        due_date: due.map(str::to_string),
        key_points: vec![],
        action_items: vec![],
        mind_map_nodes: None,
    }
}

fn memo(
    id: &str,
    created: DateTime<FixedOffset>,
    scene: SceneMode,
    analysis: Option<StructuredAnalysis>,
) -> Memo {
    Memo {
        id: MemoId::from(id),
        timestamp: created.with_timezone(&Utc),
        audio_url: None,
        transcription: id.to_string(),
        analysis,
        scene_mode: scene,
        is_processing: false,
    }
}

fn ids(memos: &[&Memo]) -> Vec<String> {
    memos.iter().map(|m| m.id.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Mode filter
// ---------------------------------------------------------------------------

#[test]
fn all_mode_returns_every_memo_in_store_order() {
    let memos = vec![
        memo("c", now(), SceneMode::Idea, Some(analysis(&["Weird"], None))),
        memo("b", now(), SceneMode::Study, None),
        memo("a", now(), SceneMode::Meeting, Some(analysis(&[], None))),
    ];
    let visible = filter_memos(&memos, SceneMode::All, CalendarView::SevenDay, &now());
    assert_eq!(ids(&visible), vec!["c", "b", "a"]);
}

#[test]
fn scene_mode_matches_categories_case_insensitively() {
    let memos = vec![
        memo("meeting-todo", now(), SceneMode::Meeting, Some(analysis(&["MEETING", "To-do"], None))),
        memo("idea", now(), SceneMode::Idea, Some(analysis(&["Idea"], None))),
        memo("study-pending", now(), SceneMode::Study, None),
    ];

    let meeting = filter_memos(&memos, SceneMode::Meeting, CalendarView::SevenDay, &now());
    assert_eq!(ids(&meeting), vec!["meeting-todo"]);

    let idea = filter_memos(&memos, SceneMode::Idea, CalendarView::SevenDay, &now());
    assert_eq!(ids(&idea), vec!["idea"]);

    let study = filter_memos(&memos, SceneMode::Study, CalendarView::SevenDay, &now());
    assert_eq!(ids(&study), vec!["study-pending"]);
}

#[test]
fn analysis_categories_override_scene_mode() {
    // Classified as Personal; the capture-time scene no longer matters.
    let memos = vec![memo(
        "m",
        now(),
        SceneMode::Meeting,
        Some(analysis(&["Personal"], None)),
    )];
    assert!(filter_memos(&memos, SceneMode::Meeting, CalendarView::SevenDay, &now()).is_empty());
    assert_eq!(
        filter_memos(&memos, SceneMode::Personal, CalendarView::SevenDay, &now()).len(),
        1
    );
}

#[test]
fn todo_lens_excludes_unanalyzed_memos_unless_scene_is_todo() {
    let memos = vec![
        memo("idea-pending", now(), SceneMode::Idea, None),
        memo("todo-pending", now(), SceneMode::Todo, None),
    ];
    let visible = filter_memos(&memos, SceneMode::Todo, CalendarView::SevenDay, &now());
    assert_eq!(ids(&visible), vec!["todo-pending"]);
}

#[test]
fn todo_lens_accepts_both_spellings() {
    let memos = vec![
        memo("hyphen", now(), SceneMode::Personal, Some(analysis(&["Personal", "To-do"], None))),
        memo("plain", now(), SceneMode::Study, Some(analysis(&["Study", "TODO"], None))),
        memo("none", now(), SceneMode::Study, Some(analysis(&["Study"], None))),
    ];
    let visible = filter_memos(&memos, SceneMode::Todo, CalendarView::SevenDay, &now());
    assert_eq!(ids(&visible), vec!["hyphen", "plain"]);
}

// ---------------------------------------------------------------------------
// Seven-day window
// ---------------------------------------------------------------------------

#[test]
fn seven_day_window_is_inclusive_at_both_ends() {
    let start = at(2024, 3, 1, 0, 0, 0);
    let last = at(2024, 3, 8, 23, 59, 59) + TimeDelta::milliseconds(999);
    let memos = vec![
        memo("before", start - TimeDelta::milliseconds(1), SceneMode::Todo, None),
        memo("start", start, SceneMode::Todo, None),
        memo("last", last, SceneMode::Todo, None),
        memo("day-eight", last + TimeDelta::milliseconds(1), SceneMode::Todo, None),
    ];
    let visible = filter_memos(&memos, SceneMode::Todo, CalendarView::SevenDay, &now());
    assert_eq!(ids(&visible), vec!["start", "last"]);
}

#[test]
fn seven_day_window_prefers_due_date_over_creation() {
    let long_ago = at(2023, 1, 1, 9, 0, 0);
    let todo = ["Meeting", "To-do"];
    let memos = vec![
        memo("due-today", long_ago, SceneMode::Meeting, Some(analysis(&todo, Some("2024-03-01")))),
        memo("due-day-seven", long_ago, SceneMode::Meeting, Some(analysis(&todo, Some("2024-03-08")))),
        memo("due-day-eight", now(), SceneMode::Meeting, Some(analysis(&todo, Some("2024-03-09")))),
        memo("due-yesterday", now(), SceneMode::Meeting, Some(analysis(&todo, Some("2024-02-29")))),
        memo("no-due", now(), SceneMode::Meeting, Some(analysis(&todo, None))),
        memo("garbled-due", now(), SceneMode::Meeting, Some(analysis(&todo, Some("next week")))),
    ];
    let visible = filter_memos(&memos, SceneMode::Todo, CalendarView::SevenDay, &now());
    assert_eq!(ids(&visible), vec!["due-today", "due-day-seven", "no-due"]);
}

// ---------------------------------------------------------------------------
// Single-day view
// ---------------------------------------------------------------------------

#[test]
fn single_day_compares_local_calendar_dates() {
    // Both instants fall on 2024-03-01 in UTC but on different local days.
    let late = at(2024, 3, 1, 23, 0, 0);
    let early = at(2024, 3, 2, 1, 0, 0);
    assert_eq!(late.with_timezone(&Utc).date_naive(), early.with_timezone(&Utc).date_naive());

    let memos = vec![
        memo("late", late, SceneMode::Todo, None),
        memo("early", early, SceneMode::Todo, None),
    ];

    let first = filter_memos(&memos, SceneMode::Todo, CalendarView::Day(date(2024, 3, 1)), &now());
    assert_eq!(ids(&first), vec!["late"]);

    let second = filter_memos(&memos, SceneMode::Todo, CalendarView::Day(date(2024, 3, 2)), &now());
    assert_eq!(ids(&second), vec!["early"]);
}

#[test]
fn single_day_uses_due_date_string() {
    let memos = vec![memo(
        "call-bob",
        now(),
        SceneMode::Personal,
        Some(analysis(&["Personal", "To-do"], Some("2024-03-05"))),
    )];
    let on_due = filter_memos(&memos, SceneMode::Todo, CalendarView::Day(date(2024, 3, 5)), &now());
    assert_eq!(on_due.len(), 1);
    let on_created = filter_memos(&memos, SceneMode::Todo, CalendarView::Day(date(2024, 3, 1)), &now());
    assert!(on_created.is_empty());
}

#[test]
fn calendar_view_is_ignored_outside_todo_lens() {
    let memos = vec![memo("old", at(2020, 1, 1, 0, 0, 0), SceneMode::Study, None)];
    let visible = filter_memos(&memos, SceneMode::Study, CalendarView::Day(date(2024, 3, 1)), &now());
    assert_eq!(visible.len(), 1);
}

#[test]
fn filtering_is_repeatable() {
    let memos = vec![
        memo("a", now(), SceneMode::Todo, None),
        memo("b", at(2024, 3, 20, 0, 0, 0), SceneMode::Todo, None),
        memo("c", now(), SceneMode::Idea, Some(analysis(&["Idea", "To-do"], Some("2024-03-02")))),
    ];
    let first = filter_memos(&memos, SceneMode::Todo, CalendarView::SevenDay, &now());
    let second = filter_memos(&memos, SceneMode::Todo, CalendarView::SevenDay, &now());
    assert_eq!(first, second);
    assert_eq!(ids(&first), vec!["a", "c"]);
}

// ---------------------------------------------------------------------------
// Schedule strip
// ---------------------------------------------------------------------------

#[test]
fn calendar_strip_counts_todo_tagged_memos_per_day() {
    let todo = ["Personal", "To-do"];
    let memos = vec![
        memo("today-created", now(), SceneMode::Personal, Some(analysis(&todo, None))),
        memo("due-3rd-a", now(), SceneMode::Personal, Some(analysis(&todo, Some("2024-03-03")))),
        memo("due-3rd-b", now(), SceneMode::Personal, Some(analysis(&todo, Some("2024-03-03")))),
        memo("not-todo", now(), SceneMode::Idea, Some(analysis(&["Idea"], None))),
        memo("pending", now(), SceneMode::Todo, None),
    ];

    let strip = calendar_strip(&memos, &now());
    assert_eq!(strip.len(), 7);
    assert_eq!(strip[0].date, date(2024, 3, 1));
    assert!(strip[0].is_today);
    assert_eq!(strip[0].task_count, 1);
    assert_eq!(strip[2].date, date(2024, 3, 3));
    assert_eq!(strip[2].task_count, 2);
    assert_eq!(strip[6].date, date(2024, 3, 7));
    assert!(strip[1..].iter().all(|day| !day.is_today));
}

#[test]
fn local_date_string_is_zero_padded() {
    assert_eq!(local_date_string(&at(2024, 3, 1, 23, 0, 0)), "2024-03-01");
    assert_eq!(local_date_string(&at(2024, 3, 2, 1, 0, 0)), "2024-03-02");
}
