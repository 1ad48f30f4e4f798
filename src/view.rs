//! Presentation-ready aggregates derived from normalized records.
//!
//! Everything here is pure; date-dependent functions take `today` so tests
//! can pin the clock, with `*_now` wrappers reading the local date.
use std::collections::BTreeMap;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::Serialize;

use crate::model::{Book, LogEntry, TodoItem};

/// Status label counted as "currently reading" on the dashboard.
pub const STATUS_READING: &str = "Reading";

/// How many undone todos the calendar grid shows per day cell; the day
/// detail panel shows the full list.
pub const GRID_TODO_LIMIT: usize = 2;

const RECENT_DAYS: u64 = 7;
const TREND_MONTHS: i32 = 6;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// Books grouped by category in first-seen order.
pub fn category_counts(books: &[Book]) -> Vec<CategoryCount> {
    let mut counts: Vec<CategoryCount> = Vec::new();
    for book in books {
        match counts.iter_mut().find(|c| c.category == book.category) {
            Some(entry) => entry.count += 1,
            None => counts.push(CategoryCount {
                category: book.category.clone(),
                count: 1,
            }),
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPages {
    pub date: NaiveDate,
    pub pages: i64,
}

/// Pages read per day over the 7 calendar days ending `today`, oldest first.
/// Days without entries contribute zero.
pub fn recent_activity(logs: &[LogEntry], today: NaiveDate) -> Vec<DailyPages> {
    (0..RECENT_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Days::new(offset);
            let key = date.to_string();
            let pages = logs
                .iter()
                .filter(|l| day_key(&l.date) == key)
                .map(|l| l.pages)
                .sum();
            DailyPages { date, pages }
        })
        .collect()
}

pub fn recent_activity_now(logs: &[LogEntry]) -> Vec<DailyPages> {
    recent_activity(logs, Local::now().date_naive())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyPages {
    /// `YYYY-MM` key.
    pub month: String,
    pub pages: i64,
}

/// Pages read per month over the 6 calendar months ending with `today`'s
/// month, oldest first. Months roll back across the year boundary.
pub fn monthly_trend(logs: &[LogEntry], today: NaiveDate) -> Vec<MonthlyPages> {
    (0..TREND_MONTHS)
        .rev()
        .map(|offset| {
            let mut year = today.year();
            let mut month = today.month() as i32 - offset;
            while month <= 0 {
                month += 12;
                year -= 1;
            }
            let key = format!("{year}-{month:02}");
            let pages = logs
                .iter()
                .filter(|l| month_key(&l.date) == key)
                .map(|l| l.pages)
                .sum();
            MonthlyPages { month: key, pages }
        })
        .collect()
}

pub fn monthly_trend_now(logs: &[LogEntry]) -> Vec<MonthlyPages> {
    monthly_trend(logs, Local::now().date_naive())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    pub pages: i64,
    pub minutes: i64,
    /// Names of undone todos due that day.
    pub todos: Vec<String>,
}

impl DayBucket {
    /// Truncated todo list for the calendar grid cell.
    pub fn grid_todos(&self) -> &[String] {
        &self.todos[..self.todos.len().min(GRID_TODO_LIMIT)]
    }
}

/// Per-date totals keyed by `YYYY-MM-DD`, covering every date that appears
/// in a log entry or as an undone todo's due date.
pub fn day_buckets(logs: &[LogEntry], todos: &[TodoItem]) -> BTreeMap<String, DayBucket> {
    let mut buckets: BTreeMap<String, DayBucket> = BTreeMap::new();
    for log in logs {
        let bucket = buckets.entry(day_key(&log.date).to_string()).or_default();
        bucket.pages += log.pages;
        bucket.minutes += log.minutes;
    }
    for todo in todos {
        if todo.done {
            continue;
        }
        if let Some(due) = todo.due_date.as_deref() {
            buckets
                .entry(day_key(due).to_string())
                .or_default()
                .todos
                .push(todo.name.clone());
        }
    }
    buckets
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_books: usize,
    pub reading: usize,
    pub pending_todos: usize,
}

pub fn dashboard_stats(books: &[Book], todos: &[TodoItem]) -> DashboardStats {
    DashboardStats {
        total_books: books.len(),
        reading: books.iter().filter(|b| b.status == STATUS_READING).count(),
        pending_todos: todos.iter().filter(|t| !t.done).count(),
    }
}

/// Client-side library filters over an already-fetched book list. Empty
/// fields match everything.
#[derive(Debug, Clone, Default)]
pub struct LibraryFilter {
    /// Case-insensitive title substring.
    pub query: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub genre: Option<String>,
    pub tag: Option<String>,
}

impl LibraryFilter {
    pub fn apply<'a>(&self, books: &'a [Book]) -> Vec<&'a Book> {
        let query = self.query.as_deref().map(str::to_lowercase);
        books
            .iter()
            .filter(|b| {
                query
                    .as_deref()
                    .map_or(true, |q| b.title.to_lowercase().contains(q))
            })
            .filter(|b| self.status.as_deref().map_or(true, |s| b.status == s))
            .filter(|b| self.category.as_deref().map_or(true, |c| b.category == c))
            .filter(|b| self.genre.as_deref().map_or(true, |g| b.genre == g))
            .filter(|b| {
                self.tag
                    .as_deref()
                    .map_or(true, |t| b.tags.iter().any(|tag| tag == t))
            })
            .collect()
    }
}

/// Undone and done todos, in fetch order.
pub fn partition_todos(todos: &[TodoItem]) -> (Vec<&TodoItem>, Vec<&TodoItem>) {
    todos.iter().partition(|t| !t.done)
}

/// Sunday-first month matrix; zero marks a cell outside the month.
pub fn month_grid(year: i32, month: u32) -> Vec<[u32; 7]> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let lead = first.weekday().num_days_from_sunday() as usize;
    let mut weeks = Vec::new();
    let mut week = [0u32; 7];
    let mut slot = lead;
    for day in 1..=days_in_month(first) {
        week[slot] = day;
        slot += 1;
        if slot == 7 {
            weeks.push(week);
            week = [0; 7];
            slot = 0;
        }
    }
    if slot > 0 {
        weeks.push(week);
    }
    weeks
}

fn days_in_month(first: NaiveDate) -> u32 {
    let (year, month) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next| next.signed_duration_since(first).num_days() as u32)
        .unwrap_or(31)
}

/// Calendar-date prefix of an ISO date string (dates from the service may
/// carry a time component).
fn day_key(date: &str) -> &str {
    date.get(..10).unwrap_or(date)
}

fn month_key(date: &str) -> &str {
    date.get(..7).unwrap_or(date)
}
