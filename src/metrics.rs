//! Read model consumed by the screens: full table snapshots plus the figures
//! derived from them. Everything here is a pure function of what the store
//! returned, so a reload after each write keeps the dashboard current.

use chrono::{NaiveDateTime, NaiveTime};
use rusqlite::Connection;

use crate::db::{list_lessons, list_students};
use crate::error::StoreResult;
use crate::models::{Lesson, Student};

/// Background colour of agenda entries.
pub const EVENT_BACKGROUND: &str = "#1e3a8a";
/// Border colour of agenda entries.
pub const EVENT_BORDER: &str = "#000000";

/// Headline numbers shown above every tab.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dashboard {
    pub total_students: usize,
    pub total_lessons: usize,
    /// Flat sum of every registered fee, regardless of whether the student has
    /// anything booked.
    pub projected_revenue: f64,
}

impl Dashboard {
    pub fn from_snapshot(students: &[Student], lessons: &[Lesson]) -> Self {
        Self {
            total_students: students.len(),
            total_lessons: lessons.len(),
            projected_revenue: projected_revenue(students),
        }
    }
}

/// Sum of all student fees; `0.0` for an empty roster.
pub fn projected_revenue(students: &[Student]) -> f64 {
    students.iter().map(|student| student.fee).sum()
}

/// Both tables as last read from the store.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub students: Vec<Student>,
    pub lessons: Vec<Lesson>,
    pub dashboard: Dashboard,
}

impl Snapshot {
    pub fn load(conn: &Connection) -> StoreResult<Self> {
        let students = list_students(conn)?;
        let lessons = list_lessons(conn)?;
        let dashboard = Dashboard::from_snapshot(&students, &lessons);
        Ok(Self {
            students,
            lessons,
            dashboard,
        })
    }

    /// Student names in roster order, as offered by the lesson form.
    pub fn student_names(&self) -> Vec<String> {
        self.students.iter().map(|s| s.name.clone()).collect()
    }
}

/// A single entry on the agenda.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub background: &'static str,
    pub border: &'static str,
}

impl CalendarEvent {
    /// Short `HH:MM-HH:MM title` label used by agenda cells.
    pub fn label(&self) -> String {
        format!(
            "{}-{} {}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M"),
            self.title
        )
    }
}

/// One agenda entry per lesson, titled with the student's name.
pub fn calendar_events<'a, I>(lessons: I) -> Vec<CalendarEvent>
where
    I: IntoIterator<Item = &'a Lesson>,
{
    lessons
        .into_iter()
        .map(|lesson| CalendarEvent {
            title: lesson.student_name.clone(),
            start: lesson.start_time,
            end: lesson.end_time,
            background: EVENT_BACKGROUND,
            border: EVENT_BORDER,
        })
        .collect()
}

/// Granularity of the agenda.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarView {
    Week,
    Month,
}

impl CalendarView {
    pub fn toggled(self) -> Self {
        match self {
            CalendarView::Week => CalendarView::Month,
            CalendarView::Month => CalendarView::Week,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CalendarView::Week => "Week",
            CalendarView::Month => "Month",
        }
    }
}

/// Display options for the agenda: the starting view and the visible hours
/// of the week grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarOptions {
    pub initial_view: CalendarView,
    pub slot_min: NaiveTime,
    pub slot_max: NaiveTime,
}

impl Default for CalendarOptions {
    fn default() -> Self {
        Self {
            initial_view: CalendarView::Week,
            slot_min: NaiveTime::from_hms_opt(7, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_max: NaiveTime::from_hms_opt(22, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl CalendarOptions {
    /// Whether any part of `lesson` falls inside the visible hours.
    pub fn shows(&self, lesson: &Lesson) -> bool {
        let start = lesson.start_time.time();
        let end = lesson.end_time.time();
        let crosses_midnight = lesson.end_time.date() != lesson.start_time.date();
        start < self.slot_max && (crosses_midnight || end > self.slot_min)
    }
}
