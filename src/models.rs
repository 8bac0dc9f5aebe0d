//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. They stay light-weight data holders so the store and the screens can
//! focus on persistence and presentation respectively.

use chrono::{Duration, NaiveDateTime};

/// Fee applied when a student is registered without an explicit amount.
pub const DEFAULT_FEE: f64 = 100.0;

/// Every lesson lasts exactly this long; the end time is never user supplied.
pub const LESSON_LENGTH_MINUTES: i64 = 60;

/// Text layout used for lesson timestamps, both on disk and in the agenda.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq)]
/// A registered student together with the fee they are billed per period.
pub struct Student {
    /// Primary key from the database.
    pub id: i64,
    pub name: String,
    /// Contact address. Never validated beyond being non-blank.
    pub email: String,
    pub fee: f64,
}

#[derive(Debug, Clone, PartialEq)]
/// A scheduled lesson. `student_name` is a copy of the student's name taken
/// when the lesson was booked, not a reference to the `students` table.
pub struct Lesson {
    pub id: i64,
    pub student_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Lesson content. Empty when the tutor left the field blank.
    pub description: String,
}

impl Lesson {
    /// `start_time` rendered the way it is stored.
    pub fn start_text(&self) -> String {
        format_timestamp(self.start_time)
    }

    /// `end_time` rendered the way it is stored.
    pub fn end_text(&self) -> String {
        format_timestamp(self.end_time)
    }
}

/// Start and end of a lesson slot. Construction always applies the fixed
/// lesson length so callers cannot produce a slot of any other duration.
/// Returns `None` when the end would fall past the last representable time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl LessonSlot {
    pub fn starting_at(start: NaiveDateTime) -> Option<Self> {
        let end = start.checked_add_signed(Duration::minutes(LESSON_LENGTH_MINUTES))?;
        Some(Self { start, end })
    }
}

/// Render a timestamp in the on-disk layout (`2024-01-10T09:00:00`).
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Fractional seconds written by older files are
/// accepted as well.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .or_else(|_| raw.trim().parse::<NaiveDateTime>())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .unwrap()
            .and_time(NaiveTime::parse_from_str(time, "%H:%M:%S").unwrap())
    }

    #[test]
    fn slot_lasts_one_hour() {
        let slot = LessonSlot::starting_at(at("2024-01-10", "09:00:00")).unwrap();
        assert_eq!(format_timestamp(slot.end), "2024-01-10T10:00:00");
    }

    #[test]
    fn slot_rolls_over_midnight() {
        let slot = LessonSlot::starting_at(at("2024-12-31", "23:30:00")).unwrap();
        assert_eq!(format_timestamp(slot.end), "2025-01-01T00:30:00");
    }

    #[test]
    fn no_slot_past_the_calendar_limit() {
        assert_eq!(LessonSlot::starting_at(NaiveDateTime::MAX), None);
        let late = NaiveDate::from_ymd_opt(262142, 12, 31)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap();
        assert_eq!(LessonSlot::starting_at(late), None);
    }

    #[test]
    fn parses_stored_and_fractional_timestamps() {
        let plain = parse_timestamp("2024-01-10T09:00:00").unwrap();
        assert_eq!(plain, at("2024-01-10", "09:00:00"));

        let fractional = parse_timestamp("2024-01-10T09:00:00.250").unwrap();
        assert_eq!(format_timestamp(fractional), "2024-01-10T09:00:00");
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_timestamp("next tuesday").is_err());
    }
}
