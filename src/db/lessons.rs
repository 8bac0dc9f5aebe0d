use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Error as SqlError};

use super::students::count_students;
use crate::error::{StoreContext, StoreResult, ValidationError};
use crate::models::{format_timestamp, parse_timestamp, Lesson, LessonSlot};

/// Retrieve every lesson in booking order. An empty table yields an empty list.
pub fn list_lessons(conn: &Connection) -> StoreResult<Vec<Lesson>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, student_name, start_time, end_time, COALESCE(description, '')
             FROM lessons
             ORDER BY id",
        )
        .during("load lessons")?;

    let lessons = stmt
        .query_map([], |row| {
            let start: String = row.get(2)?;
            let end: String = row.get(3)?;
            Ok(Lesson {
                id: row.get(0)?,
                student_name: row.get(1)?,
                start_time: timestamp_column(2, &start)?,
                end_time: timestamp_column(3, &end)?,
                description: row.get(4)?,
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .during("load lessons")?;

    Ok(lessons)
}

/// Book a lesson for `student_name` starting at `start_time`. The end time is
/// always one lesson length later. No overlap check is made: double bookings
/// are stored as-is.
///
/// The name is copied into the lesson row; later changes to the student do not
/// reach existing lessons. An empty roster is reported before a missing
/// selection.
pub fn add_lesson(
    conn: &Connection,
    student_name: Option<&str>,
    start_time: NaiveDateTime,
    description: &str,
) -> StoreResult<Lesson> {
    if count_students(conn)? == 0 {
        warn!("rejected lesson: roster is empty");
        return Err(ValidationError::NoStudents.into());
    }
    let student_name = match student_name.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => {
            warn!("rejected lesson: no student selected");
            return Err(ValidationError::NoStudentSelected.into());
        }
    };
    let Some(slot) = LessonSlot::starting_at(start_time) else {
        warn!("rejected lesson for {student_name}: {start_time} is out of range");
        return Err(ValidationError::StartOutOfRange.into());
    };

    conn.execute(
        "INSERT INTO lessons (student_name, start_time, end_time, description)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            student_name,
            format_timestamp(slot.start),
            format_timestamp(slot.end),
            description
        ],
    )
    .during("insert lesson")?;

    let id = conn.last_insert_rowid();
    debug!("inserted lesson {id} for {student_name}");
    Ok(Lesson {
        id,
        student_name: student_name.to_string(),
        start_time: slot.start,
        end_time: slot.end,
        description: description.to_string(),
    })
}

/// Form-submission helper: combine the picked date and time and book it.
pub fn schedule_lesson(
    conn: &Connection,
    student_name: Option<&str>,
    date: NaiveDate,
    time: NaiveTime,
    description: &str,
) -> StoreResult<Lesson> {
    add_lesson(conn, student_name, date.and_time(time), description)
}

fn timestamp_column(idx: usize, raw: &str) -> Result<NaiveDateTime, SqlError> {
    parse_timestamp(raw)
        .map_err(|err| SqlError::FromSqlConversionFailure(idx, Type::Text, Box::new(err)))
}
