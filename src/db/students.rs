use log::{debug, warn};
use rusqlite::{params, Connection};

use crate::error::{StoreContext, StoreResult, ValidationError};
use crate::models::{Student, DEFAULT_FEE};

/// Retrieve every student in the order they were registered. An empty table
/// yields an empty list.
pub fn list_students(conn: &Connection) -> StoreResult<Vec<Student>> {
    let mut stmt = conn
        .prepare("SELECT id, name, email, fee FROM students ORDER BY id")
        .during("load students")?;

    let students = stmt
        .query_map([], |row| {
            Ok(Student {
                id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                fee: row.get(3)?,
            })
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .during("load students")?;

    Ok(students)
}

/// Number of registered students.
pub fn count_students(conn: &Connection) -> StoreResult<i64> {
    let count = conn
        .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
        .during("count students")?;
    Ok(count)
}

/// Register a student. Name and email must contain something other than
/// whitespace; the email format itself is not checked. A missing fee falls
/// back to [`DEFAULT_FEE`].
pub fn add_student(
    conn: &Connection,
    name: &str,
    email: &str,
    fee: Option<f64>,
) -> StoreResult<Student> {
    let fee = fee.unwrap_or(DEFAULT_FEE);
    if let Err(err) = validate_student(name, email, fee) {
        warn!("rejected student: {err}");
        return Err(err.into());
    }

    conn.execute(
        "INSERT INTO students (name, email, fee) VALUES (?1, ?2, ?3)",
        params![name, email, fee],
    )
    .during("insert student")?;

    let id = conn.last_insert_rowid();
    debug!("inserted student {id}");
    Ok(Student {
        id,
        name: name.to_string(),
        email: email.to_string(),
        fee,
    })
}

fn validate_student(name: &str, email: &str, fee: f64) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::MissingName);
    }
    if email.trim().is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !fee.is_finite() {
        return Err(ValidationError::InvalidFee);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn empty_table_lists_nothing() {
        let conn = open_in_memory().unwrap();
        assert!(list_students(&conn).unwrap().is_empty());
        assert_eq!(count_students(&conn).unwrap(), 0);
    }

    #[test]
    fn round_trips_exact_values() {
        let conn = open_in_memory().unwrap();
        add_student(&conn, "Ana", "ana@x.com", Some(150.0)).unwrap();

        let students = list_students(&conn).unwrap();
        assert_eq!(students.len(), 1);
        let ana = &students[0];
        assert_eq!(ana.name, "Ana");
        assert_eq!(ana.email, "ana@x.com");
        assert_eq!(ana.fee, 150.0);

        // Listing again must not change anything.
        assert_eq!(list_students(&conn).unwrap(), students);
    }

    #[test]
    fn missing_fee_uses_default() {
        let conn = open_in_memory().unwrap();
        let student = add_student(&conn, "Bruno", "b@x.com", None).unwrap();
        assert_eq!(student.fee, DEFAULT_FEE);
        assert_eq!(list_students(&conn).unwrap()[0].fee, 100.0);
    }

    #[test]
    fn count_matches_successful_inserts() {
        let conn = open_in_memory().unwrap();
        for idx in 0..5 {
            add_student(&conn, &format!("Student {idx}"), "s@x.com", Some(80.0)).unwrap();
        }
        assert_eq!(list_students(&conn).unwrap().len(), 5);
    }

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let conn = open_in_memory().unwrap();
        add_student(&conn, "Zoe", "z@x.com", None).unwrap();
        add_student(&conn, "Ana", "a@x.com", None).unwrap();
        add_student(&conn, "Zoe", "z@x.com", None).unwrap();

        let names: Vec<_> = list_students(&conn)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Zoe", "Ana", "Zoe"]);
    }

    #[test]
    fn blank_name_or_email_is_rejected_without_writing() {
        let conn = open_in_memory().unwrap();
        add_student(&conn, "Ana", "ana@x.com", None).unwrap();

        let err = add_student(&conn, "   ", "x@x.com", None).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::MissingName));

        let err = add_student(&conn, "Carla", "", None).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::MissingEmail));

        assert_eq!(count_students(&conn).unwrap(), 1);
    }

    #[test]
    fn non_finite_fee_is_rejected() {
        let conn = open_in_memory().unwrap();
        let err = add_student(&conn, "Ana", "ana@x.com", Some(f64::NAN)).unwrap_err();
        assert_eq!(err.validation(), Some(&ValidationError::InvalidFee));
        assert_eq!(count_students(&conn).unwrap(), 0);
    }

    #[test]
    fn email_format_is_not_checked() {
        let conn = open_in_memory().unwrap();
        assert!(add_student(&conn, "Ana", "not an email", Some(0.0)).is_ok());
    }

    #[test]
    fn storage_failures_name_the_operation() {
        let conn = open_in_memory().unwrap();
        conn.execute("DROP TABLE students", []).unwrap();

        let messages = [
            list_students(&conn).unwrap_err().to_string(),
            count_students(&conn).unwrap_err().to_string(),
            add_student(&conn, "Ana", "ana@x.com", None).unwrap_err().to_string(),
        ];
        assert!(messages[0].starts_with("failed to load students: "));
        assert!(messages[1].starts_with("failed to count students: "));
        assert!(messages[2].starts_with("failed to insert student: "));
    }
}
