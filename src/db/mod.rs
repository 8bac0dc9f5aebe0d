//! Persistence module split across logical submodules.

mod connection;
mod lessons;
mod students;

pub use connection::{initialize, open_database, open_in_memory};
pub use lessons::{add_lesson, list_lessons, schedule_lesson};
pub use students::{add_student, count_students, list_students};
