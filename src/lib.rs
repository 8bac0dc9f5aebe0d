//! Core library surface for the Tutor Scheduler TUI application.
//!
//! The store (`db`) keeps students and lessons in a local SQLite file; the
//! read model (`metrics`) turns full table snapshots into the dashboard and
//! agenda; `ui` is the terminal shell that drives both.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod ui;

/// Convenience re-exports for the persistence layer.
pub use db::{
    add_lesson, add_student, initialize, list_lessons, list_students, open_database,
    open_in_memory, schedule_lesson,
};

pub use config::Config;
pub use error::{StoreError, ValidationError};
pub use metrics::{Dashboard, Snapshot};

/// The two domain types that other layers manipulate.
pub use models::{Lesson, Student};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
