//! Binary entry point: resolve paths, start logging, open the store, and run
//! the Ratatui event loop until the user exits.
use anyhow::Context;
use chrono::Local;
use tutor_scheduler::{logging, open_database, run_app, App, Config, Snapshot};

/// Returning a `Result` bubbles fatal problems (an unwritable data directory,
/// a locked or corrupt database) up to the terminal instead of crashing
/// silently.
fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    logging::init(&config.log_path)?;

    let conn = open_database(&config.db_path)
        .with_context(|| format!("cannot use {}", config.db_path.display()))?;
    let snapshot = Snapshot::load(&conn).context("failed to load data")?;
    log::info!(
        "loaded {} students and {} lessons",
        snapshot.dashboard.total_students,
        snapshot.dashboard.total_lessons
    );

    let mut app = App::new(conn, snapshot, Local::now().naive_local());
    run_app(&mut app)
}
