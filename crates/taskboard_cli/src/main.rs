//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `taskboard_core` linkage and the configured store.
//! - Print a deterministic per-workspace summary for local sanity checks.

use std::process::ExitCode;
use taskboard_core::views::workspace_report;
use taskboard_core::{
    init_logging_from_config, open_db, BoardConfig, BoardService, SqliteKeyValueStore,
};

fn main() -> ExitCode {
    println!("taskboard_core ping={}", taskboard_core::ping());
    println!("taskboard_core version={}", taskboard_core::core_version());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("taskboard: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let config = BoardConfig::from_env().map_err(|err| err.to_string())?;
    init_logging_from_config(&config)?;

    let conn = open_db(&config.db_path).map_err(|err| err.to_string())?;
    let store = SqliteKeyValueStore::try_new(&conn).map_err(|err| err.to_string())?;
    let service = BoardService::open(store).map_err(|err| err.to_string())?;
    let state = service.state();

    println!("store={}", config.db_path.display());
    println!(
        "workspaces={} users={} notifications={}",
        state.workspaces.len(),
        state.users.len(),
        state.notifications.len()
    );
    for workspace in &state.workspaces {
        let report = workspace_report(workspace);
        println!(
            "workspace id={} archived={} tasks={} todo={} in_progress={} completed={} completion={:.0}%",
            workspace.id,
            workspace.is_archived,
            report.total,
            report.todo,
            report.in_progress,
            report.completed,
            report.completion_percent
        );
    }
    Ok(())
}
