use hospital_agents::storage::schema::run_migrations;
use hospital_agents::AppConfig;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Opens the agent-session database named by `config`, creating its
/// directory and tables as needed.
///
/// # Platform-specific default paths
///
/// - **macOS**: `~/Library/Application Support/hospital/agents.sqlite`
/// - **Linux**: `~/.local/share/hospital/agents.sqlite`
/// - **Windows**: `%LOCALAPPDATA%\hospital\agents.sqlite`
pub fn initialize_database(config: &AppConfig) -> anyhow::Result<Arc<Mutex<Connection>>> {
    let db_path = config.resolve_db_path()?;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&db_path)?;
    run_migrations(&conn)?;
    tracing::info!("Database initialized at: {:?}", db_path);

    Ok(Arc::new(Mutex::new(conn)))
}
