//! SQLite-backed storage for prompts, assessment sessions, and audit events.
//!
//! A single connection is shared behind an async mutex; every public write
//! runs inside its own transaction so a failed operation leaves the store
//! unchanged.

mod defaults;
mod prompts;
mod sessions;
pub mod types;

pub use defaults::seed_default_prompts;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::info;

/// The (app_name, region) pair that partitions prompts between deployments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptScope {
    pub app_name: String,
    pub region: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("prompt with name '{name}', app_name '{app_name}', region '{region}' not found")]
    NotFound {
        name: String,
        app_name: String,
        region: String,
    },
    #[error("prompt with name '{name}', app_name '{app_name}', region '{region}' already exists")]
    Conflict {
        name: String,
        app_name: String,
        region: String,
    },
    #[error("storage failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

#[derive(Clone)]
pub struct Store {
    db: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Connection::open(db_path)?;
        Self::init_schema(&db)?;

        info!("Store opened at {}", db_path.display());
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    /// In-memory store for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory()?;
        Self::init_schema(&db)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    fn init_schema(db: &Connection) -> Result<()> {
        db.execute(
            "CREATE TABLE IF NOT EXISTS prompts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                app_name TEXT NOT NULL,
                region TEXT NOT NULL,
                version INTEGER NOT NULL DEFAULT 1,
                content TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(name, app_name, region)
            )",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                status TEXT NOT NULL,
                state_json TEXT NOT NULL,
                error TEXT,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        db.execute(
            "CREATE TABLE IF NOT EXISTS session_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL,
                stage TEXT NOT NULL,
                phase TEXT NOT NULL,
                detail TEXT NOT NULL DEFAULT '',
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            [],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
