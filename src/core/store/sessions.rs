use anyhow::{Result, bail};
use rusqlite::{OptionalExtension, Row, params};

use super::Store;
use super::types::{SessionEventRecord, SessionRecord};
use crate::core::pipeline::{RunState, SessionState, can_transition};

const SESSION_COLUMNS: &str = "id, user_id, status, state_json, error, created_at, updated_at";

fn row_to_session(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    Ok(SessionRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        status: row.get(2)?,
        state_json: row.get(3)?,
        error: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

impl Store {
    pub async fn create_session(
        &self,
        user_id: &str,
        state: &SessionState,
    ) -> Result<SessionRecord> {
        let session_id = uuid::Uuid::new_v4().to_string();
        let state_json = serde_json::to_string(state)?;

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO sessions (id, user_id, status, state_json) VALUES (?1, ?2, ?3, ?4)",
            params![session_id, user_id, RunState::Created.as_str(), state_json],
        )?;
        let record = db.query_row(
            &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
            params![session_id],
            row_to_session,
        )?;
        Ok(record)
    }

    pub async fn get_session(&self, session_id: &str) -> Result<Option<SessionRecord>> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                &format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = ?1"),
                params![session_id],
                row_to_session,
            )
            .optional()?;
        Ok(record)
    }

    /// Move a session to a new status, enforcing the run state machine.
    /// An illegal transition is a bug in the caller and fails loudly.
    pub async fn transition_session(&self, session_id: &str, to: RunState) -> Result<()> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;

        let current: Option<String> = tx
            .query_row(
                "SELECT status FROM sessions WHERE id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            bail!("session '{}' not found", session_id);
        };
        let Some(from) = RunState::from_status(&current) else {
            bail!("session '{}' has unknown status '{}'", session_id, current);
        };
        if !can_transition(from, to) {
            bail!(
                "illegal session transition {} -> {} for '{}'",
                from.as_str(),
                to.as_str(),
                session_id
            );
        }

        tx.execute(
            "UPDATE sessions SET status = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![to.as_str(), session_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Persist the current state snapshot of a running session.
    pub async fn save_session_state(&self, session_id: &str, state: &SessionState) -> Result<()> {
        let state_json = serde_json::to_string(state)?;
        let db = self.db.lock().await;
        let updated = db.execute(
            "UPDATE sessions SET state_json = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![state_json, session_id],
        )?;
        if updated == 0 {
            bail!("session '{}' not found", session_id);
        }
        Ok(())
    }

    /// Mark a session failed and record the terminal error.
    pub async fn record_session_failure(&self, session_id: &str, error: &str) -> Result<()> {
        self.transition_session(session_id, RunState::Failed).await?;
        let db = self.db.lock().await;
        db.execute(
            "UPDATE sessions SET error = ?1, updated_at = CURRENT_TIMESTAMP WHERE id = ?2",
            params![error, session_id],
        )?;
        Ok(())
    }

    pub async fn append_session_event(
        &self,
        session_id: &str,
        stage: &str,
        phase: &str,
        detail: &str,
    ) -> Result<()> {
        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO session_events (session_id, stage, phase, detail) VALUES (?1, ?2, ?3, ?4)",
            params![session_id, stage, phase, detail],
        )?;
        Ok(())
    }

    pub async fn get_session_events(&self, session_id: &str) -> Result<Vec<SessionEventRecord>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, session_id, stage, phase, detail, created_at
             FROM session_events WHERE session_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![session_id], |row| {
            Ok(SessionEventRecord {
                id: row.get(0)?,
                session_id: row.get(1)?,
                stage: row.get(2)?,
                phase: row.get(3)?,
                detail: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }
}
