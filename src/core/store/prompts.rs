use rusqlite::{OptionalExtension, Row, params};

use super::types::PromptRecord;
use super::{Store, StoreError};

const PROMPT_COLUMNS: &str = "id, name, app_name, region, version, content, created_at";

fn row_to_prompt(row: &Row<'_>) -> rusqlite::Result<PromptRecord> {
    Ok(PromptRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        app_name: row.get(2)?,
        region: row.get(3)?,
        version: row.get(4)?,
        content: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Store {
    /// Fetch the current content of a prompt by its logical key.
    /// Unlike the other lookups, a miss here is an error: callers use this to
    /// construct stage instructions and cannot proceed without one.
    pub async fn get_latest_prompt(
        &self,
        name: &str,
        app_name: &str,
        region: &str,
    ) -> Result<String, StoreError> {
        let db = self.db.lock().await;
        let content = db
            .query_row(
                "SELECT content FROM prompts WHERE name = ?1 AND app_name = ?2 AND region = ?3",
                params![name, app_name, region],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        content.ok_or_else(|| StoreError::NotFound {
            name: name.to_string(),
            app_name: app_name.to_string(),
            region: region.to_string(),
        })
    }

    /// Upsert a prompt: replace content and bump the version when the triple
    /// exists, insert at version 1 otherwise. The version bump is
    /// unconditional, identical content still counts as an update.
    pub async fn add_or_update_prompt(
        &self,
        name: &str,
        content: &str,
        app_name: &str,
        region: &str,
    ) -> Result<(), StoreError> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;
        let updated = tx.execute(
            "UPDATE prompts SET content = ?1, version = version + 1
             WHERE name = ?2 AND app_name = ?3 AND region = ?4",
            params![content, name, app_name, region],
        )?;
        if updated == 0 {
            tx.execute(
                "INSERT INTO prompts (name, app_name, region, content) VALUES (?1, ?2, ?3, ?4)",
                params![name, app_name, region, content],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Strict create: fails with [`StoreError::Conflict`] when the triple is
    /// already taken, leaving the existing row untouched.
    pub async fn create_prompt(
        &self,
        name: &str,
        content: &str,
        app_name: &str,
        region: &str,
    ) -> Result<PromptRecord, StoreError> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM prompts WHERE name = ?1 AND app_name = ?2 AND region = ?3",
                params![name, app_name, region],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Err(StoreError::Conflict {
                name: name.to_string(),
                app_name: app_name.to_string(),
                region: region.to_string(),
            });
        }

        tx.execute(
            "INSERT INTO prompts (name, app_name, region, content) VALUES (?1, ?2, ?3, ?4)",
            params![name, app_name, region, content],
        )?;
        let id = tx.last_insert_rowid();
        let record = tx.query_row(
            &format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = ?1"),
            params![id],
            row_to_prompt,
        )?;
        tx.commit()?;
        Ok(record)
    }

    /// All prompts matching the optional scope filters; no filter returns
    /// every row.
    pub async fn get_all_prompts(
        &self,
        app_name: Option<&str>,
        region: Option<&str>,
    ) -> Result<Vec<PromptRecord>, StoreError> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(&format!(
            "SELECT {PROMPT_COLUMNS} FROM prompts
             WHERE (?1 IS NULL OR app_name = ?1) AND (?2 IS NULL OR region = ?2)"
        ))?;
        let rows = stmt.query_map(params![app_name, region], row_to_prompt)?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row?);
        }
        Ok(results)
    }

    pub async fn get_prompt_by_id(&self, id: i64) -> Result<Option<PromptRecord>, StoreError> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                &format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = ?1"),
                params![id],
                row_to_prompt,
            )
            .optional()?;
        Ok(record)
    }

    pub async fn get_prompt_by_name(
        &self,
        name: &str,
        app_name: &str,
        region: &str,
    ) -> Result<Option<PromptRecord>, StoreError> {
        let db = self.db.lock().await;
        let record = db
            .query_row(
                &format!(
                    "SELECT {PROMPT_COLUMNS} FROM prompts
                     WHERE name = ?1 AND app_name = ?2 AND region = ?3"
                ),
                params![name, app_name, region],
                row_to_prompt,
            )
            .optional()?;
        Ok(record)
    }

    /// Replace a prompt's content by id, bumping the version. Returns `None`
    /// for an unknown id.
    pub async fn update_prompt(
        &self,
        id: i64,
        content: &str,
    ) -> Result<Option<PromptRecord>, StoreError> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;
        let updated = tx.execute(
            "UPDATE prompts SET content = ?1, version = version + 1 WHERE id = ?2",
            params![content, id],
        )?;
        if updated == 0 {
            return Ok(None);
        }
        let record = tx.query_row(
            &format!("SELECT {PROMPT_COLUMNS} FROM prompts WHERE id = ?1"),
            params![id],
            row_to_prompt,
        )?;
        tx.commit()?;
        Ok(Some(record))
    }

    /// Returns true when a row was removed, false for an unknown id.
    pub async fn delete_prompt(&self, id: i64) -> Result<bool, StoreError> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;
        let deleted = tx.execute("DELETE FROM prompts WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(deleted > 0)
    }
}
