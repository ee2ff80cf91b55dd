/// A stored prompt row. The (name, app_name, region) triple is unique; the
/// version counter advances in place on every content update.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PromptRecord {
    pub id: i64,
    pub name: String,
    pub app_name: String,
    pub region: String,
    pub version: i64,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionRecord {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub state_json: String,
    pub error: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionEventRecord {
    pub id: i64,
    pub session_id: String,
    pub stage: String,
    pub phase: String,
    pub detail: String,
    pub created_at: String,
}
