mod error;
mod handlers;
mod router;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::config::AppConfig;
use crate::core::pipeline::Pipeline;
use crate::core::store::{PromptScope, Store};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: Store,
    pub(crate) pipeline: Arc<Pipeline>,
    /// Scope applied when a request omits app_name/region.
    pub(crate) scope: PromptScope,
    pub(crate) api_port: u16,
}

pub async fn serve(config: &AppConfig, store: Store, pipeline: Arc<Pipeline>) -> Result<()> {
    let state = AppState {
        store,
        pipeline,
        scope: config.scope.clone(),
        api_port: config.api_port,
    };
    let app = router::build_api_router(state);

    let addr = format!("{}:{}", config.api_host, config.api_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API Server running at http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
