use std::sync::Arc;

use anyhow::Context;

use consultdesk_api::config::ApiConfig;
use consultdesk_staff::StaffDirectory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    consultdesk_observability::init();

    let config = ApiConfig::load()?;
    let directory = Arc::new(StaffDirectory::in_memory());

    if let Some(tenant_id) = config.seed_tenant_id {
        let summary = directory
            .seed_defaults(tenant_id, "system")
            .context("failed to seed default catalog")?;
        tracing::info!(
            %tenant_id,
            permissions_added = summary.permissions_added,
            roles_added = summary.roles_added,
            "seed tenant ready"
        );
    }

    let app = consultdesk_api::app::build_app_with_directory(config.jwt_secret.clone(), directory);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
