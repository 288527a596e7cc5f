use anyhow::Context;

use crm_infra::CrmConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    crm_observability::init();

    let cfg = CrmConfig::from_env().context("invalid configuration")?;
    let services = crm_api::app::services::build_services(&cfg).await?;
    let app = crm_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
