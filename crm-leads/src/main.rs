use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let ax = crm_leads::build()?;

    let host = ax
        .app
        .get("http.host")
        .unwrap_or_else(|| crm_leads::config::DEFAULT_HOST.to_string());

    let port = ax
        .app
        .get("http.port")
        .unwrap_or_else(|| crm_leads::config::DEFAULT_PORT.to_string());

    let addr = format!("{host}:{port}");
    tracing::info!("lead tracker on http://{addr}");

    ax.listen(addr).await
}
