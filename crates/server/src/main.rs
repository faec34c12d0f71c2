use queuelens::api;
use queuelens::config;
use queuelens::jobs::SnapshotAssembler;
use queuelens::store::RedisConnector;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("queuelens=info,server=info,tower_http=info")),
        )
        .init();

    let cfg = config::Config::from_env()?;

    info!(
        listen_addr = %cfg.listen_addr,
        queue = %cfg.queue_name,
        result_key_prefix = %cfg.result_key_prefix,
        scan_count = cfg.scan_count,
        max_history = cfg.max_history,
        "queuelens starting"
    );

    // Client::open only parses the URL; connections are opened per request.
    let connector = RedisConnector::new(&cfg.redis_url)?;
    let snapshots = SnapshotAssembler::new(connector, cfg.snapshot_config());
    let app = api::router(api::ApiState::new(snapshots));

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
