use anyhow::Result;
use fiscalmon::config::Config;
use fiscalmon::fetch::build_client;
use fiscalmon::server::{routes, ServerState};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = Config::from_env();
    info!(
        portal = %config.portal,
        dataset = %config.dataset,
        "starting fiscal monitor service"
    );

    let client = build_client(config.request_timeout)?;
    let port = config.port;
    let state = ServerState::new(client, config);

    info!("serving on port {}", port);
    info!("health check: http://localhost:{}/health", port);
    warp::serve(routes(state)).run(([0, 0, 0, 0], port)).await;

    Ok(())
}
