use metrics_exporter_prometheus::PrometheusBuilder;
use mock_service::Behavior;
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mock_service=info,tower_http=info")),
        )
        .init();

    PrometheusBuilder::new()
        .with_http_listener("0.0.0.0:8002".parse::<SocketAddr>()?)
        .install()?;

    let addr: SocketAddr = "0.0.0.0:3002".parse()?;
    mock_service::run(addr, Behavior::Echo).await
}
