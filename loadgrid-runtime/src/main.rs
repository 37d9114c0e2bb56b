use loadgrid_runtime::{runtime::DEFAULT_LOG_FILTER, LoadgridRuntime};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    if let Some(report) = LoadgridRuntime::new().with_args().run().await? {
        println!("{report}");
    }
    Ok(())
}
