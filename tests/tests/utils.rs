use metrics_exporter_prometheus::PrometheusBuilder;
use mock_service::Behavior;
use std::net::SocketAddr;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Target echoing the profile name.
pub const ECHO_ADDR: &str = "127.0.0.1:3002";
/// Target whose bodies never contain the profile name.
pub const BLANK_ADDR: &str = "127.0.0.1:3003";

#[allow(unused)]
pub async fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
            std::process::exit(1);
        }));

        let _ = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new(
                "loadgrid=debug,loadgrid_runtime=debug,mock_service=info",
            ))
            .try_init();

        let _ = PrometheusBuilder::new()
            .with_http_listener("127.0.0.1:8002".parse::<SocketAddr>().unwrap())
            .install();

        // The targets outlive any single test's runtime.
        std::thread::spawn(|| {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let echo = mock_service::run(ECHO_ADDR.parse().unwrap(), Behavior::Echo);
                let blank = mock_service::run(BLANK_ADDR.parse().unwrap(), Behavior::Blank);
                if let Err(err) = tokio::try_join!(echo, blank) {
                    error!("Mock target failed: {err}");
                }
            });
        });
    });

    // Every caller waits until both targets accept connections.
    for addr in [ECHO_ADDR, BLANK_ADDR] {
        let mut attempts = 0;
        while tokio::net::TcpStream::connect(addr).await.is_err() {
            attempts += 1;
            assert!(attempts < 250, "mock target on {addr} never came up");
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}
