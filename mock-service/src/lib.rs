//! Stand-in for the service under test.
//!
//! `GET /{profile}?count={n}` does `n` units of synthetic work, megabytes
//! allocated for `highmem*` profiles and hashing rounds for `highcpu*`, and
//! answers with a body naming the profile.
use axum::{
    debug_handler,
    extract::{Path, Query, State},
    routing::get,
    Router,
};
use metrics::counter;
use rand::Rng;
use serde::Deserialize;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;
#[allow(unused)]
use tracing::{debug, info};

const MB: usize = 1024 * 1024;
const MAX_ALLOC_MB: u64 = 512;

/// How the service answers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Behavior {
    /// Echo the profile name in the body.
    Echo,
    /// Do the work but answer with a body that never names the profile.
    Blank,
}

#[derive(Debug, Deserialize)]
pub struct Load {
    #[serde(default)]
    count: u64,
}

pub fn router(behavior: Behavior) -> Router {
    Router::new()
        .route("/:profile", get(target))
        .with_state(behavior)
        .layer(TraceLayer::new_for_http())
}

pub async fn run(addr: SocketAddr, behavior: Behavior) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mock target listening on {addr} ({behavior:?})");
    axum::serve(listener, router(behavior)).await?;
    Ok(())
}

#[debug_handler]
pub async fn target(
    State(behavior): State<Behavior>,
    Path(profile): Path<String>,
    Query(load): Query<Load>,
) -> String {
    counter!("mock-service.requests", "profile" => profile.clone()).increment(1);

    let work = synthetic_work(&profile, load.count);
    debug!("{profile}: {work}");

    match behavior {
        Behavior::Echo => format!("{profile}: {work}"),
        Behavior::Blank => work,
    }
}

fn synthetic_work(profile: &str, count: u64) -> String {
    if profile.starts_with("highmem") {
        let mb = count.min(MAX_ALLOC_MB);
        let mut buf = vec![0u8; mb as usize * MB];
        rand::thread_rng().fill(&mut buf[..]);
        std::hint::black_box(&buf);
        format!("allocated {mb}MB")
    } else if profile.starts_with("highcpu") {
        let mut acc: u64 = 0;
        for i in 0..count {
            acc = std::hint::black_box(acc.wrapping_mul(31).wrapping_add(i));
        }
        format!("computed {count} rounds ({acc:x})")
    } else {
        "ok".to_string()
    }
}
