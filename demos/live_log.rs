//! # Live log demo
//!
//! Wires a hub the way the daemon does:
//! - the daemon logger and three fake VM operations produce messages;
//! - one consumer streams NDJSON to stdout (like the `/log` endpoint);
//! - one consumer reads too slowly and gets evicted.
//!
//! Diagnostics (`tracing`) go to stderr; set `RUST_LOG=vmhub=debug` to see
//! registrations and evictions.
//!
//! ## Run
//! ```bash
//! cargo run --example live_log
//! ```

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vmhub::{Hub, HubConfig, Logger, NdjsonSink, forward};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

async fn fake_vm_operation(log: Logger, steps: u32, pace: Duration) {
    log.info("VM creation started").await;
    for step in 1..=steps {
        tokio::time::sleep(pace).await;
        log.trace(format!("step {step}/{steps}")).await;
    }
    log.info("VM is now up").await;
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let runtime = CancellationToken::new();
    let hub = Hub::with_token(HubConfig::default().with_delivery_capacity(4), &runtime);
    let log = Logger::new(hub.clone());
    log.trace("log system available").await;

    let live = hub.register("stdout").await?;
    let streamer = tokio::spawn(async move {
        let mut sink = NdjsonSink::new(tokio::io::stdout());
        forward(live, &mut sink).await
    });

    let mut sluggish = hub.register_with_capacity("sluggish", 0).await?;
    let slow_reader = tokio::spawn(async move {
        let mut seen = 0u32;
        while sluggish.recv().await.is_some() {
            seen += 1;
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        seen
    });

    let ops = vec![
        tokio::spawn(fake_vm_operation(log.with_origin("vm-web-1"), 5, Duration::from_millis(120))),
        tokio::spawn(fake_vm_operation(log.with_origin("vm-db-1"), 3, Duration::from_millis(200))),
        tokio::spawn(fake_vm_operation(log.with_origin("vm-cache-1"), 8, Duration::from_millis(70))),
    ];

    tokio::select! {
        _ = tokio::signal::ctrl_c() => log.warning("interrupted").await,
        _ = async { for op in ops { let _ = op.await; } } => log.info("all VM operations finished").await,
    }

    runtime.cancel();
    let outcome = streamer.await?;
    let slow_seen = slow_reader.await?;
    tracing::info!(
        delivered = outcome.delivered,
        slow_seen,
        "demo finished"
    );
    Ok(())
}
