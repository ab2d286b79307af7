use std::time::Duration;

use tracing::{info, warn};

use crate::config::KeepAliveConfig;

const PING_TIMEOUT: Duration = Duration::from_secs(10);

/// Background task that pings the public `/ping` URL so hosting platforms
/// that idle quiet services keep this one awake.
///
/// Independent of request handling; failures are only logged.
pub async fn run_keepalive_loop(config: KeepAliveConfig) {
    let client = match reqwest::Client::builder().timeout(PING_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            warn!("Keep-alive disabled, HTTP client unavailable: {}", e);
            return;
        }
    };
    let target = format!("{}/ping", config.site_url.trim_end_matches('/'));

    tokio::time::sleep(config.first_delay).await;
    let mut interval = tokio::time::interval(config.interval);

    loop {
        interval.tick().await;

        match ping(&client, &target).await {
            Ok(()) => info!("Keep-alive ping ok"),
            Err(e) => warn!("Keep-alive ping failed: {}", e),
        }
    }
}

async fn ping(client: &reqwest::Client, target: &str) -> anyhow::Result<()> {
    client.get(target).send().await?.error_for_status()?;
    Ok(())
}
