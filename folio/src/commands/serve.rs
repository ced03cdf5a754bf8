use std::time::Duration;

use folio_config::Config;
use folio_email_contracts::EmailService;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::{
    email,
    environment::{types::RateLimit, ConfigProvider, Provider},
};

pub async fn serve(config: Config) -> anyhow::Result<()> {
    info!("Connecting to smtp server");
    let email = email::connect(&config.email)?;
    match email.ping().await {
        Ok(()) => info!("Smtp server is ready to take messages"),
        Err(err) => error!("Failed to connect to smtp server: {err:#}"),
    }

    let config_provider = ConfigProvider::new(&config)?;
    let provider = Provider::new(config_provider, email);

    spawn_rate_limit_purge(provider.rate_limit(), *config.contact.rate_limit.purge_interval);

    let server = provider.rest_server();
    info!(
        "Starting http server on {}:{}",
        config.http.host, config.http.port
    );
    server.serve().await
}

/// Periodically drop rate limit entries of clients that have been quiet for a
/// whole window, so memory stays bounded by the number of recent clients.
fn spawn_rate_limit_purge(rate_limit: RateLimit, period: Duration) {
    if period.is_zero() {
        warn!("Rate limit purge interval is zero, idle clients are never forgotten");
        return;
    }

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let removed = rate_limit.purge_expired().await;
            if removed > 0 {
                debug!(removed, "purged idle rate limit entries");
            }
        }
    });
}
