use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use folio_api_rest::{RestServerConfig, RestServerRealIpConfig};
use folio_config::Config;
use folio_core_contact_impl::ContactFeatureConfig;
use folio_shared_impl::rate_limit::RateLimitServiceConfig;
use types::{Contact, Email, Health, RateLimit, RestServer, Time};

pub mod types;

/// Everything that can be derived from the configuration alone.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    rest_server_config: RestServerConfig,
    rate_limit_service_config: RateLimitServiceConfig,
    contact_feature_config: ContactFeatureConfig,
}

impl ConfigProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        // API
        let allowed_origins = config
            .http
            .allowed_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid allowed origin {origin:?}"))
            })
            .collect::<anyhow::Result<_>>()?;

        let rest_server_config = RestServerConfig {
            host: config.http.host,
            port: config.http.port,
            allowed_origins,
            body_limit: config.http.body_limit,
            real_ip_config: config.http.real_ip.as_ref().map(|real_ip_config| {
                Arc::new(RestServerRealIpConfig {
                    header: real_ip_config.header.clone(),
                    set_from: real_ip_config.set_from,
                })
            }),
        };

        // Shared
        let rate_limit_service_config = RateLimitServiceConfig {
            max_requests: config.contact.rate_limit.max_requests,
            window: *config.contact.rate_limit.window,
        };

        // Core
        let contact_feature_config = ContactFeatureConfig {
            recipient: config.contact_recipient()?,
        };

        Ok(Self {
            rest_server_config,
            rate_limit_service_config,
            contact_feature_config,
        })
    }
}

/// Owns the long lived services and wires them together.
#[derive(Debug, Clone)]
pub struct Provider {
    config: ConfigProvider,
    email: Email,
    time: Time,
    rate_limit: RateLimit,
}

impl Provider {
    pub fn new(config: ConfigProvider, email: Email) -> Self {
        let time = Time::default();
        let rate_limit = RateLimit::new(time, config.rate_limit_service_config);
        Self {
            config,
            email,
            time,
            rate_limit,
        }
    }

    /// Handle to the rate limiter shared with the rest server.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit.clone()
    }

    pub fn rest_server(&self) -> RestServer {
        let health = Health::new(self.time);
        let contact = Contact::new(self.email.clone(), self.config.contact_feature_config.clone());

        RestServer::new(
            health,
            contact,
            self.rate_limit(),
            self.config.rest_server_config.clone(),
        )
    }
}
