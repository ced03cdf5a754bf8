use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{http::HeaderValue, Router};
use folio_core_contact_contracts::ContactFeatureService;
use folio_core_health_contracts::HealthFeatureService;
use folio_shared_contracts::rate_limit::RateLimitService;
use tokio::net::TcpListener;
use tracing::info;

mod errors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Health, Contact, RateLimit> {
    health: Health,
    contact: Contact,
    rate_limit: RateLimit,
    config: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Origins allowed to call the api from a browser. Empty means any.
    pub allowed_origins: Vec<HeaderValue>,
    /// Maximum size of a request body in bytes.
    pub body_limit: usize,
    pub real_ip_config: Option<Arc<RestServerRealIpConfig>>,
}

/// Take the client ip from `header` if the request comes from `set_from`,
/// e.g. a reverse proxy.
#[derive(Debug, Clone)]
pub struct RestServerRealIpConfig {
    pub header: String,
    pub set_from: IpAddr,
}

impl<Health, Contact, RateLimit> RestServer<Health, Contact, RateLimit>
where
    Health: HealthFeatureService,
    Contact: ContactFeatureService,
    RateLimit: RateLimitService,
{
    pub fn new(
        health: Health,
        contact: Contact,
        rate_limit: RateLimit,
        config: RestServerConfig,
    ) -> Self {
        Self {
            health,
            contact,
            rate_limit,
            config,
        }
    }

    pub async fn serve(self) -> anyhow::Result<()> {
        let addr = (self.config.host, self.config.port);
        let router = self.router();

        let listener = TcpListener::bind(addr).await?;
        info!("listening on {}", listener.local_addr()?);

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .map_err(Into::into)
    }

    /// The complete application without a listener. It has to be served with
    /// `into_make_service_with_connect_info::<SocketAddr>` (or wrapped in
    /// `MockConnectInfo`), requests without a peer address are answered with
    /// 500.
    pub fn router(self) -> Router<()> {
        let RestServerConfig {
            allowed_origins,
            body_limit,
            real_ip_config,
            ..
        } = self.config;

        let router = Router::new()
            .merge(routes::health::router(Arc::new(self.health)))
            .merge(routes::contact::router(
                Arc::new(self.contact),
                Arc::new(self.rate_limit),
                body_limit,
            ))
            .fallback(errors::not_found);

        let router = middlewares::panic_handler::add(router);
        let router = middlewares::trace::add(router);
        let router = middlewares::client_ip::add(real_ip_config)(router);
        let router = middlewares::request_id::add(router);
        middlewares::cors::add(allowed_origins)(router)
    }
}
