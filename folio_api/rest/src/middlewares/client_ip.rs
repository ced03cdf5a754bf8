use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::anyhow;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use tracing::{debug, error, warn};

use crate::{errors::internal_server_error, RestServerRealIpConfig};

pub fn add<S: Clone + Send + Sync + 'static>(
    real_ip_config: Option<Arc<RestServerRealIpConfig>>,
) -> impl FnOnce(Router<S>) -> Router<S> {
    |router| router.layer(from_fn_with_state(real_ip_config, middleware))
}

/// The peer address comes from the `ConnectInfo` extractor, which also
/// honours `MockConnectInfo`. Without it clients cannot be told apart, so the
/// request is refused instead of sharing one rate limit between everyone.
async fn middleware(
    State(real_ip_config): State<Option<Arc<RestServerRealIpConfig>>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(ConnectInfo(peer)) = connect_info else {
        return internal_server_error(anyhow!(
            "peer address unavailable, the router must be served with connect info"
        ));
    };

    let client_ip = ClientIp::resolve(peer.ip(), request.headers(), real_ip_config.as_deref());
    request.extensions_mut().insert(client_ip);
    next.run(request).await
}

/// Address of the client that sent the request. Used as the rate limiting
/// key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientIp(pub IpAddr);

impl std::fmt::Display for ClientIp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl ClientIp {
    fn resolve(
        client_ip: IpAddr,
        headers: &HeaderMap,
        real_ip_config: Option<&RestServerRealIpConfig>,
    ) -> Self {
        let Some(RestServerRealIpConfig { header, set_from }) = real_ip_config else {
            return Self(client_ip);
        };

        let header_value = headers.get(header);

        if *set_from != client_ip {
            if let Some(header_value) = header_value {
                debug!(%client_ip, ?header_value, "ignoring real ip header from untrusted peer");
            }
            return Self(client_ip);
        }

        let Some(header_value) = header_value else {
            warn!(%client_ip, "real ip header missing on request from trusted proxy");
            return Self(client_ip);
        };

        // X-Forwarded-For style headers carry a list, the first entry is the client
        let Some(real_ip) = header_value
            .to_str()
            .ok()
            .and_then(|value| value.split(',').next())
            .and_then(|value| value.trim().parse().ok())
        else {
            error!(%client_ip, ?header_value, "failed to parse real ip header");
            return Self(client_ip);
        };

        Self(real_ip)
    }
}
