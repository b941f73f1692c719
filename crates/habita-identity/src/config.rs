//! Identity provider configuration.

use std::time::Duration;

/// Configuration for the identity provider gateway.
///
/// Constructed explicitly at composition time and passed into the
/// client; nothing here is read from ambient process state.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Provider region, e.g. `us-east-1`.
    pub region: String,
    /// App client id registered with the provider.
    pub client_id: String,
    /// Full endpoint override. When unset the endpoint is derived from
    /// the region. Useful for local emulators in development.
    pub endpoint: Option<String>,
    /// Per-call timeout applied to every outbound request.
    pub timeout: Duration,
}

impl IdentityConfig {
    pub fn new(region: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            client_id: client_id.into(),
            endpoint: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(url) => url.clone(),
            None => format!("https://cognito-idp.{}.amazonaws.com/", self.region),
        }
    }
}
