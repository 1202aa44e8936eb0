use std::time::Duration;

/// Connection settings for the content store. Constructor-injected; there
/// is no global configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Scheme used when resolving uris to urls (`http`/`https`)
    pub protocol: String,
    /// Port appended to the host when resolving uris to urls
    pub port: u16,
    /// Per-request timeout; expiry maps to [`crate::ApiError::Timeout`]
    pub request_timeout: Duration,
    /// When false, component writes append `?componenthooks=false` to
    /// suppress server-side model hooks
    pub component_hooks: bool,
    /// Substring of a final response url that indicates the request was
    /// redirected into an authentication flow
    pub auth_redirect_marker: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            port: 80,
            request_timeout: Duration::from_secs(10),
            component_hooks: true,
            auth_redirect_marker: "/login".to_string(),
        }
    }
}
