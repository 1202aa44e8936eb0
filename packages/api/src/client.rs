//! Content-store client.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::transport::{Method, Request, Response, Transport};
use amphora_uri::{assert_uri, encode_uri, is_component, uri_to_url, Version};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

const META_SUFFIX: &str = "/meta";

/// Client for the uri-addressed content store.
///
/// Reads and writes are keyed by uris; version-qualified addresses use the
/// `@published`/`@scheduled` suffix, publish/schedule metadata lives at the
/// `/meta` suffix, and schedule/uri-index records are their own resources
/// keyed by a reversible encoding of the uri.
pub struct ContentStore {
    config: ApiConfig,
    transport: Arc<dyn Transport>,
}

impl ContentStore {
    pub fn new(config: ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn http(config: ApiConfig) -> Result<Self, ApiError> {
        let transport = Arc::new(crate::transport::HttpTransport::new(&config)?);
        Ok(Self { config, transport })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Resolve a uri to a wire url. Rejects anything that already looks
    /// like a url before the network is touched.
    fn resolve(&self, uri: &str) -> Result<String, ApiError> {
        assert_uri(uri)?;
        Ok(uri_to_url(&self.config.protocol, self.config.port, uri)?)
    }

    /// Write address for a uri: component writes get the hook-suppression
    /// flag when hooks are disabled.
    fn resolve_write(&self, uri: &str) -> Result<String, ApiError> {
        let mut url = self.resolve(uri)?;
        if is_component(uri) && !self.config.component_hooks {
            url.push_str("?componenthooks=false");
        }
        Ok(url)
    }

    async fn send(&self, method: Method, url: String, body: Option<Value>) -> Result<Response, ApiError> {
        let response = self.transport.send(Request { method, url, body }).await?;
        self.check(response)
    }

    fn check(&self, response: Response) -> Result<Response, ApiError> {
        if response.final_url.contains(&self.config.auth_redirect_marker) {
            return Err(ApiError::AuthRedirect(response.final_url));
        }
        // 2xx and 3xx are success; everything else is a transport-level
        // failure with a human-readable message.
        if response.status >= 400 {
            warn!(status = response.status, url = %response.final_url, "content-store error response");
            return Err(ApiError::Http {
                status: response.status,
                url: response.final_url,
                message: human_message(response.status, &response.body),
            });
        }
        Ok(response)
    }

    fn parse_json(url: &str, body: &str) -> Result<Value, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::InvalidBody {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    // --- object resources ---

    pub async fn get_object(&self, uri: &str) -> Result<Value, ApiError> {
        let url = self.resolve(uri)?;
        let response = self.send(Method::Get, url.clone(), None).await?;
        Self::parse_json(&url, &response.body)
    }

    pub async fn get_text(&self, uri: &str) -> Result<String, ApiError> {
        let url = self.resolve(uri)?;
        let response = self.send(Method::Get, url, None).await?;
        Ok(response.body)
    }

    /// Existence check without fetching the body
    pub async fn exists(&self, uri: &str) -> Result<bool, ApiError> {
        let url = self.resolve(uri)?;
        match self.send(Method::Head, url, None).await {
            Ok(_) => Ok(true),
            Err(ApiError::Http { status: 404, .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn save(&self, uri: &str, data: &Value) -> Result<Value, ApiError> {
        let url = self.resolve_write(uri)?;
        let response = self.send(Method::Put, url.clone(), Some(data.clone())).await?;
        Self::parse_json(&url, &response.body)
    }

    pub async fn create(&self, uri: &str, data: &Value) -> Result<Value, ApiError> {
        let url = self.resolve_write(uri)?;
        let response = self.send(Method::Post, url.clone(), Some(data.clone())).await?;
        Self::parse_json(&url, &response.body)
    }

    pub async fn update(&self, uri: &str, data: &Value) -> Result<Value, ApiError> {
        let url = self.resolve_write(uri)?;
        let response = self.send(Method::Patch, url.clone(), Some(data.clone())).await?;
        Self::parse_json(&url, &response.body)
    }

    pub async fn remove(&self, uri: &str) -> Result<(), ApiError> {
        let url = self.resolve(uri)?;
        self.send(Method::Delete, url, None).await?;
        Ok(())
    }

    /// Write a draft's content to a version-qualified address
    /// (e.g. publish = save at `@published`)
    pub async fn save_version(
        &self,
        uri: &str,
        version: &Version,
        data: &Value,
    ) -> Result<Value, ApiError> {
        let versioned = amphora_uri::replace_version(uri, Some(version));
        self.save(&versioned, data).await
    }

    pub async fn get_version(&self, uri: &str, version: &Version) -> Result<Value, ApiError> {
        let versioned = amphora_uri::replace_version(uri, Some(version));
        self.get_object(&versioned).await
    }

    // --- /meta resource: publish/schedule/history metadata, distinct from
    // component content ---

    pub async fn get_meta(&self, uri: &str) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.resolve(uri)?, META_SUFFIX);
        let response = self.send(Method::Get, url.clone(), None).await?;
        Self::parse_json(&url, &response.body)
    }

    pub async fn save_meta(&self, uri: &str, data: &Value) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.resolve(uri)?, META_SUFFIX);
        let response = self.send(Method::Put, url.clone(), Some(data.clone())).await?;
        Self::parse_json(&url, &response.body)
    }

    pub async fn update_meta(&self, uri: &str, data: &Value) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.resolve(uri)?, META_SUFFIX);
        let response = self.send(Method::Patch, url.clone(), Some(data.clone())).await?;
        Self::parse_json(&url, &response.body)
    }

    // --- schedule resource ---

    /// POST `{prefix}/schedule` with `{at, publish}`
    pub async fn create_schedule(
        &self,
        prefix: &str,
        at: DateTime<Utc>,
        publish_url: &str,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/schedule", self.resolve(prefix)?);
        let body = json!({
            "at": at.timestamp_millis(),
            "publish": publish_url,
        });
        let response = self.send(Method::Post, url.clone(), Some(body)).await?;
        Self::parse_json(&url, &response.body)
    }

    /// DELETE `{prefix}/schedule/<encoded uri>`
    pub async fn remove_schedule(&self, prefix: &str, uri: &str) -> Result<(), ApiError> {
        assert_uri(uri)?;
        let url = format!("{}/schedule/{}", self.resolve(prefix)?, encode_uri(uri));
        self.send(Method::Delete, url, None).await?;
        Ok(())
    }

    // --- uri-index resource ---

    /// DELETE `{prefix}/uris/<encoded uri>` — removes a published url
    /// mapping on unpublish
    pub async fn remove_uri_index(&self, prefix: &str, uri: &str) -> Result<(), ApiError> {
        assert_uri(uri)?;
        let url = format!("{}/uris/{}", self.resolve(prefix)?, encode_uri(uri));
        self.send(Method::Delete, url, None).await?;
        Ok(())
    }
}

fn human_message(status: u16, body: &str) -> String {
    let detail = body.trim();
    if detail.is_empty() {
        match status {
            404 => "Not found".to_string(),
            403 => "Forbidden".to_string(),
            500 => "Server error".to_string(),
            _ => format!("Request failed with status {}", status),
        }
    } else {
        // keep messages short enough to show a user
        detail.chars().take(200).collect()
    }
}
