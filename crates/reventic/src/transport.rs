//! HTTP transport for sending payloads.

use crate::config::Config;
use crate::types::{ApiResponse, Endpoint, OutboundRequest};
use crate::Error;
use reqwest::Url;
use tracing::debug;

/// HTTP transport for posting payloads to the Reventic API.
#[derive(Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    event_url: Url,
    user_url: Url,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        let mut base = config.base_url().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| Error::Config(e.to_string()))?;
        let join = |endpoint: Endpoint| {
            base.join(endpoint.path())
                .map_err(|e| Error::Config(e.to_string()))
        };

        Ok(Self {
            client,
            event_url: join(Endpoint::Event)?,
            user_url: join(Endpoint::User)?,
        })
    }

    /// Full URL for an endpoint.
    pub fn url(&self, endpoint: Endpoint) -> &Url {
        match endpoint {
            Endpoint::Event => &self.event_url,
            Endpoint::User => &self.user_url,
        }
    }

    /// Post a payload and decode the JSON response.
    pub async fn send(
        &self,
        endpoint: Endpoint,
        payload: &OutboundRequest,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(endpoint);
        debug!(
            url = %url,
            property_count = payload.properties.len(),
            "sending payload"
        );

        let response = self
            .client
            .post(url.clone())
            .header("apiKey", &payload.api_key)
            .json(payload)
            .send()
            .await?
            .error_for_status()?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice(&bytes)?;

        debug!(status = %status, "payload sent successfully");

        Ok(ApiResponse::new(body))
    }
}
