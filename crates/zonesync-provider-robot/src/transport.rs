// # reqwest Transport
//
// `HttpTransport` on top of `reqwest`. Every transport owns its own client
// and cookie jar, so two sessions never share login state.

use async_trait::async_trait;
use std::time::Duration;
use zonesync_core::traits::{HttpTransport, Page, TransportFactory};
use zonesync_core::{Error, Result};

/// Default HTTP timeout for a single request (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser-like HTTP client with a private cookie jar
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with an empty cookie jar
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<Page> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await.map_err(send_error)?;
        into_page(response).await
    }

    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Page> {
        tracing::debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .map_err(send_error)?;
        into_page(response).await
    }
}

/// Creates one [`ReqwestTransport`] per session
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestTransportFactory;

impl TransportFactory for ReqwestTransportFactory {
    fn connect(&self) -> Result<Box<dyn HttpTransport>> {
        Ok(Box::new(ReqwestTransport::new()?))
    }
}

async fn into_page(response: reqwest::Response) -> Result<Page> {
    let url = response.url().to_string();
    let status = response.status().as_u16();
    let body = response.text().await.map_err(send_error)?;
    Ok(Page { url, status, body })
}

/// Connection-level failures are retryable, everything else is not
fn send_error(e: reqwest::Error) -> Error {
    if e.is_connect() || e.is_timeout() {
        Error::transport(format!("HTTP request failed: {}", e))
    } else {
        Error::http(format!("HTTP request failed: {}", e))
    }
}
