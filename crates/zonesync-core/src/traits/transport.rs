// # HTTP Transport Trait
//
// The backend is a browser-oriented web interface. A transport is one
// browser: it keeps cookies between calls and follows redirects, reporting
// the final URL so callers can tell where a login flow landed.
//
// ## Error Mapping
//
// - Connection-level failures (refused, reset, timed out): `Error::Transport`
// - Any HTTP response, including 4xx/5xx: `Ok(Page)`; status handling is
//   left to the caller

use async_trait::async_trait;

use crate::Result;

/// A fetched page after redirects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Final URL
    pub url: String,
    /// HTTP status of the final response
    pub status: u16,
    /// Response body
    pub body: String,
}

impl Page {
    /// Whether the status is 200
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Cookie-keeping HTTP client owned by a single session
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET `url`
    async fn get(&self, url: &str) -> Result<Page>;

    /// POST `fields` as `application/x-www-form-urlencoded` to `url`
    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Page>;
}

/// Creates a fresh transport (empty cookie jar) per session
pub trait TransportFactory: Send + Sync {
    /// Create a transport
    fn connect(&self) -> Result<Box<dyn HttpTransport>>;
}
