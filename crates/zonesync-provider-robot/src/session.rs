// # Session Manager
//
// Cookie-based login against the account host, followed by a hop to the
// Robot host. A `Session` owns the transport that carries the login cookies.
//
// ## Login Flow
//
// 1. GET  `{auth}/login` (sets the pre-login cookies)
// 2. POST `{auth}/login_check` with `_username` and `_password`
// 3. The response must have landed on `{auth}/account/masterdata` with 200
// 4. GET  `{api}/` must answer 200 from the API host
//
// Any deviation, including an error status on one of these requests, is an
// authentication failure and is never retried.
//
// ## Retry Policy
//
// Every request made through a session is retried on connection-level
// failures (`Error::Transport`) with a fixed backoff. Responses with a
// status of 400 or above fail immediately with `Error::Http`.

use std::sync::Arc;
use std::time::Duration;

use zonesync_core::config::{ProviderConfig, TimingConfig};
use zonesync_core::traits::{HttpTransport, Page, TransportFactory};
use zonesync_core::{Error, Result};

/// An authenticated browser session
pub struct Session {
    transport: Box<dyn HttpTransport>,
    api_endpoint: String,
    attempts: usize,
    backoff: Duration,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_endpoint", &self.api_endpoint)
            .field("attempts", &self.attempts)
            .field("backoff", &self.backoff)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// GET a path on the API host
    pub async fn get(&self, path: &str) -> Result<Page> {
        let url = format!("{}{}", self.api_endpoint, path);
        self.fetch(&url).await
    }

    /// POST form fields to a path on the API host
    pub async fn post(&self, path: &str, fields: &[(&str, &str)]) -> Result<Page> {
        let url = format!("{}{}", self.api_endpoint, path);
        self.submit(&url, fields).await
    }

    /// GET an absolute URL
    async fn fetch(&self, url: &str) -> Result<Page> {
        self.with_retry(url, || self.transport.get(url)).await
    }

    /// POST form fields to an absolute URL
    async fn submit(&self, url: &str, fields: &[(&str, &str)]) -> Result<Page> {
        self.with_retry(url, || self.transport.post_form(url, fields))
            .await
    }

    async fn with_retry<F, Fut>(&self, url: &str, mut request: F) -> Result<Page>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<Page>>,
    {
        let mut attempt = 0;
        let page = loop {
            attempt += 1;
            match request().await {
                Ok(page) => break page,
                Err(e) if e.is_retryable() && attempt < self.attempts => {
                    tracing::warn!(
                        "Request to {} failed (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.attempts,
                        e
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => return Err(e),
            }
        };

        if page.status >= 400 {
            return Err(Error::http(format!(
                "{} answered with status {}",
                page.url, page.status
            )));
        }
        Ok(page)
    }
}

/// Opens and closes [`Session`]s for one account
pub struct SessionManager {
    transports: Arc<dyn TransportFactory>,
    username: String,
    password: String,
    api_endpoint: String,
    auth_endpoint: String,
    logout_on_close: bool,
    attempts: usize,
    backoff: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("api_endpoint", &self.api_endpoint)
            .field("auth_endpoint", &self.auth_endpoint)
            .field("logout_on_close", &self.logout_on_close)
            .finish()
    }
}

impl SessionManager {
    /// Create a manager for the configured account
    pub fn new(
        config: &ProviderConfig,
        timing: &TimingConfig,
        transports: Arc<dyn TransportFactory>,
    ) -> Self {
        Self {
            transports,
            username: config.auth_username.clone(),
            password: config.auth_password.clone(),
            api_endpoint: config.api_endpoint.trim_end_matches('/').to_string(),
            auth_endpoint: config.auth_endpoint.trim_end_matches('/').to_string(),
            logout_on_close: config.logout_on_close(),
            attempts: timing.transport_attempts.max(1),
            backoff: timing.transport_backoff(),
        }
    }

    /// Log in and return a live session
    ///
    /// # Errors
    ///
    /// - `Error::Authentication`: the login flow did not land where expected,
    ///   including any login step answered with status 400 or above
    /// - `Error::Transport`: the backend was unreachable
    pub async fn open(&self) -> Result<Session> {
        let session = Session {
            transport: self.transports.connect()?,
            api_endpoint: self.api_endpoint.clone(),
            attempts: self.attempts,
            backoff: self.backoff,
        };

        let landed = match self.login(&session).await {
            Ok(page) => page,
            Err(Error::Http(msg)) => {
                tracing::error!("Unable to open session to account {}", self.username);
                return Err(Error::auth(msg));
            }
            Err(e) => return Err(e),
        };

        if !landed.url.contains(&self.api_endpoint) || !landed.is_ok() {
            tracing::error!("Unable to open session to account {}", self.username);
            return Err(Error::auth(format!(
                "Login for account {} landed on {} (status {})",
                self.username, landed.url, landed.status
            )));
        }

        tracing::info!("Open session to account {}", self.username);
        Ok(session)
    }

    /// Steps 1 to 4 of the login flow, returning the page it landed on
    async fn login(&self, session: &Session) -> Result<Page> {
        session
            .fetch(&format!("{}/login", self.auth_endpoint))
            .await?;
        let landed = session
            .submit(
                &format!("{}/login_check", self.auth_endpoint),
                &[
                    ("_username", self.username.as_str()),
                    ("_password", self.password.as_str()),
                ],
            )
            .await?;

        let masterdata = format!("{}/account/masterdata", self.auth_endpoint);
        if landed.url == masterdata && landed.is_ok() {
            session.fetch(&format!("{}/", self.api_endpoint)).await
        } else {
            Ok(landed)
        }
    }

    /// Log out, best effort
    ///
    /// Failures are logged, never returned. In live test mode the logout
    /// request is skipped and the backend session stays valid.
    pub async fn close(&self, session: Session) {
        if !self.logout_on_close {
            tracing::debug!("Live test mode: keeping session of account {}", self.username);
            return;
        }

        match session.get("/login/logout/r/true").await {
            Ok(page)
                if page.url.contains(&format!("{}/logout", self.auth_endpoint))
                    && page.is_ok() =>
            {
                tracing::info!("Close session");
            }
            Ok(page) => {
                tracing::error!("Unable to safely close session (landed on {})", page.url);
            }
            Err(e) => {
                tracing::error!("Unable to safely close session: {}", e);
            }
        }
    }

    /// Whether closing a session sends the logout request
    pub fn logout_on_close(&self) -> bool {
        self.logout_on_close
    }
}
