// # zonesync - single record action
//
// This binary is a THIN integration layer: it reads configuration from
// environment variables, installs logging, wires the Robot provider to the
// reqwest transport and the hickory lookup, runs exactly one action and
// prints its outcome as JSON. All record logic lives in the library crates.
//
// ## Configuration
//
// ### Account
// - `ZONESYNC_AUTH_USERNAME`: Robot account (required)
// - `ZONESYNC_AUTH_PASSWORD`: Robot password (required)
//
// ### Behaviour
// - `ZONESYNC_CONCATENATE`: Follow CNAME chains, `yes`/`no` (default `yes`)
// - `ZONESYNC_PROPAGATED`: Wait for propagation, `yes`/`no` (default `yes`)
// - `ZONESYNC_LIVE_TESTS`: Live test mode, `yes`/`no` (unset in production)
//
// ### Action
// - `ZONESYNC_ACTION`: `create`, `list`, `update` or `delete` (required)
// - `ZONESYNC_DOMAIN`: Zone the record lives in (required)
// - `ZONESYNC_IDENTIFIER`, `ZONESYNC_TYPE`, `ZONESYNC_NAME`,
//   `ZONESYNC_CONTENT`: Record selectors
// - `ZONESYNC_TTL`: TTL for new record sets (default 3600)
//
// ### Logging
// - `ZONESYNC_LOG_LEVEL`: trace, debug, info, warn, error (default info)
//
// ## Example
//
// ```bash
// export ZONESYNC_AUTH_USERNAME=K0000000
// export ZONESYNC_AUTH_PASSWORD=secret
// export ZONESYNC_ACTION=create
// export ZONESYNC_DOMAIN=example.com
// export ZONESYNC_TYPE=TXT
// export ZONESYNC_NAME=_acme-challenge
// export ZONESYNC_CONTENT=token
//
// zonesync
// ```

use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;
use zonesync_core::config::{
    Action, DEFAULT_TTL, ProviderConfig, RecordRequest, SyncConfig, TimingConfig, parse_toggle,
};
use zonesync_core::RecordProvider;
use zonesync_lookup_hickory::HickoryLookup;
use zonesync_provider_robot::{ReqwestTransportFactory, RobotProvider};

/// Exit codes for different termination scenarios
///
/// - 0: Action succeeded
/// - 1: Configuration or startup error
/// - 2: The action failed
#[derive(Debug, Clone, Copy)]
enum SyncExitCode {
    /// The action succeeded
    Success = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<SyncExitCode> for ExitCode {
    fn from(code: SyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    sync: SyncConfig,
    request: RecordRequest,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            var(key)
                .filter(|value| !value.is_empty())
                .with_context(|| format!("{} is required", key))
        };
        let toggle = |key: &str| -> Result<Option<bool>> {
            var(key)
                .map(|value| parse_toggle(&value).with_context(|| format!("invalid {}", key)))
                .transpose()
        };

        let mut provider = ProviderConfig::new(
            required("ZONESYNC_AUTH_USERNAME")?,
            required("ZONESYNC_AUTH_PASSWORD")?,
        );
        if let Some(concatenate) = toggle("ZONESYNC_CONCATENATE")? {
            provider = provider.with_concatenate(concatenate);
        }
        if let Some(propagated) = toggle("ZONESYNC_PROPAGATED")? {
            provider = provider.with_propagated(propagated);
        }
        provider = provider.with_live_tests(toggle("ZONESYNC_LIVE_TESTS")?);

        let action: Action = required("ZONESYNC_ACTION")?.parse()?;
        let mut request = RecordRequest::new(action, required("ZONESYNC_DOMAIN")?);
        if let Some(identifier) = var("ZONESYNC_IDENTIFIER") {
            request = request.with_identifier(identifier);
        }
        if let Some(rtype) = var("ZONESYNC_TYPE") {
            request = request.with_type(rtype);
        }
        if let Some(name) = var("ZONESYNC_NAME") {
            request = request.with_name(name);
        }
        if let Some(content) = var("ZONESYNC_CONTENT") {
            request = request.with_content(content);
        }
        let ttl = match var("ZONESYNC_TTL") {
            Some(ttl) => ttl
                .parse()
                .with_context(|| format!("ZONESYNC_TTL must be a number, got '{}'", ttl))?,
            None => DEFAULT_TTL,
        };
        request = request.with_ttl(ttl);

        Ok(Self {
            sync: SyncConfig {
                provider,
                timing: TimingConfig::default(),
            },
            request,
            log_level: var("ZONESYNC_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.sync.validate()?;
        self.request.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "ZONESYNC_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
        Ok(())
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return SyncExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return SyncExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = match config.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return SyncExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return SyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(config).await {
            Ok(()) => SyncExitCode::Success,
            Err(e) => {
                error!("Action failed: {:#}", e);
                SyncExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Run the configured action and print its outcome
async fn run(config: Config) -> Result<()> {
    let provider = RobotProvider::new(
        &config.sync,
        Arc::new(ReqwestTransportFactory),
        Arc::new(HickoryLookup::new()),
    )?;

    info!(
        "Running {} on {} via {}",
        config.request.action,
        config.request.domain,
        provider.provider_name()
    );

    let outcome = provider.execute(&config.request).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
