//! Propagation check after a mutation
//!
//! Polls the zone's nameservers until the expected value shows up or the
//! attempt budget is spent. Not seeing the value is informational only: the
//! zone was already submitted and stays changed.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::TimingConfig;
use crate::traits::{DnsLookup, Propagation};

/// Bounded DNS poll loop
pub struct PropagationWatcher {
    lookup: Arc<dyn DnsLookup>,
    enabled: bool,
    attempts: usize,
    interval: Duration,
}

impl PropagationWatcher {
    /// Create a watcher; `enabled` is the `propagated` provider switch
    pub fn new(lookup: Arc<dyn DnsLookup>, enabled: bool, timing: &TimingConfig) -> Self {
        Self {
            lookup,
            enabled,
            attempts: timing.propagation_attempts,
            interval: timing.propagation_interval(),
        }
    }

    /// Wait until `qname`/`rtype` answers with the well-formed `expected`
    ///
    /// An empty `nameservers` slice queries the default public resolvers.
    pub async fn await_propagation(
        &self,
        rtype: &str,
        qname: &str,
        expected: &str,
        nameservers: &[IpAddr],
    ) -> Propagation {
        if !self.enabled {
            return Propagation::Skipped;
        }

        for attempt in 1..=self.attempts {
            let answers = self.lookup.lookup(qname, rtype, nameservers).await;
            if answers.iter().any(|answer| answer == expected) {
                tracing::info!("Record {} {} is propagated", qname, rtype);
                return Propagation::Confirmed;
            }

            let remaining = self.attempts - attempt;
            tracing::info!(
                "Record is not propagated, {} retries remaining - wait {}s...",
                remaining,
                self.interval.as_secs()
            );
            if remaining > 0 {
                tokio::time::sleep(self.interval).await;
            }
        }

        tracing::warn!(
            "Record {} {} not seen on the nameservers after {} attempts",
            qname,
            rtype,
            self.attempts
        );
        Propagation::NotConfirmed
    }
}
