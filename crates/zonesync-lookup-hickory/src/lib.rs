// # hickory DNS Lookup
//
// This crate provides the `DnsLookup` implementation used in production.
//
// ## Behaviour
//
// - Every query builds a resolver for exactly the requested nameserver set
//   (or the public defaults), so answers are never served from a cache
//   shared between propagation polls
// - Answers are rendered in presentation format: TXT character-strings
//   quoted, domain names absolute
// - Errors (NXDOMAIN, no data, timeouts, unknown types) are logged at debug
//   level and yield an empty answer

use async_trait::async_trait;
use hickory_resolver::Resolver;
use hickory_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::rr::{RData, RecordType};
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;
use zonesync_core::traits::{DEFAULT_NAMESERVERS, DnsLookup};

/// Per-query timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Attempts per nameserver
const DEFAULT_ATTEMPTS: usize = 2;

const DNS_PORT: u16 = 53;

/// `DnsLookup` on top of `hickory-resolver`
#[derive(Debug, Clone)]
pub struct HickoryLookup {
    timeout: Duration,
    attempts: usize,
}

impl Default for HickoryLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl HickoryLookup {
    /// Create a lookup with default timeout and attempts
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            attempts: DEFAULT_ATTEMPTS,
        }
    }

    /// Set the per-query timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn resolver(&self, nameservers: &[IpAddr]) -> Resolver<TokioConnectionProvider> {
        let ips = if nameservers.is_empty() {
            &DEFAULT_NAMESERVERS[..]
        } else {
            nameservers
        };
        let group = NameServerConfigGroup::from_ips_clear(ips, DNS_PORT, true);
        let config = ResolverConfig::from_parts(None, vec![], group);

        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = self.attempts;

        Resolver::builder_with_config(config, TokioConnectionProvider::default())
            .with_options(opts)
            .build()
    }
}

#[async_trait]
impl DnsLookup for HickoryLookup {
    async fn lookup(&self, qname: &str, rtype: &str, nameservers: &[IpAddr]) -> Vec<String> {
        let record_type = match RecordType::from_str(&rtype.to_ascii_uppercase()) {
            Ok(record_type) => record_type,
            Err(e) => {
                tracing::debug!("DNS Lookup => {} {}: {}", qname, rtype, e);
                return Vec::new();
            }
        };

        match self.resolver(nameservers).lookup(qname, record_type).await {
            Ok(lookup) => {
                let answers: Vec<String> = lookup
                    .iter()
                    .filter(|rdata| rdata.record_type() == record_type)
                    .map(presentation)
                    .collect();
                for answer in &answers {
                    tracing::debug!("DNS Lookup => {} IN {} {}", qname, record_type, answer);
                }
                answers
            }
            Err(e) => {
                tracing::debug!("DNS Lookup => {} {}: {}", qname, record_type, e);
                Vec::new()
            }
        }
    }
}

/// Render rdata the way it appears in a zone file
pub fn presentation(rdata: &RData) -> String {
    match rdata {
        RData::A(a) => a.0.to_string(),
        RData::AAAA(aaaa) => aaaa.0.to_string(),
        RData::CNAME(name) => name.0.to_string(),
        RData::NS(name) => name.0.to_string(),
        RData::PTR(name) => name.0.to_string(),
        RData::MX(mx) => format!("{} {}", mx.preference(), mx.exchange()),
        RData::SRV(srv) => format!(
            "{} {} {} {}",
            srv.priority(),
            srv.weight(),
            srv.port(),
            srv.target()
        ),
        RData::SOA(soa) => format!(
            "{} {} {} {} {} {} {}",
            soa.mname(),
            soa.rname(),
            soa.serial(),
            soa.refresh(),
            soa.retry(),
            soa.expire(),
            soa.minimum()
        ),
        RData::TXT(txt) => txt
            .iter()
            .map(|bytes| quote(&String::from_utf8_lossy(bytes)))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
