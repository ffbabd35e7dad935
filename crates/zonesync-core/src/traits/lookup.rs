// # DNS Lookup Trait
//
// Live DNS queries are delegated to an implementation crate
// (`zonesync-lookup-hickory`). Answers come back in presentation format:
// TXT character-strings quoted, domain names absolute, SOA/MX/SRV rdata as
// space-separated fields, so they compare directly against well-formed
// zone content.

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr};

/// Public resolvers used when no nameserver set is known yet
pub const DEFAULT_NAMESERVERS: [IpAddr; 2] = [
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
    IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
];

/// Trait for DNS query implementations
#[async_trait]
pub trait DnsLookup: Send + Sync {
    /// Query `qname` for `rtype`
    ///
    /// An empty `nameservers` slice means [`DEFAULT_NAMESERVERS`]. Failures
    /// (NXDOMAIN, no answer, timeout) are logged at debug level and yield an
    /// empty answer.
    async fn lookup(&self, qname: &str, rtype: &str, nameservers: &[IpAddr]) -> Vec<String>;
}
