// # DNS Resolver
//
// Finds the authoritative nameservers of a record and, with concatenation
// enabled, the tip of the CNAME chain starting at the record's name.
//
// ## Authority Walk
//
// Starting at the queried name, each level asks the default resolvers for
// SOA and NS, resolves the first field of every answer (the primary master
// or nameserver host) to A/AAAA addresses, and stops at the first level that
// yields any address. Names with fewer than two labels are never queried.
// The level that answered becomes the managed zone.
//
// ## Concatenation
//
// With concatenation enabled the resolver follows CNAME records hop by hop,
// re-running the authority walk for every target. A chain may have up to
// `MAX_CNAME_HOPS` hops; finding one more fails with
// `Error::ChainLimitExceeded`.

use std::net::IpAddr;
use std::sync::Arc;

use crate::names::{fqdn_name, label_count, parent};
use crate::traits::DnsLookup;
use crate::{Error, Result};

/// Longest CNAME chain followed before giving up
pub const MAX_CNAME_HOPS: usize = 10;

const AUTHORITY_TYPES: [&str; 2] = ["SOA", "NS"];
const ADDRESS_TYPES: [&str; 2] = ["A", "AAAA"];

/// Zone apex and nameservers responsible for a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authority {
    /// Zone name without trailing dot
    pub zone: String,
    /// Nameserver addresses; empty when the walk found none
    pub nameservers: Vec<IpAddr>,
}

/// Outcome of [`DnsResolver::resolve_concatenation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Zone name without trailing dot
    pub zone: String,
    /// Nameserver addresses of `zone`
    pub nameservers: Vec<IpAddr>,
    /// Absolute tip of the CNAME chain, when the name has one
    pub cname: Option<String>,
}

/// Authoritative nameserver discovery and CNAME chain walking
pub struct DnsResolver {
    lookup: Arc<dyn DnsLookup>,
}

impl DnsResolver {
    /// Create a resolver on top of a lookup implementation
    pub fn new(lookup: Arc<dyn DnsLookup>) -> Self {
        Self { lookup }
    }

    /// Walk up from `name` to the first level with nameservers
    ///
    /// `zone` is returned unchanged when no level answers.
    pub async fn resolve_authority(&self, zone: &str, name: &str) -> Authority {
        let mut qname = absolute(name);
        let mut qzone = zone.to_string();
        let mut nameservers: Vec<IpAddr> = Vec::new();

        while label_count(&qname) >= 2 && nameservers.is_empty() {
            for ns_type in AUTHORITY_TYPES {
                for answer in self.lookup.lookup(&qname, ns_type, &[]).await {
                    let Some(host) = answer.split_whitespace().next() else {
                        continue;
                    };
                    for ip_type in ADDRESS_TYPES {
                        for address in self.lookup.lookup(host, ip_type, &[]).await {
                            if let Ok(ip) = address.parse::<IpAddr>()
                                && !nameservers.contains(&ip)
                            {
                                nameservers.push(ip);
                            }
                        }
                    }
                }
            }
            qzone = qname.trim_end_matches('.').to_string();
            match parent(&qname) {
                Some(up) => qname = up,
                None => break,
            }
        }

        let zone = if nameservers.is_empty() {
            zone.to_string()
        } else {
            qzone
        };
        tracing::debug!(
            "DNS Lookup => {}. IN NS {}",
            zone,
            nameservers
                .iter()
                .map(IpAddr::to_string)
                .collect::<Vec<_>>()
                .join(" ")
        );

        Authority { zone, nameservers }
    }

    /// Resolve the zone, its nameservers and the CNAME chain tip of `name`
    ///
    /// Without concatenation only the authority of `name` (or of the zone
    /// apex when no name is given) is resolved.
    ///
    /// # Errors
    ///
    /// `Error::ChainLimitExceeded` when more than [`MAX_CNAME_HOPS`] CNAME
    /// records would have to be followed.
    pub async fn resolve_concatenation(
        &self,
        zone: &str,
        name: Option<&str>,
        enabled: bool,
    ) -> Result<Resolution> {
        let zone = zone.trim_end_matches('.');

        if !enabled {
            let qname = match name {
                Some(name) => fqdn_name(name, zone),
                None => format!("{}.", zone),
            };
            let authority = self.resolve_authority(zone, &qname).await;
            tracing::info!("Record {} has CNAME None", qname);
            return Ok(Resolution {
                zone: authority.zone,
                nameservers: authority.nameservers,
                cname: None,
            });
        }

        let name = fqdn_name(name.unwrap_or(zone), zone);
        let mut authority = Authority {
            zone: zone.to_string(),
            nameservers: Vec::new(),
        };
        let mut cname: Option<String> = None;
        let mut hops = 0;

        loop {
            let qname = cname.clone().unwrap_or_else(|| name.clone());
            authority = self.resolve_authority(&authority.zone, &qname).await;

            let Some(target) = self.lookup.lookup(&qname, "CNAME", &[]).await.into_iter().next()
            else {
                break;
            };

            hops += 1;
            if hops > MAX_CNAME_HOPS {
                tracing::error!(
                    "Record {} has more than {} concatenated CNAME entries. Reduce the amount of CNAME concatenations!",
                    name,
                    MAX_CNAME_HOPS
                );
                return Err(Error::ChainLimitExceeded {
                    name,
                    limit: MAX_CNAME_HOPS,
                });
            }
            tracing::debug!("CNAME hop {}: {} -> {}", hops, qname, target);
            cname = Some(absolute(&target));
        }

        tracing::info!(
            "Record {} has CNAME {}",
            name,
            cname.as_deref().unwrap_or("None")
        );
        Ok(Resolution {
            zone: authority.zone,
            nameservers: authority.nameservers,
            cname,
        })
    }
}

fn absolute(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}
