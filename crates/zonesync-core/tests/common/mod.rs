//! Test doubles for DNS contract tests
//!
//! `ScriptedLookup` answers from a fixed table and records every query, so
//! tests can assert both the outcome of a walk and how it got there.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;

use zonesync_core::traits::DnsLookup;

/// A DnsLookup answering from a table keyed by (qname, type)
#[derive(Default)]
pub struct ScriptedLookup {
    answers: Mutex<HashMap<(String, String), Vec<String>>>,
    queries: Mutex<Vec<(String, String, Vec<IpAddr>)>>,
}

impl ScriptedLookup {
    /// Create an empty lookup; every query yields no answer
    pub fn new() -> Self {
        Self::default()
    }

    /// Add answers for (qname, rtype)
    pub fn answer(self, qname: &str, rtype: &str, answers: &[&str]) -> Self {
        self.set(qname, rtype, answers);
        self
    }

    /// Make `zone` authoritative on `host` at `ip` (SOA + NS + A)
    pub fn delegate(self, zone: &str, host: &str, ip: &str) -> Self {
        let soa = format!("{} hostmaster.{} 1 7200 3600 1209600 3600", host, zone);
        self.answer(zone, "SOA", &[&soa])
            .answer(zone, "NS", &[host])
            .answer(host, "A", &[ip])
    }

    /// Replace answers for (qname, rtype)
    pub fn set(&self, qname: &str, rtype: &str, answers: &[&str]) {
        self.answers.lock().unwrap().insert(
            key(qname, rtype),
            answers.iter().map(|a| a.to_string()).collect(),
        );
    }

    /// All queries as (qname, rtype)
    pub fn queries(&self) -> Vec<(String, String)> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(qname, rtype, _)| (qname.clone(), rtype.clone()))
            .collect()
    }

    /// Number of queries for a record type
    pub fn query_count(&self, rtype: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, t, _)| t == rtype)
            .count()
    }

    /// Nameservers passed with the last query
    pub fn last_nameservers(&self) -> Vec<IpAddr> {
        self.queries
            .lock()
            .unwrap()
            .last()
            .map(|(_, _, ns)| ns.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DnsLookup for ScriptedLookup {
    async fn lookup(&self, qname: &str, rtype: &str, nameservers: &[IpAddr]) -> Vec<String> {
        let (qname, rtype) = key(qname, rtype);
        self.queries
            .lock()
            .unwrap()
            .push((qname.clone(), rtype.clone(), nameservers.to_vec()));
        self.answers
            .lock()
            .unwrap()
            .get(&(qname, rtype))
            .cloned()
            .unwrap_or_default()
    }
}

fn key(qname: &str, rtype: &str) -> (String, String) {
    let qname = qname.to_ascii_lowercase();
    let qname = if qname.ends_with('.') {
        qname
    } else {
        format!("{}.", qname)
    };
    (qname, rtype.to_ascii_uppercase())
}
