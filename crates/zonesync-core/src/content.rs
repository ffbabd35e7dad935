//! Record content normalization
//!
//! Content is compared and stored in its well-formed (zone-file) shape and
//! handed back to callers in its raw shape. Which transformation applies is
//! decided by a per-type strategy table; types without an entry pass through
//! unchanged.

use crate::names::fqdn_name;

/// A pair of conversions between raw and well-formed content
#[derive(Clone, Copy)]
pub struct Strategy {
    /// raw -> well-formed, given the zone's domain
    pub to_wire: fn(&str, &str) -> String,
    /// well-formed -> raw
    pub to_raw: fn(&str) -> String,
}

const QUOTED: Strategy = Strategy {
    to_wire: quote,
    to_raw: unquote,
};

const QUALIFIED: Strategy = Strategy {
    to_wire: qualify,
    to_raw: verbatim,
};

const VERBATIM: Strategy = Strategy {
    to_wire: pass_through,
    to_raw: verbatim,
};

static STRATEGIES: &[(&str, Strategy)] = &[
    ("TXT", QUOTED),
    ("LOC", QUOTED),
    ("CNAME", QUALIFIED),
    ("MX", QUALIFIED),
    ("NS", QUALIFIED),
    ("SRV", QUALIFIED),
];

/// Strategy registered for a record type
pub fn strategy(rtype: &str) -> Strategy {
    STRATEGIES
        .iter()
        .find(|(tag, _)| tag.eq_ignore_ascii_case(rtype))
        .map(|(_, strategy)| *strategy)
        .unwrap_or(VERBATIM)
}

/// Well-formed content as it appears in the zone file
pub fn well_formed(rtype: &str, content: &str, domain: &str) -> String {
    (strategy(rtype).to_wire)(content, domain)
}

/// Raw content as callers supply and receive it
pub fn raw(rtype: &str, content: &str) -> String {
    (strategy(rtype).to_raw)(content)
}

fn quote(content: &str, _domain: &str) -> String {
    let mut quoted = String::with_capacity(content.len() + 2);
    if !content.starts_with('"') {
        quoted.push('"');
    }
    quoted.push_str(content);
    if !content.ends_with('"') || content == "\"" {
        quoted.push('"');
    }
    quoted
}

fn unquote(content: &str) -> String {
    content.trim_matches('"').to_string()
}

fn qualify(content: &str, domain: &str) -> String {
    if content.ends_with('.') {
        content.to_string()
    } else {
        fqdn_name(content, domain)
    }
}

fn pass_through(content: &str, _domain: &str) -> String {
    content.to_string()
}

fn verbatim(content: &str) -> String {
    content.to_string()
}
