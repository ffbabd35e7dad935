//! Zone-file grammar
//!
//! Reading goes through the master file scanner of the `domain` crate
//! (`$ORIGIN`, `$TTL`, comments, quoting, parentheses, blank owners).
//! Every record is flattened to absolute names and kept as its presentation
//! text. `$INCLUDE` is rejected; the editor only ever holds a single file.
//!
//! Writing emits one `<owner> <ttl> IN <type> <rdata>` line per rdata. In
//! relative form owners and the names inside typed rdata are shortened
//! against the origin. A name equal to the origin is written as `@` only in
//! the owner column, since the scanner reads `@` as the origin there and
//! nowhere else.

use bytes::Bytes;
use domain::base::name::{FlattenInto, Name};
use domain::base::record::Record;
use domain::rdata::ZoneRecordData;
use domain::zonefile::inplace::{Entry, Zonefile};

use super::ZoneRecords;
use crate::error::{Error, Result};
use crate::names::relativize;

type ZoneName = Name<Bytes>;
type ZoneData = ZoneRecordData<Bytes, ZoneName>;
type ZoneRecord = Record<ZoneName, ZoneData>;

/// Record types whose rdata carries domain names
const NAME_TYPES: &[&str] = &["CNAME", "MX", "NS", "PTR", "SOA", "SRV"];

/// Parse zone-file text into records anchored at the absolute `origin`
pub fn parse(text: &str, origin: &str) -> Result<ZoneRecords> {
    let mut records = ZoneRecords::new(origin);
    let mut zonefile = scanner(text, origin)?;

    while let Some(entry) = zonefile
        .next_entry()
        .map_err(|e| Error::zone_file(e.to_string()))?
    {
        let record: ZoneRecord = match entry {
            Entry::Record(record) => record.flatten_into(),
            Entry::Include { path, .. } => {
                return Err(Error::zone_file(format!(
                    "$INCLUDE {} is not supported",
                    path
                )));
            }
        };
        records.insert_parsed(
            &absolute(record.owner()),
            &record.rtype().to_string(),
            record.ttl().as_secs(),
            presentation(record.data()),
        );
    }

    Ok(records)
}

/// Write records as zone-file text, one line per rdata
pub fn write(records: &ZoneRecords, relative: bool) -> String {
    let origin = records.origin();
    let mut out = String::new();
    for (owner, set) in records.iter() {
        let owner = if relative {
            relativize(owner, origin)
        } else {
            owner.to_string()
        };
        for rdata in set.rdatas() {
            let content = if relative {
                relative_rdata(set.rtype(), rdata.content(), origin)
            } else {
                rdata.content().to_string()
            };
            out.push_str(&format!(
                "{} {} IN {} {}\n",
                owner,
                set.ttl(),
                set.rtype(),
                content
            ));
        }
    }
    out
}

fn scanner(text: &str, origin: &str) -> Result<Zonefile> {
    let origin: ZoneName = origin
        .parse()
        .map_err(|e| Error::zone_file(format!("invalid origin {}: {}", origin, e)))?;

    let mut text = text.replace("\r\n", "\n");
    if !text.ends_with('\n') {
        text.push('\n');
    }
    let mut zonefile = Zonefile::from(text.as_str());
    zonefile.set_origin(origin);
    Ok(zonefile)
}

/// Absolute presentation of a name, with trailing dot
fn absolute(name: &ZoneName) -> String {
    if name.is_root() {
        ".".to_string()
    } else {
        format!("{}.", name)
    }
}

/// Presentation text of rdata; character-strings are always quoted
fn presentation(data: &ZoneData) -> String {
    match data {
        ZoneRecordData::Txt(txt) => txt.iter().map(quote).collect::<Vec<_>>().join(" "),
        other => other.to_string(),
    }
}

fn quote(octets: &[u8]) -> String {
    let mut out = String::with_capacity(octets.len() + 2);
    out.push('"');
    for &octet in octets {
        match octet {
            b'"' | b'\\' => {
                out.push('\\');
                out.push(octet as char);
            }
            0x20..=0x7e => out.push(octet as char),
            _ => out.push_str(&format!("\\{:03}", octet)),
        }
    }
    out.push('"');
    out
}

/// Relative presentation of stored rdata
///
/// The content is scanned back into typed rdata so that only real name
/// fields are shortened. Content the scanner refuses is written unchanged;
/// it is already in absolute form.
fn relative_rdata(rtype: &str, content: &str, origin: &str) -> String {
    if !NAME_TYPES.contains(&rtype) {
        return content.to_string();
    }
    let Some(data) = scan_rdata(rtype, content, origin) else {
        return content.to_string();
    };

    let shorten = |name: &ZoneName| {
        let absolute = absolute(name);
        match relativize(&absolute, origin).as_str() {
            "@" => absolute,
            relative => relative.to_string(),
        }
    };

    match &data {
        ZoneRecordData::Cname(cname) => shorten(cname.cname()),
        ZoneRecordData::Ns(ns) => shorten(ns.nsdname()),
        ZoneRecordData::Ptr(ptr) => shorten(ptr.ptrdname()),
        ZoneRecordData::Mx(mx) => format!("{} {}", mx.preference(), shorten(mx.exchange())),
        ZoneRecordData::Srv(srv) => format!(
            "{} {} {} {}",
            srv.priority(),
            srv.weight(),
            srv.port(),
            shorten(srv.target())
        ),
        ZoneRecordData::Soa(soa) => format!(
            "{} {} {} {} {} {} {}",
            shorten(soa.mname()),
            shorten(soa.rname()),
            soa.serial(),
            soa.refresh().as_secs(),
            soa.retry().as_secs(),
            soa.expire().as_secs(),
            soa.minimum().as_secs()
        ),
        _ => content.to_string(),
    }
}

fn scan_rdata(rtype: &str, content: &str, origin: &str) -> Option<ZoneData> {
    let mut zonefile = scanner(&format!("@ 0 IN {} {}", rtype, content), origin).ok()?;
    match zonefile.next_entry().ok()?? {
        Entry::Record(record) => {
            let record: ZoneRecord = record.flatten_into();
            Some(record.data().clone())
        }
        Entry::Include { .. } => None,
    }
}
