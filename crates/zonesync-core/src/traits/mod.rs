//! Core traits for the zonesync system
//!
//! This module defines the seams between the provider-independent algorithms
//! and the outside world.
//!
//! - [`HttpTransport`]: Cookie-keeping HTTP client for one session
//! - [`DnsLookup`]: Live DNS queries against an explicit nameserver set
//! - [`RecordProvider`]: Public create/list/update/delete operations

pub mod lookup;
pub mod record_provider;
pub mod transport;

pub use lookup::{DEFAULT_NAMESERVERS, DnsLookup};
pub use record_provider::{ActionOutcome, Propagation, RecordChange, RecordProvider, RecordView};
pub use transport::{HttpTransport, Page, TransportFactory};
