// # zonesync-core
//
// Core library for syncing DNS records into zones that are only editable as
// whole zone-file text.
//
// ## Architecture Overview
//
// This library holds everything that does not depend on a particular
// backend:
// - **Identifiers**: Stable record ids derived from record content
// - **Content**: Per-type conversions between raw and zone-file content
// - **Zone**: Ordered record model and the zone-file grammar
// - **DnsResolver**: Authoritative nameserver discovery and CNAME walking
// - **PropagationWatcher**: Post-mutation DNS polling
// - **RecordProvider**: Trait for backend implementations
//
// ## Design Principles
//
// 1. **Library-First**: The binary only wires configuration and logging
// 2. **Explicit Context**: Session and zone live in a per-operation context,
//    never in process-wide state
// 3. **Swappable Seams**: HTTP, DNS and HTML extraction sit behind traits so
//    tests drive them with fakes

pub mod config;
pub mod content;
pub mod error;
pub mod identifier;
pub mod names;
pub mod propagation;
pub mod resolver;
pub mod traits;
pub mod zone;

// Re-export core types for convenience
pub use config::{Action, ProviderConfig, RecordRequest, SyncConfig, TimingConfig};
pub use error::{Error, Result};
pub use identifier::{RecordIdentifier, RecordKey, build_identifier};
pub use propagation::PropagationWatcher;
pub use resolver::{Authority, DnsResolver, MAX_CNAME_HOPS, Resolution};
pub use traits::{
    ActionOutcome, DnsLookup, HttpTransport, Page, Propagation, RecordChange, RecordProvider,
    RecordView, TransportFactory,
};
pub use zone::{Rdata, RdataSet, Zone, ZoneRecords};
