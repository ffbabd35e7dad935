// # Hetzner Robot Provider
//
// This crate edits DNS zones hosted on the Hetzner Robot web interface.
//
// Robot offers no record API: a zone is a single zone-file text behind a
// browser login. Every operation therefore logs in, scrapes and parses the
// whole zone, changes it in memory and posts the whole zone back.
//
// ## Modules
//
// - `session`: login/logout and the per-request retry policy
// - `pages`: HTML page-model extraction (zone ids, CSRF token, zone file,
//   GUI language)
// - `zone_store`: zone lookup, load and submit
// - `provider`: the `RecordProvider` implementation
// - `transport`: `reqwest`-based `HttpTransport`
//
// ## Security Requirements
//
// - The account password NEVER appears in logs or `Debug` output
// - Every operation closes its session, on success and on failure
//
// ## Endpoints
//
// - Login: `{auth}/login`, `{auth}/login_check`
// - Zone listing: GET `/dns/index/page/{n}`
// - Zone editor: GET `/dns/update/id/{id}`
// - Zone update: POST `/dns/update`
// - GUI language: GET `/preferences/culture`
// - Logout: GET `/login/logout/r/true`

pub mod pages;
pub mod provider;
pub mod session;
pub mod transport;
pub mod zone_store;

pub use pages::{HtmlPages, PageExtractor, ZoneEditor, ZoneEntry};
pub use provider::{RobotContext, RobotProvider};
pub use session::{Session, SessionManager};
pub use transport::{ReqwestTransport, ReqwestTransportFactory};
pub use zone_store::ZoneStore;
