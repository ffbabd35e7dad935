//! Test doubles for Robot provider contract tests
//!
//! `FakeRobot` is an in-memory Robot backend behind the `HttpTransport`
//! seam: login flow with per-transport cookie state, paged zone listing,
//! zone editor, culture page, update form and logout. It counts logins and
//! logouts so tests can assert the session lifecycle.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use zonesync_core::config::{ProviderConfig, SyncConfig, TimingConfig};
use zonesync_core::traits::{DnsLookup, HttpTransport, Page, TransportFactory};
use zonesync_core::{Error, Result};
use zonesync_provider_robot::RobotProvider;

pub const API: &str = "https://robot.test";
pub const AUTH: &str = "https://accounts.test";
pub const USERNAME: &str = "K0000000";
pub const PASSWORD: &str = "secret";
pub const CSRF_TOKEN: &str = "csrf-5f2a";

pub const EXAMPLE_COM_ID: u64 = 1001;

pub const EXAMPLE_COM: &str = "$TTL 86400
@ IN SOA ns1.first-ns.de. postmaster.robot.first-ns.de. (
        2024010101 ; serial
        14400      ; refresh
        1800       ; retry
        604800     ; expire
        86400 )    ; minimum
@     IN NS  ns1.first-ns.de.
@     IN NS  robotns2.second-ns.de.
@     IN A   192.0.2.10
www   IN A   192.0.2.10
mail  IN A   192.0.2.20
@     IN MX  10 mail
";

#[derive(Debug, Clone)]
struct FakeZone {
    id: u64,
    name: String,
    zonefile: String,
}

#[derive(Debug)]
struct RobotState {
    zones: Vec<FakeZone>,
    page_size: usize,
    language: String,
    reject_submissions: bool,
    connect_failures: usize,
    failing_status: HashMap<String, u16>,
    requests: Vec<String>,
    logins: usize,
    logouts: usize,
    submissions: Vec<String>,
    listing_pages: Vec<usize>,
}

/// In-memory Robot backend
#[derive(Clone)]
pub struct FakeRobot {
    state: Arc<Mutex<RobotState>>,
}

impl FakeRobot {
    /// Backend with `example.com` on page 2 behind some other zones
    pub fn new() -> Self {
        let mut zones: Vec<FakeZone> = (0..3)
            .map(|i| FakeZone {
                id: 900 + i,
                name: format!("other{}.example", i),
                zonefile: "$TTL 3600\n@ IN A 192.0.2.1\n".to_string(),
            })
            .collect();
        zones.push(FakeZone {
            id: EXAMPLE_COM_ID,
            name: "example.com".to_string(),
            zonefile: EXAMPLE_COM.to_string(),
        });

        Self {
            state: Arc::new(Mutex::new(RobotState {
                zones,
                page_size: 2,
                language: "en_GB".to_string(),
                reject_submissions: false,
                connect_failures: 0,
                failing_status: HashMap::new(),
                requests: Vec::new(),
                logins: 0,
                logouts: 0,
                submissions: Vec::new(),
                listing_pages: Vec::new(),
            })),
        }
    }

    pub fn with_zone(self, id: u64, name: &str, zonefile: &str) -> Self {
        self.state.lock().unwrap().zones.push(FakeZone {
            id,
            name: name.to_string(),
            zonefile: zonefile.to_string(),
        });
        self
    }

    pub fn with_language(self, language: &str) -> Self {
        self.state.lock().unwrap().language = language.to_string();
        self
    }

    pub fn rejecting_submissions(self) -> Self {
        self.state.lock().unwrap().reject_submissions = true;
        self
    }

    /// Fail the next `count` requests at connection level
    pub fn failing_connections(self, count: usize) -> Self {
        self.state.lock().unwrap().connect_failures = count;
        self
    }

    /// Answer every request to `url` with `status`
    pub fn failing_status(self, url: &str, status: u16) -> Self {
        self.state
            .lock()
            .unwrap()
            .failing_status
            .insert(url.to_string(), status);
        self
    }

    /// Number of requests that reached the backend for `url`
    pub fn requests_to(&self, url: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.requests.iter().filter(|r| *r == url).count()
    }

    pub fn zonefile(&self, id: u64) -> String {
        let state = self.state.lock().unwrap();
        state
            .zones
            .iter()
            .find(|z| z.id == id)
            .map(|z| z.zonefile.clone())
            .unwrap_or_default()
    }

    pub fn logins(&self) -> usize {
        self.state.lock().unwrap().logins
    }

    pub fn logouts(&self) -> usize {
        self.state.lock().unwrap().logouts
    }

    pub fn submissions(&self) -> usize {
        self.state.lock().unwrap().submissions.len()
    }

    pub fn listing_pages(&self) -> Vec<usize> {
        self.state.lock().unwrap().listing_pages.clone()
    }
}

impl TransportFactory for FakeRobot {
    fn connect(&self) -> Result<Box<dyn HttpTransport>> {
        Ok(Box::new(FakeTransport {
            state: self.state.clone(),
            authenticated: AtomicBool::new(false),
        }))
    }
}

/// One browser against the fake backend
struct FakeTransport {
    state: Arc<Mutex<RobotState>>,
    authenticated: AtomicBool,
}

impl FakeTransport {
    /// Connection-level failures first, then any forced status for `url`
    fn intercept(&self, url: &str) -> Result<Option<Page>> {
        let mut state = self.state.lock().unwrap();
        if state.connect_failures > 0 {
            state.connect_failures -= 1;
            return Err(Error::transport("connection refused"));
        }
        state.requests.push(url.to_string());
        Ok(state
            .failing_status
            .get(url)
            .map(|status| page(url, *status, "error")))
    }

    fn login_page() -> Page {
        page(&format!("{}/login", AUTH), 200, "<form id=\"login\"></form>")
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str) -> Result<Page> {
        if let Some(page) = self.intercept(url)? {
            return Ok(page);
        }

        if url == format!("{}/login", AUTH) {
            return Ok(Self::login_page());
        }
        let Some(path) = url.strip_prefix(API) else {
            return Ok(page(url, 404, "not found"));
        };
        if !self.authenticated.load(Ordering::SeqCst) {
            return Ok(Self::login_page());
        }

        let mut state = self.state.lock().unwrap();
        if path == "/" {
            return Ok(page(url, 200, "<h1>Robot</h1>"));
        }
        if path == "/login/logout/r/true" {
            state.logouts += 1;
            self.authenticated.store(false, Ordering::SeqCst);
            return Ok(page(&format!("{}/logout", AUTH), 200, "bye"));
        }
        if path == "/preferences/culture" {
            let body = format!(
                "<select id=\"culture\"><option value=\"de_DE\"{}>Deutsch</option>\
                 <option value=\"en_GB\"{}>English</option></select>",
                selected(&state.language, "de_DE"),
                selected(&state.language, "en_GB"),
            );
            return Ok(page(url, 200, &body));
        }
        if let Some(n) = path.strip_prefix("/dns/index/page/") {
            let n: usize = n.parse().unwrap_or(1).max(1);
            state.listing_pages.push(n);
            let pages = state.zones.len().div_ceil(state.page_size).max(1);
            // Past the end the backend keeps showing the last page
            let start = (n.min(pages) - 1) * state.page_size;
            let body: String = state
                .zones
                .iter()
                .skip(start)
                .take(state.page_size)
                .map(|z| {
                    format!(
                        "<table class=\"box_title\" onclick=\"javascript:toggleBox('{}', 'dns');\">\
                         <tr><td class=\"title\">{}</td></tr></table>",
                        z.id, z.name
                    )
                })
                .collect();
            return Ok(page(url, 200, &format!("<html><body>{}</body></html>", body)));
        }
        if let Some(id) = path.strip_prefix("/dns/update/id/") {
            let zone = id
                .parse::<u64>()
                .ok()
                .and_then(|id| state.zones.iter().find(|z| z.id == id));
            return Ok(match zone {
                Some(zone) => page(
                    url,
                    200,
                    &format!(
                        "<form><input type=\"hidden\" id=\"csrf_token\" value=\"{}\">\
                         <textarea id=\"zonefile\">{}</textarea></form>",
                        CSRF_TOKEN,
                        escape(&zone.zonefile)
                    ),
                ),
                None => page(url, 404, "not found"),
            });
        }
        Ok(page(url, 404, "not found"))
    }

    async fn post_form(&self, url: &str, fields: &[(&str, &str)]) -> Result<Page> {
        if let Some(page) = self.intercept(url)? {
            return Ok(page);
        }
        let fields: HashMap<&str, &str> = fields.iter().copied().collect();

        if url == format!("{}/login_check", AUTH) {
            if fields.get("_username") == Some(&USERNAME)
                && fields.get("_password") == Some(&PASSWORD)
            {
                self.state.lock().unwrap().logins += 1;
                self.authenticated.store(true, Ordering::SeqCst);
                return Ok(page(&format!("{}/account/masterdata", AUTH), 200, "welcome"));
            }
            return Ok(Self::login_page());
        }

        if url == format!("{}/dns/update", API) && self.authenticated.load(Ordering::SeqCst) {
            let mut state = self.state.lock().unwrap();
            let zonefile = fields.get("zonefile").copied().unwrap_or_default().to_string();
            let id: Option<u64> = fields.get("id").and_then(|id| id.parse().ok());
            let token_ok = fields.get("_csrf_token") == Some(&CSRF_TOKEN);

            if state.reject_submissions || !token_ok {
                return Ok(page(url, 200, "<form>Fehler / error</form>"));
            }
            let Some(zone) = state.zones.iter_mut().find(|z| Some(z.id) == id) else {
                return Ok(page(url, 200, "<form>unknown zone</form>"));
            };
            zone.zonefile = zonefile.clone();
            state.submissions.push(zonefile);
            let phrase = match state.language.as_str() {
                "de_DE" => "Vielen Dank für Ihre Änderung",
                "en_GB" => "Thank you for your change",
                _ => "Merci",
            };
            return Ok(page(url, 200, phrase));
        }

        Ok(page(url, 404, "not found"))
    }
}

fn page(url: &str, status: u16, body: &str) -> Page {
    Page {
        url: url.to_string(),
        status,
        body: body.to_string(),
    }
}

fn selected(language: &str, option: &str) -> &'static str {
    if language == option {
        " selected=\"selected\""
    } else {
        ""
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A DnsLookup answering from a table keyed by (qname, type)
#[derive(Default)]
pub struct ScriptedLookup {
    answers: Mutex<HashMap<(String, String), Vec<String>>>,
    queries: Mutex<Vec<(String, String)>>,
}

impl ScriptedLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(self, qname: &str, rtype: &str, answers: &[&str]) -> Self {
        self.answers.lock().unwrap().insert(
            (qname.to_ascii_lowercase(), rtype.to_string()),
            answers.iter().map(|a| a.to_string()).collect(),
        );
        self
    }

    pub fn query_count(&self, rtype: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, t)| t == rtype)
            .count()
    }
}

#[async_trait]
impl DnsLookup for ScriptedLookup {
    async fn lookup(&self, qname: &str, rtype: &str, _nameservers: &[IpAddr]) -> Vec<String> {
        let key = (qname.to_ascii_lowercase(), rtype.to_string());
        self.queries.lock().unwrap().push(key.clone());
        self.answers
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }
}

/// Production-like configuration against the fake hosts, without sleeps
pub fn config() -> SyncConfig {
    SyncConfig {
        provider: ProviderConfig::new(USERNAME, PASSWORD)
            .with_endpoints(API, AUTH)
            .with_propagated(false),
        timing: TimingConfig::immediate(),
    }
}

/// Provider on a fake backend and an empty DNS
pub fn provider(robot: &FakeRobot) -> RobotProvider {
    provider_with(robot, config(), Arc::new(ScriptedLookup::new()))
}

pub fn provider_with(
    robot: &FakeRobot,
    config: SyncConfig,
    lookup: Arc<dyn DnsLookup>,
) -> RobotProvider {
    RobotProvider::new(&config, Arc::new(robot.clone()), lookup).unwrap()
}

pub const MULTI_ID: u64 = 3003;

/// Zone with two TXT rdata at the same owner
pub const MULTI: &str = "$TTL 300
@ IN SOA ns1.first-ns.de. postmaster.robot.first-ns.de. 2024010101 14400 1800 604800 86400
_acme-challenge IN TXT \"one\"
_acme-challenge IN TXT \"two\"
";

/// Backend holding `example.com` and `multi.example`
pub fn robot_with_multi() -> FakeRobot {
    FakeRobot::new().with_zone(MULTI_ID, "multi.example", MULTI)
}
