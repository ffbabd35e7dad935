//! Page-model extraction
//!
//! The Robot web interface has no API; zone ids, the CSRF token, the zone
//! file and the GUI language are scraped from its HTML. The scraping sits
//! behind [`PageExtractor`] so the HTML parser can be swapped and the rest of
//! the provider tested without markup.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use zonesync_core::{Error, Result};

const ZONE_BOX: &str = "table.box_title";
const ZONE_TITLE: &str = "td.title";
const CSRF_TOKEN: &str = "input#csrf_token";
const ZONE_FILE: &str = "textarea#zonefile";
const SELECTED_CULTURE: &str = "select#culture option[selected]";

/// First quoted number in a box's `onclick` handler
const ZONE_ID_PATTERN: &str = r"'(\d+)'";

/// One zone on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    /// Zone id, when the box carries one
    pub id: Option<u64>,
    /// Zone name as shown
    pub name: String,
}

/// Contents of the zone edit form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEditor {
    /// Token the update form must echo back
    pub csrf_token: String,
    /// Zone file text
    pub zonefile: String,
}

/// Narrow interface over the pages the provider reads
pub trait PageExtractor: Send + Sync {
    /// Zones listed on one page of `/dns/index/page/{n}`
    fn zone_listing(&self, body: &str) -> Result<Vec<ZoneEntry>>;

    /// CSRF token and zone file of `/dns/update/id/{id}`
    fn zone_editor(&self, body: &str) -> Result<ZoneEditor>;

    /// Selected GUI language of `/preferences/culture`, e.g. `en_GB`
    fn language(&self, body: &str) -> Result<String>;
}

/// [`PageExtractor`] backed by `scraper`
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlPages;

impl PageExtractor for HtmlPages {
    fn zone_listing(&self, body: &str) -> Result<Vec<ZoneEntry>> {
        let document = Html::parse_document(body);
        let boxes = selector(ZONE_BOX)?;
        let title = selector(ZONE_TITLE)?;
        let id_pattern = Regex::new(ZONE_ID_PATTERN)
            .map_err(|e| Error::page_model(format!("invalid zone id pattern: {}", e)))?;

        let mut zones = Vec::new();
        for zone_box in document.select(&boxes) {
            let Some(name) = zone_box.select(&title).next().map(text_of) else {
                continue;
            };
            let id = zone_box
                .value()
                .attr("onclick")
                .and_then(|onclick| id_pattern.captures(onclick))
                .and_then(|captures| captures.get(1))
                .and_then(|digits| digits.as_str().parse().ok());
            zones.push(ZoneEntry {
                id,
                name: name.trim().to_string(),
            });
        }
        Ok(zones)
    }

    fn zone_editor(&self, body: &str) -> Result<ZoneEditor> {
        let document = Html::parse_document(body);

        let csrf_token = document
            .select(&selector(CSRF_TOKEN)?)
            .next()
            .and_then(|input| input.value().attr("value"))
            .ok_or_else(|| Error::page_model("zone editor has no csrf_token"))?
            .to_string();

        let zonefile = document
            .select(&selector(ZONE_FILE)?)
            .next()
            .map(text_of)
            .ok_or_else(|| Error::page_model("zone editor has no zonefile"))?;

        Ok(ZoneEditor {
            csrf_token,
            zonefile,
        })
    }

    fn language(&self, body: &str) -> Result<String> {
        let document = Html::parse_document(body);
        document
            .select(&selector(SELECTED_CULTURE)?)
            .next()
            .and_then(|option| option.value().attr("value"))
            .map(str::to_string)
            .ok_or_else(|| Error::page_model("culture page has no selected language"))
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::page_model(format!("invalid selector {}: {}", css, e)))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect()
}
