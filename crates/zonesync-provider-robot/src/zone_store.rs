// # Zone Store
//
// Read-modify-write access to one Robot zone:
//
// - `find_zone_id`: page through `/dns/index/page/{n}` until the zone shows
//   up or a page adds no new zones
// - `load`: scrape the edit form of `/dns/update/id/{id}` and parse its
//   zone file
// - `submit`: POST the whole zone file back to `/dns/update`
//
// The backend answers 200 whether or not it accepted a zone; the only
// success signal is a confirmation phrase in the GUI language of the
// account, so the language is read before every submit.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use zonesync_core::zone::{Zone, ZoneRecords};
use zonesync_core::{Error, Result};

use crate::pages::PageExtractor;
use crate::session::Session;

/// Confirmation phrase per GUI language
const CONFIRMATIONS: &[(&str, &str)] = &[("de_DE", "Vielen Dank"), ("en_GB", "Thank you for")];

/// Load and submit zones through a session
pub struct ZoneStore {
    pages: Arc<dyn PageExtractor>,
    settle_after_submit: bool,
    settle_delay: Duration,
}

impl ZoneStore {
    /// Create a store
    ///
    /// After an accepted submit the store waits `settle_delay` when
    /// `settle_after_submit` is set, giving the backend time to apply the
    /// zone before the session is used again.
    pub fn new(
        pages: Arc<dyn PageExtractor>,
        settle_after_submit: bool,
        settle_delay: Duration,
    ) -> Self {
        Self {
            pages,
            settle_after_submit,
            settle_delay,
        }
    }

    /// Find the backend id of `zone_name`
    ///
    /// # Errors
    ///
    /// `Error::NotFound` when the listing is exhausted without a match.
    pub async fn find_zone_id(&self, session: &Session, zone_name: &str) -> Result<u64> {
        let wanted = zone_name.trim_end_matches('.');
        let mut seen: HashSet<String> = HashSet::new();
        let mut page = 1;

        loop {
            let before = seen.len();
            let listing = session.get(&format!("/dns/index/page/{}", page)).await?;

            for entry in self.pages.zone_listing(&listing.body)? {
                if entry.name.eq_ignore_ascii_case(wanted) {
                    let id = entry.id.ok_or_else(|| {
                        Error::page_model(format!("zone box of {} carries no id", wanted))
                    })?;
                    tracing::info!("Get ID {} for zone {}", id, wanted);
                    return Ok(id);
                }
                seen.insert(entry.name.to_ascii_lowercase());
            }

            if seen.len() == before {
                break;
            }
            page += 1;
        }

        tracing::error!("ID for zone {} does not exist", wanted);
        Err(Error::not_found(format!("zone {} does not exist", wanted)))
    }

    /// Load zone `id` named `zone_name`
    pub async fn load(&self, session: &Session, id: u64, zone_name: &str) -> Result<Zone> {
        let page = session.get(&format!("/dns/update/id/{}", id)).await?;
        let editor = self.pages.zone_editor(&page.body)?;
        let name = zone_name.trim_end_matches('.').to_string();
        let records = ZoneRecords::from_text(&editor.zonefile, &name)?;

        tracing::info!("Get data for zone ID {}", id);
        Ok(Zone {
            id,
            name,
            csrf_token: editor.csrf_token,
            records,
        })
    }

    /// GUI language of the account, e.g. `en_GB`
    pub async fn language(&self, session: &Session) -> Result<String> {
        let page = session.get("/preferences/culture").await?;
        let language = self.pages.language(&page.body)?;
        tracing::info!("Get GUI language {}", language);
        Ok(language)
    }

    /// Submit the zone's current records
    ///
    /// # Errors
    ///
    /// - `Error::SubmissionRejected`: the confirmation phrase is missing; the
    ///   rejected zone file is logged
    /// - `Error::PageModel`: the account's GUI language has no known phrase
    pub async fn submit(&self, session: &Session, zone: &Zone) -> Result<()> {
        let language = self.language(session).await?;
        let confirmation = CONFIRMATIONS
            .iter()
            .find(|(tag, _)| *tag == language)
            .map(|(_, phrase)| *phrase)
            .ok_or_else(|| Error::page_model(format!("unsupported GUI language {}", language)))?;

        let zonefile = zone.records.to_text(true);
        let id = zone.id.to_string();
        let response = session
            .post(
                "/dns/update",
                &[
                    ("id", id.as_str()),
                    ("zonefile", zonefile.as_str()),
                    ("_csrf_token", zone.csrf_token.as_str()),
                ],
            )
            .await?;

        if !response.body.contains(confirmation) {
            tracing::error!("Unable to update data for zone ID {}\n\n{}", zone.id, zonefile);
            return Err(Error::SubmissionRejected { zone_id: zone.id });
        }

        if self.settle_after_submit {
            tracing::info!(
                "Update data for zone ID {} - wait {}s...\n\n{}",
                zone.id,
                self.settle_delay.as_secs(),
                zonefile
            );
            tokio::time::sleep(self.settle_delay).await;
        } else {
            tracing::info!("Update data for zone ID {}\n\n{}", zone.id, zonefile);
        }
        Ok(())
    }
}
