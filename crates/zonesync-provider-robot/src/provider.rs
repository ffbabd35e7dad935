// # Robot Record Orchestrator
//
// Composes session, zone store, resolver and propagation watcher into the
// four public record operations.
//
// ## Operation Lifecycle
//
// ```text
// authenticate: resolve zone/CNAME -> open session -> find zone id -> load zone
// create/update/delete: mutate zone -> submit -> (propagation) -> close session
// list: filter zone -> close session (only when the action is `list`)
// ```
//
// The session lives in the per-operation [`RobotContext`] as an `Option` and
// is closed by taking it out, so it is closed exactly once no matter which
// path an operation leaves through.

use std::net::IpAddr;
use std::sync::Arc;

use async_trait::async_trait;
use zonesync_core::config::{Action, ProviderConfig, RecordRequest, SyncConfig};
use zonesync_core::identifier::{RecordIdentifier, build_identifier};
use zonesync_core::names::fqdn_name;
use zonesync_core::traits::{
    DnsLookup, Propagation, RecordChange, RecordProvider, RecordView, TransportFactory,
};
use zonesync_core::zone::Zone;
use zonesync_core::{DnsResolver, Error, PropagationWatcher, Result, content};

use crate::pages::{HtmlPages, PageExtractor};
use crate::session::{Session, SessionManager};
use crate::zone_store::ZoneStore;

/// Per-operation state returned by [`RobotProvider::authenticate`]
#[derive(Debug)]
pub struct RobotContext {
    session: Option<Session>,
    zone: Zone,
    nameservers: Vec<IpAddr>,
    cname: Option<String>,
    action: Action,
    ttl: u32,
}

impl RobotContext {
    /// Loaded zone
    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Zone name (the discovered apex)
    pub fn domain(&self) -> &str {
        &self.zone.name
    }

    /// Authoritative nameservers found during authentication
    pub fn nameservers(&self) -> &[IpAddr] {
        &self.nameservers
    }

    /// Tip of the CNAME chain the operation edits, if any
    pub fn cname(&self) -> Option<&str> {
        self.cname.as_deref()
    }

    /// Whether the session is still open
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> Result<&Session> {
        self.session
            .as_ref()
            .ok_or_else(|| Error::Other("session already closed".to_string()))
    }

    /// Absolute owner the operation edits: the CNAME tip, else `name`
    fn owner(&self, name: &str) -> String {
        match &self.cname {
            Some(cname) => cname.clone(),
            None => fqdn_name(name, &self.zone.name),
        }
    }

    fn well_formed(&self, rtype: &str, value: &str) -> String {
        content::well_formed(rtype, value, &self.zone.name)
    }
}

/// Hetzner Robot provider
pub struct RobotProvider {
    config: ProviderConfig,
    sessions: SessionManager,
    zones: ZoneStore,
    resolver: DnsResolver,
    watcher: PropagationWatcher,
}

impl std::fmt::Debug for RobotProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RobotProvider")
            .field("config", &self.config)
            .field("sessions", &self.sessions)
            .finish_non_exhaustive()
    }
}

impl RobotProvider {
    /// Create a provider
    ///
    /// # Errors
    ///
    /// `Error::Config` when credentials or endpoints are missing.
    pub fn new(
        config: &SyncConfig,
        transports: Arc<dyn TransportFactory>,
        lookup: Arc<dyn DnsLookup>,
    ) -> Result<Self> {
        Self::with_pages(config, transports, lookup, Arc::new(HtmlPages))
    }

    /// Create a provider with a custom page extractor
    pub fn with_pages(
        config: &SyncConfig,
        transports: Arc<dyn TransportFactory>,
        lookup: Arc<dyn DnsLookup>,
        pages: Arc<dyn PageExtractor>,
    ) -> Result<Self> {
        config.validate()?;
        let provider = &config.provider;
        let timing = &config.timing;

        Ok(Self {
            config: provider.clone(),
            sessions: SessionManager::new(provider, timing, transports),
            zones: ZoneStore::new(pages, provider.settle_after_submit(), timing.settle_delay()),
            resolver: DnsResolver::new(lookup.clone()),
            watcher: PropagationWatcher::new(lookup, provider.propagated, timing),
        })
    }

    /// Close the context's session if it is still open
    pub async fn close(&self, ctx: &mut RobotContext) {
        if let Some(session) = ctx.session.take() {
            self.sessions.close(session).await;
        }
    }

    /// Name to follow for concatenation, and whether to follow it
    fn concatenation(&self, request: &RecordRequest) -> (Option<String>, bool) {
        let mut rtype = request.rtype.clone();
        let mut name = request.name.clone();
        let mut name_update = name.clone();

        if let Some(identifier) = &request.identifier {
            // A hash identifier names nothing until the zone is loaded
            let key = RecordIdentifier::parse(identifier).and_then(|id| id.raw().cloned());
            rtype = key.as_ref().map(|k| k.rtype.clone());
            name = key.map(|k| k.name);
            name_update = match &request.name {
                Some(update) => Some(fqdn_name(update, &request.domain)),
                None => name.clone(),
            };
        }

        let enabled = request.action != Action::List
            && rtype.as_deref().is_some_and(|t| !t.eq_ignore_ascii_case("CNAME"))
            && name.is_some()
            && self.config.concatenate
            && (request.action != Action::Update || name == name_update);

        if enabled {
            tracing::info!("Enabled CNAME lookup");
        } else {
            tracing::info!("Disabled CNAME lookup");
        }
        (name, enabled)
    }

    async fn load_zone(&self, session: &Session, domain: &str) -> Result<Zone> {
        let id = self.zones.find_zone_id(session, domain).await?;
        self.zones.load(session, id, domain).await
    }

    /// Records of the loaded zone matching the filters; never closes
    fn matching(
        &self,
        ctx: &RobotContext,
        rtype: Option<&str>,
        name: Option<&str>,
        value: Option<&str>,
    ) -> Vec<RecordView> {
        let owner = name.map(|name| ctx.owner(name));
        let mut records = Vec::new();

        for (rname, set) in ctx.zone.records.iter() {
            if rtype.is_some_and(|t| !t.eq_ignore_ascii_case(set.rtype())) {
                continue;
            }
            if owner.as_deref().is_some_and(|o| !o.eq_ignore_ascii_case(rname)) {
                continue;
            }
            let expected = value.map(|v| ctx.well_formed(set.rtype(), v));
            for rdata in set.rdatas() {
                if expected.as_deref().is_some_and(|e| e != rdata.content()) {
                    continue;
                }
                let raw = content::raw(set.rtype(), rdata.content());
                records.push(RecordView {
                    rtype: set.rtype().to_string(),
                    name: rname.to_string(),
                    ttl: set.ttl(),
                    id: build_identifier(set.rtype(), rname, &raw),
                    content: raw,
                });
            }
        }
        records
    }

    /// Resolve an identifier to (type, name, content)
    fn resolve_identifier(
        &self,
        ctx: &RobotContext,
        identifier: &str,
    ) -> Option<(String, String, String)> {
        match RecordIdentifier::parse(identifier)? {
            RecordIdentifier::Raw(key) => Some((key.rtype, key.name, key.content)),
            RecordIdentifier::Hash(hash) => self
                .matching(ctx, None, None, None)
                .into_iter()
                .find(|record| record.id == hash)
                .map(|record| (record.rtype, record.name, record.content)),
        }
    }

    /// Remove every listed record from the zone; returns the removed count
    fn remove_records(&self, ctx: &mut RobotContext, records: &[RecordView]) -> usize {
        let mut removed = 0;
        for record in records {
            let wire = ctx.well_formed(&record.rtype, &record.content);
            removed += ctx
                .zone
                .records
                .apply_remove_matching(&record.name, &record.rtype, |rdata| {
                    rdata.content() == wire
                });
        }
        removed
    }

    /// Submit, then check propagation of `rtype`/`name` = `value`
    async fn submit_and_watch(
        &self,
        ctx: &RobotContext,
        rtype: &str,
        name: &str,
        value: &str,
    ) -> Result<Propagation> {
        self.zones.submit(ctx.session()?, &ctx.zone).await?;
        let expected = ctx.well_formed(rtype, value);
        Ok(self
            .watcher
            .await_propagation(rtype, &ctx.owner(name), &expected, &ctx.nameservers)
            .await)
    }

    async fn create_inner(
        &self,
        ctx: &mut RobotContext,
        rtype: Option<&str>,
        name: Option<&str>,
        value: Option<&str>,
    ) -> Result<RecordChange> {
        let (Some(rtype), Some(name), Some(value)) = (rtype, name, value) else {
            tracing::error!("Record has no type|name|content specified");
            return Err(Error::config("create needs type, name and content"));
        };

        let owner = ctx.owner(name);
        let wire = ctx.well_formed(rtype, value);
        if !ctx.zone.records.apply_upsert(&owner, rtype, ctx.ttl, &wire) {
            tracing::info!("Record with content '{}' already exists", value);
            return Ok(RecordChange::Unchanged);
        }

        let propagation = self.submit_and_watch(ctx, rtype, name, value).await?;
        Ok(RecordChange::Created { propagation })
    }

    async fn update_inner(
        &self,
        ctx: &mut RobotContext,
        identifier: Option<&str>,
        rtype: Option<&str>,
        name: Option<&str>,
        value: Option<&str>,
    ) -> Result<RecordChange> {
        let (rtype, name, value, delete_content) = match identifier {
            Some(identifier) => {
                let Some((old_type, old_name, old_content)) =
                    self.resolve_identifier(ctx, identifier)
                else {
                    tracing::error!("Record with identifier '{}' does not exist", identifier);
                    return Err(Error::not_found(format!(
                        "record with identifier '{}' does not exist",
                        identifier
                    )));
                };
                (
                    rtype.map(str::to_string).unwrap_or_else(|| old_type.clone()),
                    name.map(str::to_string).unwrap_or_else(|| old_name.clone()),
                    value.map(str::to_string).unwrap_or_else(|| old_content.clone()),
                    Some((old_type, old_name, old_content)),
                )
            }
            None => match (rtype, name, value) {
                (Some(rtype), Some(name), Some(value)) => {
                    (rtype.to_string(), name.to_string(), value.to_string(), None)
                }
                _ => {
                    tracing::error!("Record has no type|name|content specified");
                    return Err(Error::config("update needs an identifier or type, name and content"));
                }
            },
        };

        let matches = match &delete_content {
            Some((old_type, old_name, old_content)) => self.matching(
                ctx,
                Some(old_type.as_str()),
                Some(old_name.as_str()),
                Some(old_content.as_str()),
            ),
            None => self.matching(ctx, Some(rtype.as_str()), Some(name.as_str()), None),
        };

        if matches.is_empty() {
            tracing::error!("Record lookup has no matches");
            return Err(Error::not_found(format!("no {} record {} to update", rtype, name)));
        }
        if delete_content.is_none() && matches.len() > 1 {
            tracing::error!("Record lookup matching more than one record");
            return Err(Error::ambiguous(format!(
                "{} {} records match {}; give the content to pick one",
                matches.len(),
                rtype,
                name
            )));
        }

        let removed = self.remove_records(ctx, &matches);
        let owner = ctx.owner(&name);
        let wire = ctx.well_formed(&rtype, &value);
        if !ctx.zone.records.apply_upsert(&owner, &rtype, ctx.ttl, &wire) {
            tracing::info!("Record with content '{}' already exists", value);
        }

        let propagation = self.submit_and_watch(ctx, &rtype, &name, &value).await?;
        Ok(RecordChange::Updated {
            removed,
            propagation,
        })
    }

    async fn delete_inner(
        &self,
        ctx: &mut RobotContext,
        identifier: Option<&str>,
        rtype: Option<&str>,
        name: Option<&str>,
        value: Option<&str>,
    ) -> Result<RecordChange> {
        let matches = match identifier {
            Some(identifier) => {
                let Some((rtype, name, value)) = self.resolve_identifier(ctx, identifier) else {
                    tracing::info!("Record with identifier '{}' does not exist", identifier);
                    return Ok(RecordChange::Unchanged);
                };
                self.matching(
                    ctx,
                    Some(rtype.as_str()),
                    Some(name.as_str()),
                    Some(value.as_str()),
                )
            }
            None => {
                if rtype.is_none() && name.is_none() {
                    return Err(Error::config(
                        "delete needs an identifier, a type or a name",
                    ));
                }
                self.matching(ctx, rtype, name, value)
            }
        };

        if matches.is_empty() {
            tracing::info!("Record lookup has no matches");
            return Ok(RecordChange::Unchanged);
        }

        let removed = self.remove_records(ctx, &matches);
        self.zones.submit(ctx.session()?, &ctx.zone).await?;
        Ok(RecordChange::Deleted { removed })
    }
}

#[async_trait]
impl RecordProvider for RobotProvider {
    type Context = RobotContext;

    async fn authenticate(&self, request: &RecordRequest) -> Result<RobotContext> {
        let (name, concatenate) = self.concatenation(request);
        let resolution = self
            .resolver
            .resolve_concatenation(&request.domain, name.as_deref(), concatenate)
            .await?;

        let session = self.sessions.open().await?;
        let zone = match self.load_zone(&session, &resolution.zone).await {
            Ok(zone) => zone,
            Err(e) => {
                self.sessions.close(session).await;
                return Err(e);
            }
        };

        Ok(RobotContext {
            session: Some(session),
            zone,
            nameservers: resolution.nameservers,
            cname: resolution.cname,
            action: request.action,
            ttl: request.ttl,
        })
    }

    async fn create_record(
        &self,
        ctx: &mut RobotContext,
        rtype: Option<&str>,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<RecordChange> {
        let result = self.create_inner(ctx, rtype, name, content).await;
        self.close(ctx).await;
        result
    }

    async fn list_records(
        &self,
        ctx: &mut RobotContext,
        rtype: Option<&str>,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<Vec<RecordView>> {
        let records = self.matching(ctx, rtype, name, content);
        if ctx.action == Action::List {
            self.close(ctx).await;
        }
        Ok(records)
    }

    async fn update_record(
        &self,
        ctx: &mut RobotContext,
        identifier: Option<&str>,
        rtype: Option<&str>,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<RecordChange> {
        let result = self.update_inner(ctx, identifier, rtype, name, content).await;
        self.close(ctx).await;
        result
    }

    async fn delete_record(
        &self,
        ctx: &mut RobotContext,
        identifier: Option<&str>,
        rtype: Option<&str>,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<RecordChange> {
        let result = self.delete_inner(ctx, identifier, rtype, name, content).await;
        self.close(ctx).await;
        result
    }

    fn provider_name(&self) -> &'static str {
        "robot"
    }
}
