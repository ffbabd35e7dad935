// # Record Provider Trait
//
// Defines the public operations of a zone-editing provider.
//
// ## Implementations
//
// - Hetzner Robot: `zonesync-provider-robot` crate
//
// ## Usage
//
// ```rust,ignore
// use zonesync_core::{Action, RecordProvider, RecordRequest};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* RecordProvider implementation */;
//
//     let request = RecordRequest::new(Action::Create, "example.com")
//         .with_type("TXT")
//         .with_name("_acme-challenge")
//         .with_content("token");
//     provider.execute(&request).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::Serialize;

use crate::config::{Action, RecordRequest};
use crate::error::Result;

/// Externally visible record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    /// Record type
    #[serde(rename = "type")]
    pub rtype: String,
    /// Absolute owner name (trailing dot)
    pub name: String,
    /// TTL of the record's set
    pub ttl: u32,
    /// Raw content
    pub content: String,
    /// Hash-form identifier
    pub id: String,
}

/// Outcome of the post-mutation propagation check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// The nameservers answered with the new value
    Confirmed,
    /// The retry budget ran out first; the mutation itself stands
    NotConfirmed,
    /// The check is switched off
    Skipped,
}

/// Result of a mutating operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RecordChange {
    /// Record was added and the zone submitted
    Created {
        /// Propagation check outcome
        propagation: Propagation,
    },
    /// Matching records were replaced and the zone submitted
    Updated {
        /// Number of removed rdata
        removed: usize,
        /// Propagation check outcome
        propagation: Propagation,
    },
    /// Matching records were removed and the zone submitted
    Deleted {
        /// Number of removed rdata
        removed: usize,
    },
    /// Nothing to do (record already present, or nothing to delete)
    Unchanged,
}

/// Result of [`RecordProvider::execute`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    /// Output of `list`
    Listed(Vec<RecordView>),
    /// Output of `create`, `update` and `delete`
    Changed(RecordChange),
}

/// Trait for zone-editing provider implementations
///
/// A provider works on an explicit per-operation context returned by
/// [`authenticate`](RecordProvider::authenticate). The context owns the live
/// session and the in-flight zone; nothing is shared between contexts, so
/// independent operations can run concurrently against different zones.
///
/// Every terminal operation closes the context's session exactly once,
/// whether it succeeds or fails. `list_records` is terminal only when the
/// request's action is `list`.
#[async_trait]
pub trait RecordProvider: Send + Sync {
    /// Per-operation state (session, zone, resolved nameservers)
    type Context: Send;

    /// Resolve the zone, open a session and load the zone
    async fn authenticate(&self, request: &RecordRequest) -> Result<Self::Context>;

    /// Create a record; creating an existing record is a no-op
    async fn create_record(
        &self,
        ctx: &mut Self::Context,
        rtype: Option<&str>,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<RecordChange>;

    /// List records, filtered by any of type, name and content
    async fn list_records(
        &self,
        ctx: &mut Self::Context,
        rtype: Option<&str>,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<Vec<RecordView>>;

    /// Replace the record named by `identifier`, or by type and name
    async fn update_record(
        &self,
        ctx: &mut Self::Context,
        identifier: Option<&str>,
        rtype: Option<&str>,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<RecordChange>;

    /// Delete matching records; deleting nothing is not an error
    async fn delete_record(
        &self,
        ctx: &mut Self::Context,
        identifier: Option<&str>,
        rtype: Option<&str>,
        name: Option<&str>,
        content: Option<&str>,
    ) -> Result<RecordChange>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Authenticate and run the request's action
    async fn execute(&self, request: &RecordRequest) -> Result<ActionOutcome> {
        request.validate()?;
        let mut ctx = self.authenticate(request).await?;

        let identifier = request.identifier.as_deref();
        let rtype = request.rtype.as_deref();
        let name = request.name.as_deref();
        let content = request.content.as_deref();

        match request.action {
            Action::Create => self
                .create_record(&mut ctx, rtype, name, content)
                .await
                .map(ActionOutcome::Changed),
            Action::List => self
                .list_records(&mut ctx, rtype, name, content)
                .await
                .map(ActionOutcome::Listed),
            Action::Update => self
                .update_record(&mut ctx, identifier, rtype, name, content)
                .await
                .map(ActionOutcome::Changed),
            Action::Delete => self
                .delete_record(&mut ctx, identifier, rtype, name, content)
                .await
                .map(ActionOutcome::Changed),
        }
    }
}
