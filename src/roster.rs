//! User roster: identity records left-joined with profile rows.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::busy::BusyFlag;
use crate::client::RemoteClient;
use crate::config::PanelConfig;
use crate::error::{ConfirmError, RosterError};
use crate::model::{IdentityRecord, Profile, ProfileSummary, RosterEntry};

/// Builds the user roster and confirms identities.
///
/// Listing and confirming share one busy flag: while either is in flight,
/// the other is refused with a `Busy` error instead of interleaving.
pub struct RosterReconciler<C: RemoteClient> {
    client: Arc<C>,
    config: Arc<PanelConfig>,
    busy: BusyFlag,
}

impl<C: RemoteClient> RosterReconciler<C> {
    pub fn new(client: Arc<C>, config: Arc<PanelConfig>) -> Self {
        Self {
            client,
            config,
            busy: BusyFlag::default(),
        }
    }

    /// Whether a list or confirm operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.is_set()
    }

    /// Reads identities and profiles and merges them.
    ///
    /// Identity records drive the join: every identity yields exactly one
    /// entry, with an empty profile if none matches. A failure in either
    /// read fails the whole listing.
    pub async fn list_roster(&self) -> Result<Vec<RosterEntry>, RosterError> {
        let _guard = self.busy.try_acquire().ok_or(RosterError::Busy)?;
        self.fetch_roster().await
    }

    /// Marks an identity confirmed, then re-reads the full roster.
    ///
    /// Local state is never patched; the returned roster is what the backend
    /// reports after the confirmation.
    pub async fn confirm_identity(&self, user_id: &str) -> Result<Vec<RosterEntry>, ConfirmError> {
        let _guard = self.busy.try_acquire().ok_or(ConfirmError::Busy)?;

        self.client
            .rpc(
                self.config.confirm_identity_procedure(),
                json!({ "user_id": user_id }),
            )
            .await
            .map_err(|err| {
                tracing::error!(user_id, error = %err, "confirming identity failed");
                ConfirmError::Rpc(err)
            })?;
        tracing::info!(user_id, "identity confirmed");

        self.fetch_roster().await.map_err(ConfirmError::Refresh)
    }

    async fn fetch_roster(&self) -> Result<Vec<RosterEntry>, RosterError> {
        let identities = self
            .client
            .rpc(self.config.list_identities_procedure(), json!({}))
            .await
            .map_err(RosterError::Identities)?;
        let identities: Vec<IdentityRecord> = decode_rows(identities)?;

        let profiles = self
            .client
            .select(self.config.profiles_table(), "id, email, role")
            .await
            .map_err(RosterError::Profiles)?;
        let profiles: Vec<Profile> = decode_rows(serde_json::Value::Array(
            profiles.into_iter().map(serde_json::Value::Object).collect(),
        ))?;

        tracing::debug!(
            identities = identities.len(),
            profiles = profiles.len(),
            "merging roster"
        );
        Ok(reconcile(identities, profiles))
    }
}

/// Left-joins identities to profiles on the identifier.
///
/// Output order follows `identities`. Profiles without an identity are dropped.
pub fn reconcile(identities: Vec<IdentityRecord>, profiles: Vec<Profile>) -> Vec<RosterEntry> {
    let mut by_id: HashMap<String, Profile> = profiles
        .into_iter()
        .map(|profile| (profile.id.clone(), profile))
        .collect();

    identities
        .into_iter()
        .map(|identity| {
            let profile = by_id
                .remove(&identity.id)
                .map(|profile| ProfileSummary { role: profile.role })
                .unwrap_or_default();
            RosterEntry {
                id: identity.id,
                email: identity.email,
                email_confirmed_at: identity.email_confirmed_at,
                profile,
            }
        })
        .collect()
}

fn decode_rows<T: DeserializeOwned>(value: serde_json::Value) -> Result<Vec<T>, RosterError> {
    match value {
        serde_json::Value::Null => Ok(Vec::new()),
        value => serde_json::from_value(value).map_err(|e| RosterError::Decode(e.to_string())),
    }
}
