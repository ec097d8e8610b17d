//! Role resolver: one profile row in, one role out.

use std::sync::Arc;

use crate::client::{RemoteClient, Row};
use crate::config::PanelConfig;
use crate::error::ResolutionError;
use crate::model::Role;

/// Looks up the role of a user in the profile table.
pub struct RoleResolver<C: RemoteClient> {
    client: Arc<C>,
    config: Arc<PanelConfig>,
}

impl<C: RemoteClient> Clone for RoleResolver<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            config: Arc::clone(&self.config),
        }
    }
}

impl<C: RemoteClient> RoleResolver<C> {
    pub fn new(client: Arc<C>, config: Arc<PanelConfig>) -> Self {
        Self { client, config }
    }

    /// Fetches exactly one profile row keyed by `user_id` and reads its role.
    ///
    /// A missing profile is reported the same way as a failed query. A
    /// profile whose role column is empty resolves to [`Role::User`].
    pub async fn resolve_role(&self, user_id: &str) -> Result<Role, ResolutionError> {
        tracing::debug!(user_id, "resolving role");
        let row = self
            .client
            .select_single(self.config.profiles_table(), "role", "id", user_id)
            .await?;
        role_from_row(&row)
    }
}

fn role_from_row(row: &Row) -> Result<Role, ResolutionError> {
    match row.get("role") {
        None | Some(serde_json::Value::Null) => Ok(Role::User),
        Some(serde_json::Value::String(role)) => Ok(Role::from_column(Some(role))),
        Some(other) => Err(ResolutionError::Decode(format!(
            "role column is not a string: {other}"
        ))),
    }
}
