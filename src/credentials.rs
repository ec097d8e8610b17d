//! Credential flow: password sign-in and sign-up with first-user bootstrap.

use std::sync::Arc;

use serde_json::json;

use crate::busy::BusyFlag;
use crate::client::{Credentials, RemoteClient, SignUpOptions};
use crate::config::PanelConfig;
use crate::error::CredentialError;
use crate::model::Role;
use crate::role::RoleResolver;

/// Notice shown after a successful sign-up.
pub const SIGN_UP_NOTICE: &str = "Account created. Check your inbox to confirm the registration.";

/// Result of a successful sign-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignUpOutcome {
    pub user_id: String,
    pub role: Role,
}

/// Signs users in and registers new ones.
///
/// # First-user bootstrap
///
/// Sign-up reads the profile table before creating the identity. If it is
/// empty the new profile is created with role `admin`, otherwise `user`.
/// The check and the insert are separate remote calls, so two concurrent
/// first sign-ups can both observe an empty table and both become admin.
/// Closing that gap needs an atomic "claim first admin" operation in the
/// backend.
///
/// # Partial failure
///
/// Identity creation and profile insertion are two steps with no rollback.
/// If the insert fails the flow reports an error while the identity stays
/// registered without a profile; the roster lists such identities with an
/// empty profile.
pub struct CredentialFlow<C: RemoteClient> {
    client: Arc<C>,
    config: Arc<PanelConfig>,
    resolver: RoleResolver<C>,
    loading: BusyFlag,
}

impl<C: RemoteClient> CredentialFlow<C> {
    pub fn new(client: Arc<C>, config: Arc<PanelConfig>) -> Self {
        let resolver = RoleResolver::new(Arc::clone(&client), Arc::clone(&config));
        Self {
            client,
            config,
            resolver,
            loading: BusyFlag::default(),
        }
    }

    /// Whether a sign-in or sign-up is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// Signs in, then checks that the account has a profile.
    ///
    /// A missing profile fails the flow even though authentication itself
    /// succeeded.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), CredentialError> {
        let credentials = validated(email, password)?;
        let _loading = self.loading.try_acquire().ok_or(CredentialError::Busy)?;

        tracing::debug!(email = %credentials.email, "sign-in attempt");
        let identity = self
            .client
            .sign_in_with_password(&credentials)
            .await
            .map_err(|err| {
                tracing::error!(email = %credentials.email, error = %err, "sign-in failed");
                CredentialError::Auth(err)
            })?;

        let role = self
            .resolver
            .resolve_role(&identity.id)
            .await
            .map_err(|err| {
                tracing::error!(user_id = %identity.id, error = %err, "no profile after sign-in");
                CredentialError::ProfileLookup(err)
            })?;
        tracing::debug!(user_id = %identity.id, %role, "signed in");
        Ok(())
    }

    /// Registers a new identity and creates its profile.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignUpOutcome, CredentialError> {
        let credentials = validated(email, password)?;
        let _loading = self.loading.try_acquire().ok_or(CredentialError::Busy)?;

        let first_user = match self.client.select(self.config.profiles_table(), "id").await {
            Ok(rows) => rows.is_empty(),
            Err(err) => {
                tracing::warn!(error = %err, "profile emptiness check failed, registering as user");
                false
            }
        };

        let options = SignUpOptions {
            email_redirect_to: self.config.email_redirect_to().map(str::to_string),
        };
        let identity = self
            .client
            .sign_up(&credentials, &options)
            .await
            .map_err(|err| {
                tracing::error!(email = %credentials.email, error = %err, "sign-up failed");
                CredentialError::Auth(err)
            })?;

        let role = if first_user { Role::Admin } else { Role::User };
        let row = json!({
            "id": identity.id,
            "email": credentials.email,
            "role": role.as_str(),
        });
        let rows = row.as_object().cloned().into_iter().collect();
        self.client
            .insert(self.config.profiles_table(), rows)
            .await
            .map_err(|err| {
                tracing::error!(
                    user_id = %identity.id,
                    error = %err,
                    "identity created but profile insert failed"
                );
                CredentialError::ProfileInsert(err)
            })?;

        if first_user {
            tracing::info!(user_id = %identity.id, "first registered identity granted admin");
        } else {
            tracing::info!(user_id = %identity.id, "identity registered");
        }
        Ok(SignUpOutcome {
            user_id: identity.id,
            role,
        })
    }
}

fn validated(email: &str, password: &str) -> Result<Credentials, CredentialError> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(CredentialError::MissingInput);
    }
    Ok(Credentials::new(email, password))
}
