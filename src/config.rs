//! Names of the remote tables and procedures the panel talks to.

use std::env;

/// Panel configuration.
///
/// Every field has a default matching the backend schema created by
/// [`Migrator`](crate::migration::Migrator), so `PanelConfig::default()` works
/// against a [`SeaOrmClient`](crate::SeaOrmClient) out of the box.
///
/// ```
/// use admin_roster_panel::PanelConfig;
///
/// let config = PanelConfig::default()
///     .with_profiles_table("profiles")
///     .with_email_redirect_to("https://panel.example.com");
/// assert_eq!(config.profiles_table(), "profiles");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    profiles_table: String,
    countries_table: String,
    list_identities_procedure: String,
    confirm_identity_procedure: String,
    email_redirect_to: Option<String>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            profiles_table: "user_profiles".to_string(),
            countries_table: "countries".to_string(),
            list_identities_procedure: "get_users_with_auth_details".to_string(),
            confirm_identity_procedure: "admin_confirm_user".to_string(),
            email_redirect_to: None,
        }
    }
}

impl PanelConfig {
    /// Builds a configuration from `PANEL_*` environment variables, falling
    /// back to the defaults for anything unset or empty.
    ///
    /// | Variable                      | Field                          |
    /// |-------------------------------|--------------------------------|
    /// | `PANEL_PROFILES_TABLE`        | profile table name             |
    /// | `PANEL_COUNTRIES_TABLE`       | country table name             |
    /// | `PANEL_LIST_IDENTITIES_RPC`   | identity listing procedure     |
    /// | `PANEL_CONFIRM_IDENTITY_RPC`  | identity confirmation procedure|
    /// | `PANEL_EMAIL_REDIRECT_TO`     | sign-up redirect target        |
    ///
    /// Renamed tables and procedures must exist on the backend. For a
    /// [`SeaOrmClient`](crate::SeaOrmClient), hand the same configuration to
    /// [`with_names`](crate::SeaOrmClient::with_names).
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(value) = var("PANEL_PROFILES_TABLE") {
            config.profiles_table = value;
        }
        if let Some(value) = var("PANEL_COUNTRIES_TABLE") {
            config.countries_table = value;
        }
        if let Some(value) = var("PANEL_LIST_IDENTITIES_RPC") {
            config.list_identities_procedure = value;
        }
        if let Some(value) = var("PANEL_CONFIRM_IDENTITY_RPC") {
            config.confirm_identity_procedure = value;
        }
        config.email_redirect_to = var("PANEL_EMAIL_REDIRECT_TO");
        config
    }

    pub fn with_profiles_table(mut self, table: impl Into<String>) -> Self {
        self.profiles_table = table.into();
        self
    }

    pub fn with_countries_table(mut self, table: impl Into<String>) -> Self {
        self.countries_table = table.into();
        self
    }

    pub fn with_list_identities_procedure(mut self, procedure: impl Into<String>) -> Self {
        self.list_identities_procedure = procedure.into();
        self
    }

    pub fn with_confirm_identity_procedure(mut self, procedure: impl Into<String>) -> Self {
        self.confirm_identity_procedure = procedure.into();
        self
    }

    pub fn with_email_redirect_to(mut self, target: impl Into<String>) -> Self {
        self.email_redirect_to = Some(target.into());
        self
    }

    pub fn profiles_table(&self) -> &str {
        &self.profiles_table
    }

    pub fn countries_table(&self) -> &str {
        &self.countries_table
    }

    pub fn list_identities_procedure(&self) -> &str {
        &self.list_identities_procedure
    }

    pub fn confirm_identity_procedure(&self) -> &str {
        &self.confirm_identity_procedure
    }

    pub fn email_redirect_to(&self) -> Option<&str> {
        self.email_redirect_to.as_deref()
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
