//! Error types for the panel flows.
//!
//! Remote failures arrive as [`AuthError`], [`QueryError`] or [`RpcError`].
//! Each flow wraps them in its own error type, and every flow error can be
//! turned into the banner text shown to the operator with `user_message()`.

use thiserror::Error;

/// Banner shown when the backend refuses a sign-in for an unconfirmed address.
pub const EMAIL_NOT_CONFIRMED_MESSAGE: &str =
    "Email address has not been confirmed. Check your inbox.";

/// Banner shown when the backend rejects the email/password pair.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

/// Banner shown when the email or password field is empty.
pub const MISSING_INPUT_MESSAGE: &str = "Email and password are required.";

/// Banner shown when sign-in succeeded but the profile could not be read.
pub const PROFILE_LOOKUP_MESSAGE: &str = "Failed to load the user profile.";

/// Banner shown when the role of the signed-in user could not be resolved.
pub const ROLE_LOOKUP_MESSAGE: &str = "Failed to load the user role.";

/// Banner shown when the country listing is refused or fails.
pub const COUNTRIES_MESSAGE: &str = "You do not have permission to view this data.";

/// Banner shown when the user roster could not be built.
pub const ROSTER_MESSAGE: &str = "Failed to load the user list.";

/// Banner shown when confirming an identity fails.
pub const CONFIRM_MESSAGE: &str = "Failed to confirm the user.";

/// Banner shown while another operation holds the busy flag.
pub const BUSY_MESSAGE: &str = "Another operation is still in progress.";

/// Authentication and session failures reported by the remote client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The identity exists but its email address is not confirmed yet.
    #[error("Email not confirmed")]
    EmailNotConfirmed,

    /// Unknown email or wrong password.
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Any other failure, carrying the backend's message verbatim.
    #[error("{0}")]
    Other(String),
}

impl AuthError {
    /// Classifies a raw backend message.
    ///
    /// Messages mentioning an unconfirmed email or invalid credentials map to
    /// the dedicated variants; everything else is kept as [`AuthError::Other`].
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("Email not confirmed") {
            Self::EmailNotConfirmed
        } else if message.contains("Invalid login credentials") {
            Self::InvalidCredentials
        } else {
            Self::Other(message)
        }
    }

    /// Banner text for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmailNotConfirmed => EMAIL_NOT_CONFIRMED_MESSAGE.to_string(),
            Self::InvalidCredentials => INVALID_CREDENTIALS_MESSAGE.to_string(),
            Self::Other(message) => message.clone(),
        }
    }
}

/// A table read or write failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct QueryError {
    pub message: String,
}

impl QueryError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A remote procedure call failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RpcError {
    pub message: String,
}

impl RpcError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The role of a user could not be determined.
///
/// A missing profile and a failed lookup are deliberately the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("profile lookup failed: {0}")]
    Lookup(#[from] QueryError),

    #[error("profile row could not be decoded: {0}")]
    Decode(String),
}

impl ResolutionError {
    pub fn user_message(&self) -> String {
        ROLE_LOOKUP_MESSAGE.to_string()
    }
}

/// Building the user roster failed. Partial rosters are never returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("identity listing failed: {0}")]
    Identities(RpcError),

    #[error("profile listing failed: {0}")]
    Profiles(QueryError),

    #[error("roster row could not be decoded: {0}")]
    Decode(String),

    #[error("roster operation already in progress")]
    Busy,
}

impl RosterError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Busy => BUSY_MESSAGE.to_string(),
            _ => ROSTER_MESSAGE.to_string(),
        }
    }
}

/// Confirming an identity failed, either at the procedure or while
/// re-reading the roster afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmError {
    #[error("confirm procedure failed: {0}")]
    Rpc(RpcError),

    #[error("roster refresh after confirm failed: {0}")]
    Refresh(RosterError),

    #[error("roster operation already in progress")]
    Busy,
}

impl ConfirmError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Busy => BUSY_MESSAGE.to_string(),
            Self::Rpc(_) => CONFIRM_MESSAGE.to_string(),
            Self::Refresh(err) => err.user_message(),
        }
    }
}

/// Sign-in or sign-up failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("email and password are required")]
    MissingInput,

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Authentication succeeded but the account has no readable profile.
    #[error("profile lookup after sign-in failed: {0}")]
    ProfileLookup(ResolutionError),

    /// The identity was created but its profile row was not.
    #[error("profile insert after sign-up failed: {0}")]
    ProfileInsert(QueryError),

    #[error("credential operation already in progress")]
    Busy,
}

impl CredentialError {
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingInput => MISSING_INPUT_MESSAGE.to_string(),
            Self::Auth(err) => err.user_message(),
            Self::ProfileLookup(_) => PROFILE_LOOKUP_MESSAGE.to_string(),
            Self::ProfileInsert(err) => err.message.clone(),
            Self::Busy => BUSY_MESSAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_auth_messages() {
        assert_eq!(
            AuthError::from_message("Invalid login credentials"),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            AuthError::from_message("AuthApiError: Email not confirmed"),
            AuthError::EmailNotConfirmed
        );
        assert_eq!(
            AuthError::from_message("rate limit exceeded"),
            AuthError::Other("rate limit exceeded".into())
        );
    }

    #[test]
    fn invalid_credentials_render_fixed_text() {
        let err = CredentialError::Auth(AuthError::from_message(
            "400: Invalid login credentials (attempt 3)",
        ));
        assert_eq!(err.user_message(), INVALID_CREDENTIALS_MESSAGE);
    }

    #[test]
    fn unknown_auth_errors_pass_through_verbatim() {
        let err = CredentialError::Auth(AuthError::Other("Signups not allowed".into()));
        assert_eq!(err.user_message(), "Signups not allowed");
    }

    #[test]
    fn profile_insert_keeps_backend_message() {
        let err = CredentialError::ProfileInsert(QueryError::new("duplicate key value"));
        assert_eq!(err.user_message(), "duplicate key value");
    }
}
