//! The remote access client consumed by every flow in this crate.
//!
//! The panel never talks to storage directly. Authentication, table access
//! and privileged procedures all go through a [`RemoteClient`], which is
//! usually a hosted backend-as-a-service. [`SeaOrmClient`](crate::SeaOrmClient)
//! is a self-hosted implementation over a relational database.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::error::{AuthError, QueryError, RpcError};

/// One table row as returned by the remote client.
pub type Row = serde_json::Map<String, Value>;

/// The user a [`Session`] is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
}

/// Proof of authentication bound to one identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub user: SessionUser,
}

impl Session {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

/// The identity returned by sign-in and sign-up.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub email: String,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub email_confirmed_at: Option<OffsetDateTime>,
}

/// Email and password pair submitted by the operator.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Extra sign-up parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignUpOptions {
    /// Where the confirmation email should send the user.
    pub email_redirect_to: Option<String>,
}

/// A live registration for session-change notifications.
///
/// Each notification carries the new session, or `None` after sign-out or
/// expiry. The registration is released when the handle is dropped.
#[derive(Debug)]
pub struct SessionSubscription {
    rx: broadcast::Receiver<Option<Session>>,
}

impl SessionSubscription {
    pub fn new(rx: broadcast::Receiver<Option<Session>>) -> Self {
        Self { rx }
    }

    /// Waits for the next notification.
    ///
    /// Returns `None` once the client has gone away. Notifications dropped
    /// because the subscriber fell behind are skipped; only the newest
    /// session state matters.
    pub async fn changed(&mut self) -> Option<Option<Session>> {
        loop {
            match self.rx.recv().await {
                Ok(session) => return Some(session),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session subscriber lagged behind");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Returns the next pending notification without waiting.
    pub fn try_changed(&mut self) -> Option<Option<Session>> {
        loop {
            match self.rx.try_recv() {
                Ok(session) => return Some(session),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "session subscriber lagged behind");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }
}

/// Interface to the remote backend.
///
/// Mirrors the surface of a hosted auth + database service: session
/// retrieval and change notifications, password sign-in/sign-up/sign-out,
/// generic table reads and inserts, and named remote procedures.
/// Implementations own timeouts and retries; callers never retry.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    /// Returns the current session, if any.
    async fn get_session(&self) -> Result<Option<Session>, AuthError>;

    /// Registers for session-change notifications (login, logout, refresh).
    fn on_session_change(&self) -> SessionSubscription;

    async fn sign_in_with_password(&self, credentials: &Credentials)
        -> Result<Identity, AuthError>;

    async fn sign_up(
        &self,
        credentials: &Credentials,
        options: &SignUpOptions,
    ) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// `table.select(columns).eq(key, value).single()`: exactly one row or an error.
    async fn select_single(
        &self,
        table: &str,
        columns: &str,
        key: &str,
        value: &str,
    ) -> Result<Row, QueryError>;

    /// `table.select(columns)`: every row visible to the caller.
    async fn select(&self, table: &str, columns: &str) -> Result<Vec<Row>, QueryError>;

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), QueryError>;

    /// Invokes a named remote procedure.
    async fn rpc(&self, procedure: &str, args: Value) -> Result<Value, RpcError>;
}
