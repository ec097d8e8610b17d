//! Session manager: the current session and its change notifications.

use std::sync::Arc;

use crate::client::{RemoteClient, Session, SessionSubscription};
use crate::error::AuthError;

/// Tracks the session held by the remote client.
///
/// On [`start`](SessionManager::start) the manager registers for change
/// notifications and then reads the current session once. The registration
/// lives as long as the manager and is released when it is dropped.
pub struct SessionManager<C: RemoteClient> {
    client: Arc<C>,
    current: Option<Session>,
    subscription: SessionSubscription,
}

impl<C: RemoteClient> SessionManager<C> {
    pub async fn start(client: Arc<C>) -> Result<Self, AuthError> {
        // Subscribe first so a change racing the initial read is not lost.
        let subscription = client.on_session_change();
        let current = client.get_session().await?;
        tracing::debug!(signed_in = current.is_some(), "session manager started");
        Ok(Self {
            client,
            current,
            subscription,
        })
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Waits for the next session change and records it.
    ///
    /// Returns `None` when the client stops emitting notifications.
    pub async fn next_change(&mut self) -> Option<Option<Session>> {
        let session = self.subscription.changed().await?;
        self.record(session.clone());
        Some(session)
    }

    /// Takes the next already-delivered session change, if there is one.
    pub fn poll_change(&mut self) -> Option<Option<Session>> {
        let session = self.subscription.try_changed()?;
        self.record(session.clone());
        Some(session)
    }

    /// Signs out through the remote client. The resulting `None` session
    /// arrives as an ordinary change notification.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.client.sign_out().await
    }

    fn record(&mut self, session: Option<Session>) {
        match &session {
            Some(s) => tracing::info!(user_id = %s.user.id, "session changed"),
            None => tracing::info!("session cleared"),
        }
        self.current = session;
    }
}
