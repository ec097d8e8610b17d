//! Scripted in-memory remote client for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use admin_roster_panel::{
    AuthError, Credentials, Identity, QueryError, RemoteClient, Row, RpcError, Session,
    SessionSubscription, SessionUser, SignUpOptions,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::broadcast;

pub const PROFILES: &str = "user_profiles";
pub const COUNTRIES: &str = "countries";
pub const LIST_RPC: &str = "get_users_with_auth_details";
pub const CONFIRM_RPC: &str = "admin_confirm_user";
pub const CONFIRMED_AT: &str = "2024-06-01T12:00:00Z";

#[derive(Clone, Debug)]
struct FakeIdentity {
    id: String,
    email: String,
    password: String,
    confirmed_at: Option<String>,
}

#[derive(Default)]
struct FakeState {
    session: Option<Session>,
    identities: Vec<FakeIdentity>,
    profiles: Vec<Row>,
    countries: Vec<String>,
    calls: HashMap<String, usize>,
    failing: HashSet<String>,
    last_redirect: Option<String>,
    next_token: u64,
}

pub struct FakeClient {
    state: Mutex<FakeState>,
    changes: broadcast::Sender<Option<Session>>,
    rpc_delay: Option<Duration>,
}

impl Default for FakeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeClient {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(16);
        Self {
            state: Mutex::new(FakeState::default()),
            changes,
            rpc_delay: None,
        }
    }

    /// Makes every procedure call sleep before answering.
    pub fn with_rpc_delay(mut self, delay: Duration) -> Self {
        self.rpc_delay = Some(delay);
        self
    }

    pub fn with_identity(self, id: &str, email: &str, password: &str, confirmed: bool) -> Self {
        self.state.lock().identities.push(FakeIdentity {
            id: id.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirmed_at: confirmed.then(|| CONFIRMED_AT.to_string()),
        });
        self
    }

    pub fn with_profile(self, id: &str, email: &str, role: Option<&str>) -> Self {
        self.state.lock().profiles.push(row(json!({
            "id": id,
            "email": email,
            "role": role,
        })));
        self
    }

    pub fn with_country(self, name: &str) -> Self {
        self.state.lock().countries.push(name.to_string());
        self
    }

    /// Starts with `id` signed in.
    pub fn signed_in_as(self, id: &str) -> Self {
        let session = self.session_for(id);
        self.state.lock().session = Some(session);
        self
    }

    /// Makes the named operation fail, e.g. `select:countries` or `rpc:admin_confirm_user`.
    pub fn failing(self, operation: &str) -> Self {
        self.fail(operation);
        self
    }

    pub fn fail(&self, operation: &str) {
        self.state.lock().failing.insert(operation.to_string());
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.state.lock().calls.get(operation).copied().unwrap_or(0)
    }

    pub fn profile_role(&self, id: &str) -> Option<Option<String>> {
        self.state
            .lock()
            .profiles
            .iter()
            .find(|p| p.get("id").and_then(Value::as_str) == Some(id))
            .map(|p| p.get("role").and_then(Value::as_str).map(str::to_string))
    }

    pub fn identity_id(&self, email: &str) -> Option<String> {
        self.state
            .lock()
            .identities
            .iter()
            .find(|i| i.email == email)
            .map(|i| i.id.clone())
    }

    pub fn last_redirect(&self) -> Option<String> {
        self.state.lock().last_redirect.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.changes.receiver_count()
    }

    /// Builds a fresh session for a known identity.
    pub fn session_for(&self, id: &str) -> Session {
        let mut state = self.state.lock();
        state.next_token += 1;
        let email = state
            .identities
            .iter()
            .find(|i| i.id == id)
            .map(|i| i.email.clone())
            .unwrap_or_else(|| format!("{id}@example.com"));
        Session {
            access_token: format!("token-{}", state.next_token),
            user: SessionUser {
                id: id.to_string(),
                email,
            },
        }
    }

    /// Emits a session change notification, as a token refresh or an
    /// external sign-in would.
    pub fn emit(&self, session: Option<Session>) {
        self.state.lock().session = session.clone();
        let _ = self.changes.send(session);
    }

    fn record(&self, operation: &str) -> bool {
        let mut state = self.state.lock();
        *state.calls.entry(operation.to_string()).or_insert(0) += 1;
        state.failing.contains(operation)
    }
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap_or_default()
}

#[async_trait]
impl RemoteClient for FakeClient {
    async fn get_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.state.lock().session.clone())
    }

    fn on_session_change(&self) -> SessionSubscription {
        SessionSubscription::new(self.changes.subscribe())
    }

    async fn sign_in_with_password(
        &self,
        credentials: &Credentials,
    ) -> Result<Identity, AuthError> {
        if self.record("sign_in") {
            return Err(AuthError::Other("auth service unavailable".into()));
        }
        let found = self
            .state
            .lock()
            .identities
            .iter()
            .find(|i| i.email == credentials.email && i.password == credentials.password)
            .cloned();
        let identity = found.ok_or_else(|| AuthError::from_message("Invalid login credentials"))?;
        if identity.confirmed_at.is_none() {
            return Err(AuthError::from_message("Email not confirmed"));
        }
        let session = self.session_for(&identity.id);
        self.emit(Some(session));
        Ok(Identity {
            id: identity.id,
            email: identity.email,
            email_confirmed_at: None,
        })
    }

    async fn sign_up(
        &self,
        credentials: &Credentials,
        options: &SignUpOptions,
    ) -> Result<Identity, AuthError> {
        if self.record("sign_up") {
            return Err(AuthError::Other("Signups not allowed for this instance".into()));
        }
        let mut state = self.state.lock();
        state.last_redirect = options.email_redirect_to.clone();
        if state.identities.iter().any(|i| i.email == credentials.email) {
            return Err(AuthError::Other("User already registered".into()));
        }
        let id = format!("user-{}", state.identities.len() + 1);
        state.identities.push(FakeIdentity {
            id: id.clone(),
            email: credentials.email.clone(),
            password: credentials.password.clone(),
            confirmed_at: None,
        });
        Ok(Identity {
            id,
            email: credentials.email.clone(),
            email_confirmed_at: None,
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.record("sign_out") {
            return Err(AuthError::Other("sign-out failed".into()));
        }
        self.emit(None);
        Ok(())
    }

    async fn select_single(
        &self,
        table: &str,
        columns: &str,
        key: &str,
        value: &str,
    ) -> Result<Row, QueryError> {
        if self.record(&format!("select_single:{table}")) {
            return Err(QueryError::new("connection reset"));
        }
        let rows = self.table_rows(table)?;
        let mut matching: Vec<Row> = rows
            .into_iter()
            .filter(|r| r.get(key).and_then(Value::as_str) == Some(value))
            .collect();
        if matching.len() != 1 {
            return Err(QueryError::new(
                "JSON object requested, multiple (or no) rows returned",
            ));
        }
        let full = matching.remove(0);
        Ok(columns
            .split(',')
            .map(str::trim)
            .filter_map(|c| full.get(c).map(|v| (c.to_string(), v.clone())))
            .collect())
    }

    async fn select(&self, table: &str, _columns: &str) -> Result<Vec<Row>, QueryError> {
        if self.record(&format!("select:{table}")) {
            return Err(QueryError::new("permission denied"));
        }
        self.table_rows(table)
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<(), QueryError> {
        if self.record(&format!("insert:{table}")) {
            return Err(QueryError::new("new row violates row-level security policy"));
        }
        match table {
            PROFILES => {
                self.state.lock().profiles.extend(rows);
                Ok(())
            }
            other => Err(QueryError::new(format!("relation \"{other}\" does not exist"))),
        }
    }

    async fn rpc(&self, procedure: &str, args: Value) -> Result<Value, RpcError> {
        let failing = self.record(&format!("rpc:{procedure}"));
        if let Some(delay) = self.rpc_delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(RpcError::new("permission denied for function"));
        }
        let mut state = self.state.lock();
        match procedure {
            LIST_RPC => Ok(Value::Array(
                state
                    .identities
                    .iter()
                    .map(|i| {
                        json!({
                            "user_id": i.id,
                            "user_email": i.email,
                            "user_email_confirmed_at": i.confirmed_at,
                        })
                    })
                    .collect(),
            )),
            CONFIRM_RPC => {
                let user_id = args.get("user_id").and_then(Value::as_str).unwrap_or_default();
                let identity = state
                    .identities
                    .iter_mut()
                    .find(|i| i.id == user_id)
                    .ok_or_else(|| RpcError::new("user not found"))?;
                identity.confirmed_at = Some(CONFIRMED_AT.to_string());
                Ok(Value::Null)
            }
            other => Err(RpcError::new(format!("function {other} does not exist"))),
        }
    }
}

impl FakeClient {
    fn table_rows(&self, table: &str) -> Result<Vec<Row>, QueryError> {
        let state = self.state.lock();
        match table {
            PROFILES => Ok(state.profiles.clone()),
            COUNTRIES => Ok(state
                .countries
                .iter()
                .map(|name| row(json!({ "name": name })))
                .collect()),
            other => Err(QueryError::new(format!("relation \"{other}\" does not exist"))),
        }
    }
}
