//! The admin panel: session tracking, role gate and protected data in one place.
//!
//! [`AdminPanel`] is the single owner of session and role state. Session
//! notifications and role lookups are fed through [`gate::transition`] one at
//! a time, and the resulting effects are executed in order. The UI layer
//! renders [`AdminPanel::view`] and calls the action methods.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::client::{RemoteClient, Session};
use crate::config::PanelConfig;
use crate::countries::list_countries;
use crate::credentials::{CredentialFlow, SIGN_UP_NOTICE};
use crate::error::{AuthError, COUNTRIES_MESSAGE};
use crate::gate::{self, Effect, GateEvent, GateState, Phase};
use crate::model::{Country, Role, RosterEntry};
use crate::role::RoleResolver;
use crate::roster::RosterReconciler;
use crate::session::SessionManager;

/// What the UI should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View<'a> {
    /// Sign-in / sign-up forms.
    Unauthenticated {
        error: Option<&'a str>,
        notice: Option<&'a str>,
        loading: bool,
    },
    /// Signed in, role lookup not settled yet.
    Loading { email: &'a str },
    /// Signed in without admin rights.
    AccessDenied {
        email: &'a str,
        role: Option<Role>,
        error: Option<&'a str>,
    },
    AdminDashboard {
        email: &'a str,
        error: Option<&'a str>,
        roster: &'a [RosterEntry],
        roster_error: Option<&'a str>,
        roster_busy: bool,
        countries: &'a [Country],
    },
}

pub struct AdminPanel<C: RemoteClient> {
    client: Arc<C>,
    config: Arc<PanelConfig>,
    sessions: SessionManager<C>,
    resolver: RoleResolver<C>,
    roster: RosterReconciler<C>,
    credentials: CredentialFlow<C>,
    gate: GateState,
    users: Vec<RosterEntry>,
    countries: Vec<Country>,
    error: Option<String>,
    roster_error: Option<String>,
    notice: Option<String>,
}

impl<C: RemoteClient> AdminPanel<C> {
    /// Starts session tracking and evaluates the gate for the initial session.
    pub async fn start(client: Arc<C>, config: PanelConfig) -> Result<Self, AuthError> {
        let config = Arc::new(config);
        let sessions = SessionManager::start(Arc::clone(&client)).await?;
        let initial = sessions.current_session().cloned();

        let mut panel = Self {
            resolver: RoleResolver::new(Arc::clone(&client), Arc::clone(&config)),
            roster: RosterReconciler::new(Arc::clone(&client), Arc::clone(&config)),
            credentials: CredentialFlow::new(Arc::clone(&client), Arc::clone(&config)),
            client,
            config,
            sessions,
            gate: GateState::default(),
            users: Vec::new(),
            countries: Vec::new(),
            error: None,
            roster_error: None,
            notice: None,
        };
        panel.apply(GateEvent::SessionChanged(initial)).await;
        Ok(panel)
    }

    pub fn gate(&self) -> &GateState {
        &self.gate
    }

    pub fn session(&self) -> Option<&Session> {
        self.gate.session()
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.users
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self) -> View<'_> {
        let email = self.gate.session().map(|s| s.email()).unwrap_or_default();
        match self.gate.phase() {
            Phase::Unauthenticated => View::Unauthenticated {
                error: self.error.as_deref(),
                notice: self.notice.as_deref(),
                loading: self.credentials.is_loading(),
            },
            Phase::Resolving => View::Loading { email },
            Phase::Denied => View::AccessDenied {
                email,
                role: self.gate.role().role(),
                error: self.error.as_deref(),
            },
            Phase::Authorized => View::AdminDashboard {
                email,
                error: self.error.as_deref(),
                roster: &self.users,
                roster_error: self.roster_error.as_deref(),
                roster_busy: self.roster.is_busy(),
                countries: &self.countries,
            },
        }
    }

    /// Applies every session change already delivered by the client.
    pub async fn sync(&mut self) {
        while let Some(session) = self.sessions.poll_change() {
            self.apply(GateEvent::SessionChanged(session)).await;
        }
    }

    /// Waits for the next session change and applies it.
    ///
    /// Returns `false` once the client stops emitting notifications.
    pub async fn next_change(&mut self) -> bool {
        match self.sessions.next_change().await {
            Some(session) => {
                self.apply(GateEvent::SessionChanged(session)).await;
                true
            }
            None => false,
        }
    }

    pub async fn submit_sign_in(&mut self, email: &str, password: &str) {
        self.error = None;
        self.notice = None;
        if let Err(err) = self.credentials.sign_in(email, password).await {
            self.error = Some(err.user_message());
        }
        self.sync().await;
    }

    pub async fn submit_sign_up(&mut self, email: &str, password: &str) {
        self.error = None;
        self.notice = None;
        match self.credentials.sign_up(email, password).await {
            Ok(_) => self.notice = Some(SIGN_UP_NOTICE.to_string()),
            Err(err) => self.error = Some(err.user_message()),
        }
        self.sync().await;
    }

    pub async fn sign_out(&mut self) {
        if let Err(err) = self.sessions.sign_out().await {
            tracing::error!(error = %err, "sign-out failed");
            self.error = Some(err.user_message());
        }
        self.sync().await;
    }

    /// Confirms an identity and replaces the roster with the re-read one.
    ///
    /// Ignored unless the gate currently authorizes an admin.
    pub async fn confirm_identity(&mut self, user_id: &str) {
        if self.gate.phase() != Phase::Authorized {
            tracing::warn!(user_id, "confirm requested without admin access");
            return;
        }
        match self.roster.confirm_identity(user_id).await {
            Ok(users) => {
                self.users = users;
                self.roster_error = None;
            }
            Err(err) => self.roster_error = Some(err.user_message()),
        }
    }

    async fn apply(&mut self, event: GateEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let (next, effects) = gate::transition(&self.gate, event);
            let signed_out = next.phase() == Phase::Unauthenticated
                && self.gate.phase() != Phase::Unauthenticated;
            if signed_out {
                // Banners from the ended session never reach the sign-in form.
                self.error = None;
                self.roster_error = None;
            }
            self.gate = next;
            for effect in effects {
                if let Some(follow_up) = self.run(effect).await {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    async fn run(&mut self, effect: Effect) -> Option<GateEvent> {
        match effect {
            Effect::ResolveRole {
                generation,
                user_id,
            } => {
                let outcome = self.resolver.resolve_role(&user_id).await;
                Some(GateEvent::RoleResolved {
                    generation,
                    outcome,
                })
            }
            Effect::FetchProtected => {
                self.fetch_protected().await;
                None
            }
            Effect::ClearProtected => {
                self.users.clear();
                self.countries.clear();
                self.roster_error = None;
                None
            }
            Effect::ReportError(message) => {
                self.error = Some(message);
                None
            }
        }
    }

    async fn fetch_protected(&mut self) {
        match self.roster.list_roster().await {
            Ok(users) => {
                self.users = users;
                self.roster_error = None;
            }
            Err(err) => {
                tracing::error!(error = %err, "roster fetch failed");
                self.users.clear();
                self.roster_error = Some(err.user_message());
            }
        }

        match list_countries(self.client.as_ref(), &self.config).await {
            Ok(countries) => {
                self.countries = countries;
                self.error = None;
            }
            Err(err) => {
                tracing::error!(error = %err, "country fetch failed");
                self.countries.clear();
                self.error = Some(COUNTRIES_MESSAGE.to_string());
            }
        }
    }
}
