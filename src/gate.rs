//! Access gate: decides what may render and when protected data is fetched.
//!
//! The gate is a small state machine driven by [`transition`]:
//!
//! ```text
//! Unauthenticated --session--> Resolving --admin--> Authorized
//!                                  |
//!                                  +--user / lookup failed--> Denied
//! any --no session--> Unauthenticated
//! ```
//!
//! Every role lookup is tagged with the generation of the session change that
//! requested it. Results for an older generation are discarded, so a slow
//! lookup for a previous session can never overwrite the role of the current
//! one. Protected fetches are emitted only on the edge into `Authorized`.

use crate::client::Session;
use crate::error::ResolutionError;
use crate::model::Role;

/// What is known about the role of the current session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RoleState {
    /// No lookup has settled for this session yet.
    #[default]
    Unknown,
    Resolved(Role),
    /// The last lookup failed. Treated as not authorized.
    Failed,
}

impl RoleState {
    pub fn role(&self) -> Option<Role> {
        match self {
            RoleState::Resolved(role) => Some(*role),
            _ => None,
        }
    }
}

/// Outcome of the gate decision.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    /// No session: only the credential forms may render.
    #[default]
    Unauthenticated,
    /// Session present, role not settled yet.
    Resolving,
    /// Session present, role is not admin or could not be resolved.
    Denied,
    /// Session present and role is admin.
    Authorized,
}

/// Pure gate decision over the current session and role.
pub fn decide(session: Option<&Session>, role: &RoleState) -> Phase {
    match (session, role) {
        (None, _) => Phase::Unauthenticated,
        (Some(_), RoleState::Unknown) => Phase::Resolving,
        (Some(_), RoleState::Resolved(role)) if role.is_admin() => Phase::Authorized,
        (Some(_), _) => Phase::Denied,
    }
}

/// Session and role state owned by the gate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GateState {
    session: Option<Session>,
    role: RoleState,
    generation: u64,
    phase: Phase,
}

impl GateState {
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn role(&self) -> &RoleState {
        &self.role
    }

    /// Identifies the most recent session change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }
}

/// Inputs to the gate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateEvent {
    /// The remote client reported a new session, or none.
    SessionChanged(Option<Session>),
    /// A role lookup issued for `generation` settled.
    RoleResolved {
        generation: u64,
        outcome: Result<Role, ResolutionError>,
    },
}

/// Work requested by a transition, executed by the caller in order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    ResolveRole { generation: u64, user_id: String },
    /// Entered `Authorized`: load the roster and the country list.
    FetchProtected,
    /// Left `Authorized`: drop any protected data held for display.
    ClearProtected,
    ReportError(String),
}

/// Applies one event to the gate state.
pub fn transition(state: &GateState, event: GateEvent) -> (GateState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match event {
        GateEvent::SessionChanged(session) => {
            next.generation = state.generation.wrapping_add(1);
            match session {
                Some(session) => {
                    let same_user = state
                        .session
                        .as_ref()
                        .is_some_and(|prev| prev.user.id == session.user.id);
                    // A refresh for the same user keeps the settled role on
                    // display until the new lookup settles.
                    if !same_user {
                        next.role = RoleState::Unknown;
                    }
                    effects.push(Effect::ResolveRole {
                        generation: next.generation,
                        user_id: session.user.id.clone(),
                    });
                    next.session = Some(session);
                }
                None => {
                    next.session = None;
                    next.role = RoleState::Unknown;
                }
            }
        }
        GateEvent::RoleResolved {
            generation,
            outcome,
        } => {
            if generation != state.generation || state.session.is_none() {
                tracing::warn!(
                    generation,
                    current = state.generation,
                    "discarding role resolution for a superseded session"
                );
                return (next, effects);
            }
            match outcome {
                Ok(role) => next.role = RoleState::Resolved(role),
                Err(err) => {
                    tracing::error!(error = %err, "role resolution failed");
                    next.role = RoleState::Failed;
                    effects.push(Effect::ReportError(err.user_message()));
                }
            }
        }
    }

    next.phase = decide(next.session.as_ref(), &next.role);
    match (state.phase, next.phase) {
        (Phase::Authorized, Phase::Authorized) => {}
        (_, Phase::Authorized) => effects.push(Effect::FetchProtected),
        (Phase::Authorized, _) => effects.push(Effect::ClearProtected),
        _ => {}
    }

    (next, effects)
}
