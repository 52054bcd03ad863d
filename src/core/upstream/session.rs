//! Negotiated session state

use super::types::{AuthOutcome, Protocol};
use serde::Serialize;

/// Where the shared upstream session currently stands
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Modern { uid: i64, bearer: String },
    Legacy { uid: i64 },
    /// The credential was rejected; the next call renegotiates
    Invalidated,
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Modern { .. } => "modern_authenticated",
            SessionState::Legacy { .. } => "legacy_authenticated",
            SessionState::Invalidated => "invalidated",
        }
    }

    pub fn protocol(&self) -> Option<Protocol> {
        match self {
            SessionState::Modern { .. } => Some(Protocol::Modern),
            SessionState::Legacy { .. } => Some(Protocol::Legacy),
            _ => None,
        }
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Modern { uid, .. } => f
                .debug_struct("Modern")
                .field("uid", uid)
                .field("bearer", &"<redacted>")
                .finish(),
            SessionState::Legacy { uid } => f.debug_struct("Legacy").field("uid", uid).finish(),
            other => f.write_str(other.name()),
        }
    }
}

/// Session state plus the bookkeeping needed for safe transitions
#[derive(Debug)]
pub(crate) struct Session {
    pub(crate) state: SessionState,
    /// Set once the modern protocol reported itself unsupported; never cleared
    pub(crate) downgraded: bool,
    /// Bumped on every successful negotiation
    pub(crate) generation: u64,
}

impl Session {
    pub(crate) fn new() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            downgraded: false,
            generation: 0,
        }
    }

    /// Snapshot of an authenticated session, if there is one
    pub(crate) fn active(&self) -> Option<ActiveSession> {
        let (protocol, auth) = match &self.state {
            SessionState::Modern { uid, bearer } => (
                Protocol::Modern,
                AuthOutcome {
                    uid: *uid,
                    bearer: Some(bearer.clone()),
                },
            ),
            SessionState::Legacy { uid } => (
                Protocol::Legacy,
                AuthOutcome {
                    uid: *uid,
                    bearer: None,
                },
            ),
            SessionState::Unauthenticated | SessionState::Invalidated => return None,
        };
        Some(ActiveSession {
            protocol,
            auth,
            generation: self.generation,
        })
    }

    /// Install a freshly negotiated session
    pub(crate) fn establish(&mut self, protocol: Protocol, auth: AuthOutcome) -> ActiveSession {
        self.generation += 1;
        self.state = match (protocol, auth.bearer.clone()) {
            (Protocol::Modern, Some(bearer)) => SessionState::Modern {
                uid: auth.uid,
                bearer,
            },
            _ => SessionState::Legacy { uid: auth.uid },
        };
        ActiveSession {
            protocol: self.state.protocol().unwrap_or(Protocol::Legacy),
            auth,
            generation: self.generation,
        }
    }

    /// Invalidate only if no other caller has renegotiated since `generation`
    pub(crate) fn invalidate(&mut self, generation: u64) -> bool {
        if self.generation == generation && self.active().is_some() {
            self.state = SessionState::Invalidated;
            return true;
        }
        false
    }

    /// Permanently stop using the modern protocol
    pub(crate) fn downgrade(&mut self) -> bool {
        let first = !self.downgraded;
        self.downgraded = true;
        if matches!(self.state, SessionState::Modern { .. }) {
            self.state = SessionState::Invalidated;
        }
        first
    }
}

/// Authenticated session as seen by one in-flight call
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    pub(crate) protocol: Protocol,
    pub(crate) auth: AuthOutcome,
    pub(crate) generation: u64,
}

/// Read-only view of the session for health reporting
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub state: &'static str,
    pub protocol: Option<Protocol>,
    pub downgraded: bool,
}

impl From<&Session> for SessionSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            state: session.state.name(),
            protocol: session.state.protocol(),
            downgraded: session.downgraded,
        }
    }
}
