//! Session lifecycle.
//!
//! A login lineage moves `NoSession -> Active -> (Active | Terminated)`.
//! Transitions are pure: [`SessionState::apply`] returns the next state and
//! the store effects the caller must execute.

use chrono::{DateTime, Utc};
use tally_shared::types::{SessionId, UserId};
use thiserror::Error;

/// A server-side session row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session id embedded in both tokens.
    pub id: SessionId,
    /// Owning user.
    pub user_id: UserId,
    /// When the session was opened.
    pub created_at: DateTime<Utc>,
}

/// State of one login lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing issued yet.
    NoSession,
    /// Tokens backed by this session row are honored.
    Active(SessionId),
    /// The lineage is over; its tokens are dead.
    Terminated,
}

/// Input to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials accepted.
    Login {
        /// New session id.
        session: SessionId,
        /// Authenticated user.
        user: UserId,
    },
    /// Refresh token accepted; the old row is replaced.
    Rotate {
        /// Replacement session id.
        session: SessionId,
        /// Owner resolved from the refresh token.
        user: UserId,
    },
    /// Explicit logout.
    Logout,
    /// Defensive invalidation after a failed refresh verification.
    Revoke,
}

/// Store mutation requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEffect {
    /// Insert a session row.
    Create {
        /// Session id.
        id: SessionId,
        /// Owner.
        user_id: UserId,
    },
    /// Remove a session row.
    Delete(SessionId),
}

/// Rejected transition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("cannot apply {event} to a {state} session")]
pub struct SessionTransitionError {
    /// State name.
    pub state: &'static str,
    /// Event name.
    pub event: &'static str,
}

impl SessionState {
    const fn name(self) -> &'static str {
        match self {
            Self::NoSession => "missing",
            Self::Active(_) => "active",
            Self::Terminated => "terminated",
        }
    }

    /// Applies `event`, returning the next state and the effects to run.
    pub fn apply(
        self,
        event: SessionEvent,
    ) -> Result<(Self, Vec<SessionEffect>), SessionTransitionError> {
        match (self, event) {
            (Self::NoSession, SessionEvent::Login { session, user }) => Ok((
                Self::Active(session),
                vec![SessionEffect::Create {
                    id: session,
                    user_id: user,
                }],
            )),
            (Self::Active(old), SessionEvent::Rotate { session, user }) => Ok((
                Self::Active(session),
                vec![
                    SessionEffect::Delete(old),
                    SessionEffect::Create {
                        id: session,
                        user_id: user,
                    },
                ],
            )),
            (Self::Active(old), SessionEvent::Logout | SessionEvent::Revoke) => {
                Ok((Self::Terminated, vec![SessionEffect::Delete(old)]))
            }
            (state, event) => Err(SessionTransitionError {
                state: state.name(),
                event: event.name(),
            }),
        }
    }
}

impl SessionEvent {
    const fn name(self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Rotate { .. } => "rotate",
            Self::Logout => "logout",
            Self::Revoke => "revoke",
        }
    }
}
