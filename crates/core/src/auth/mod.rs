//! Authentication: identity resolution, password hashing, and the session
//! and token lifecycle.

mod blacklist;
mod error;
mod identity;
mod manager;
mod password;
mod session;
mod sweeper;


pub use blacklist::{BlacklistEntry, fingerprint};
pub use error::{AccessDenied, AuthError};
pub use identity::{IdentityService, RegisteredUser};
pub use manager::{
    Authenticated, DEFAULT_BLACKLIST_TTL_SECS, LoginOutcome, RefreshOutcome, SessionManager,
};
pub use password::{PasswordConfig, PasswordError, hash_password, verify_password};
pub use session::{
    Session, SessionEffect, SessionEvent, SessionState, SessionTransitionError,
};
pub use sweeper::spawn_blacklist_sweeper;
