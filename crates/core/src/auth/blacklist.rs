//! Revoked access tokens.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Returns the hex SHA-256 fingerprint under which a token is blacklisted.
///
/// Raw bearer values are never stored.
#[must_use]
pub fn fingerprint(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

/// A revoked access token awaiting garbage collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlacklistEntry {
    /// SHA-256 fingerprint of the token.
    pub fingerprint: String,
    /// When the entry may be swept.
    pub expires_at: DateTime<Utc>,
    /// When the token was revoked.
    pub created_at: DateTime<Utc>,
}

impl BlacklistEntry {
    /// Creates an entry for `token`.
    #[must_use]
    pub fn new(token: &str, expires_at: DateTime<Utc>, created_at: DateTime<Utc>) -> Self {
        Self {
            fingerprint: fingerprint(token),
            expires_at,
            created_at,
        }
    }

    /// Returns true once `expires_at` has passed.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let fp = fingerprint("abc");
        assert_eq!(
            fp,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(fingerprint("abc"), fp);
        assert_ne!(fingerprint("abd"), fp);
    }

    #[test]
    fn test_expiry_is_strict() {
        let now = Utc::now();
        let entry = BlacklistEntry::new("t", now, now - Duration::hours(1));

        assert!(!entry.is_expired(now));
        assert!(entry.is_expired(now + Duration::seconds(1)));
        assert!(!entry.fingerprint.contains('t'));
    }
}
