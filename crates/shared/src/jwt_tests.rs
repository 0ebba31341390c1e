//! Unit tests for JWT claims.

#[cfg(test)]
mod tests {
    use crate::auth::{Claims, TokenPair};
    use crate::types::{SessionId, UserId};
    use chrono::{Duration, Utc};

    #[test]
    fn test_claims_new_sets_correct_fields() {
        let user_id = UserId::new();
        let session_id = SessionId::new();
        let issued_at = Utc::now();
        let expires_at = issued_at + Duration::hours(1);

        let claims = Claims::new(user_id, session_id, issued_at, expires_at);

        assert_eq!(claims.uid, user_id);
        assert_eq!(claims.sid, session_id);
        assert_eq!(claims.iat, issued_at.timestamp());
        assert_eq!(claims.exp, expires_at.timestamp());
        assert!(!claims.is_expired_at(issued_at));
        assert!(claims.is_expired_at(expires_at));
    }

    #[test]
    fn test_claims_serialize_with_short_field_names() {
        let now = Utc::now();
        let claims = Claims::new(UserId::new(), SessionId::new(), now, now);
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["uid"], claims.uid.to_string());
        assert_eq!(value["sid"], claims.sid.to_string());
        assert!(value.get("exp").is_some());
    }

    #[test]
    fn test_token_pair_uses_camel_case() {
        let pair = TokenPair::new("a".into(), "r".into());
        let value = serde_json::to_value(&pair).unwrap();

        assert_eq!(value["accessToken"], "a");
        assert_eq!(value["refreshToken"], "r");
    }
}
