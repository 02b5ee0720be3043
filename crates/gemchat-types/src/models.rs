use serde::{Deserialize, Serialize};

/// Claims carried in the payload segment of a session token.
///
/// `exp` is only present when the server runs with a token TTL; tokens
/// issued without it stay valid for as long as the signing secret does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// One line of a user's conversation log, as stored in the key-value store
/// and returned by `GET /history`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
    pub session_id: String,
    /// Unix epoch milliseconds.
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_entry_uses_camel_case_on_the_wire() {
        let entry = HistoryEntry {
            role: Role::Bot,
            text: "hi".into(),
            session_id: "s1".into(),
            timestamp: 1_700_000_000_000,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "bot",
                "text": "hi",
                "sessionId": "s1",
                "timestamp": 1_700_000_000_000i64
            })
        );
    }

    #[test]
    fn claims_without_exp_omit_the_field() {
        let claims = SessionClaims {
            id: "u1".into(),
            email: "a@x.com".into(),
            exp: None,
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert_eq!(json, r#"{"id":"u1","email":"a@x.com"}"#);

        let back: SessionClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claims);
    }
}
