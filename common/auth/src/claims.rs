use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

/// Application-focused representation of verified JWT claims.
#[derive(Debug, Clone, Serialize)]
pub struct Claims {
    pub subject: Uuid,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    pub issuer: String,
    pub audience: Vec<String>,
}

/// Wire shape of the token payload, shared by the signer and the verifier.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ClaimsRepr {
    pub sub: String,
    pub role: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<AudienceRepr>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum AudienceRepr {
    Single(String),
    Many(Vec<String>),
}

impl TryFrom<ClaimsRepr> for Claims {
    type Error = AuthError;

    fn try_from(value: ClaimsRepr) -> AuthResult<Self> {
        let subject = Uuid::parse_str(&value.sub)
            .map_err(|_| AuthError::InvalidClaim("sub", value.sub.clone()))?;
        let role = value
            .role
            .parse::<Role>()
            .map_err(|_| AuthError::InvalidClaim("role", value.role.clone()))?;

        let expires_at = Utc
            .timestamp_opt(value.exp, 0)
            .single()
            .ok_or_else(|| AuthError::InvalidClaim("exp", value.exp.to_string()))?;

        let issued_at = match value.iat {
            Some(iat) => Some(
                Utc.timestamp_opt(iat, 0)
                    .single()
                    .ok_or_else(|| AuthError::InvalidClaim("iat", iat.to_string()))?,
            ),
            None => None,
        };

        let audience = match value.aud {
            Some(AudienceRepr::Single(item)) => vec![item],
            Some(AudienceRepr::Many(items)) => items,
            None => Vec::new(),
        };

        Ok(Self {
            subject,
            role,
            expires_at,
            issued_at,
            issuer: value.iss,
            audience,
        })
    }
}

impl TryFrom<serde_json::Value> for Claims {
    type Error = AuthError;

    fn try_from(value: serde_json::Value) -> AuthResult<Self> {
        let repr: ClaimsRepr =
            serde_json::from_value(value).map_err(|err| AuthError::InvalidJson(err.to_string()))?;
        Claims::try_from(repr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_single_audience() {
        let subject = Uuid::new_v4();
        let claims = Claims::try_from(json!({
            "sub": subject.to_string(),
            "role": "owner",
            "exp": 4_102_444_800i64,
            "iss": "eats",
            "aud": "eats-clients"
        }))
        .expect("claims");
        assert_eq!(claims.subject, subject);
        assert_eq!(claims.role, Role::Owner);
        assert_eq!(claims.audience, vec!["eats-clients".to_string()]);
        assert!(claims.issued_at.is_none());
    }

    #[test]
    fn rejects_unknown_role() {
        let err = Claims::try_from(json!({
            "sub": Uuid::new_v4().to_string(),
            "role": "admin",
            "exp": 4_102_444_800i64,
            "iss": "eats"
        }))
        .expect_err("unknown role");
        assert!(matches!(err, AuthError::InvalidClaim("role", _)));
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let err = Claims::try_from(json!({
            "sub": "42",
            "role": "client",
            "exp": 4_102_444_800i64,
            "iss": "eats"
        }))
        .expect_err("bad subject");
        assert!(matches!(err, AuthError::InvalidClaim("sub", _)));
    }
}
