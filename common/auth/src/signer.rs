use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

use crate::claims::{AudienceRepr, ClaimsRepr};
use crate::config::JwtConfig;
use crate::error::{AuthError, AuthResult};
use crate::roles::Role;

/// Issues HS256 tokens for authenticated accounts.
#[derive(Clone)]
pub struct JwtSigner {
    config: JwtConfig,
    key: EncodingKey,
}

impl JwtSigner {
    pub fn from_secret(config: JwtConfig, secret: &str) -> AuthResult<Self> {
        if secret.trim().is_empty() {
            return Err(AuthError::EmptySecret);
        }
        Ok(Self {
            config,
            key: EncodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn sign(&self, subject: Uuid, role: Role) -> AuthResult<String> {
        let issued_at = Utc::now().timestamp();
        let repr = ClaimsRepr {
            sub: subject.to_string(),
            role: role.as_str().to_string(),
            exp: issued_at + self.config.ttl_seconds,
            iat: Some(issued_at),
            iss: self.config.issuer.clone(),
            aud: Some(AudienceRepr::Single(self.config.audience.clone())),
        };

        encode(&Header::new(Algorithm::HS256), &repr, &self.key)
            .map_err(|err| AuthError::Signing(err.to_string()))
    }
}
