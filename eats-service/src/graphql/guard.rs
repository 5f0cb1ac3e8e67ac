use async_graphql::{Context, Error, ErrorExtensions, Guard, Result};
use common_auth::{ensure_role, parse_bearer, Claims, JwtVerifier, Role};
use serde_json::Value;
use tracing::debug;

use crate::context::{AppContext, Caller};

/// Claims of the request, `None` when anonymous.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<Claims>);

impl Viewer {
    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn caller(&self) -> Option<Caller> {
        self.0.as_ref().map(Caller::from)
    }
}

pub fn forbidden() -> Error {
    Error::new("Forbidden").extend_with(|_, ext| ext.set("code", "FORBIDDEN"))
}

/// Restricts a field to callers holding one of `allowed`; an empty list admits any
/// authenticated caller.
pub struct RoleGuard {
    allowed: &'static [Role],
}

impl RoleGuard {
    pub fn new(allowed: &'static [Role]) -> Self {
        Self { allowed }
    }

    pub fn any() -> Self {
        Self { allowed: &[] }
    }
}

impl Guard for RoleGuard {
    async fn check(&self, ctx: &Context<'_>) -> Result<()> {
        let claims = ctx.data_opt::<Viewer>().and_then(|viewer| viewer.0.as_ref());
        ensure_role(claims, self.allowed).map_err(|err| {
            debug!(error = %err, "guard rejected field access");
            forbidden()
        })
    }
}

pub fn app_context<'a>(ctx: &Context<'a>) -> Result<&'a AppContext> {
    ctx.data::<AppContext>()
}

/// Caller of a guarded field.
pub fn caller(ctx: &Context<'_>) -> Result<Caller> {
    ctx.data_opt::<Viewer>()
        .and_then(Viewer::caller)
        .ok_or_else(forbidden)
}

/// Verifies the token carried in a websocket `connection_init` payload.
pub fn viewer_from_init_payload(verifier: &JwtVerifier, payload: &Value) -> Viewer {
    let Some(raw) = token_from_init_payload(payload) else {
        return Viewer::anonymous();
    };
    match parse_bearer(raw).and_then(|token| verifier.verify(&token)) {
        Ok(claims) => Viewer(Some(claims)),
        Err(err) => {
            debug!(error = %err, "ignoring invalid subscription token");
            Viewer::anonymous()
        }
    }
}

fn token_from_init_payload(payload: &Value) -> Option<&str> {
    let object = payload.as_object()?;
    ["Authorization", "authorization", "x-jwt", "X-JWT"]
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common_auth::{JwtConfig, JwtSigner};
    use serde_json::json;
    use uuid::Uuid;

    const SECRET: &str = "guard-secret";

    fn verifier() -> JwtVerifier {
        JwtVerifier::from_secret(JwtConfig::new("eats", "eats-clients"), SECRET).unwrap()
    }

    fn token(role: Role) -> (Uuid, String) {
        let signer = JwtSigner::from_secret(JwtConfig::new("eats", "eats-clients"), SECRET).unwrap();
        let id = Uuid::new_v4();
        (id, signer.sign(id, role).unwrap())
    }

    #[test]
    fn init_payload_accepts_authorization_with_prefix() {
        let (id, token) = token(Role::Owner);
        let viewer = viewer_from_init_payload(&verifier(), &json!({ "Authorization": format!("Bearer {token}") }));
        assert_eq!(viewer.caller(), Some(Caller::new(id, Role::Owner)));
    }

    #[test]
    fn init_payload_accepts_x_jwt() {
        let (id, token) = token(Role::Delivery);
        let viewer = viewer_from_init_payload(&verifier(), &json!({ "x-jwt": token }));
        assert_eq!(viewer.caller(), Some(Caller::new(id, Role::Delivery)));
    }

    #[test]
    fn bad_or_missing_tokens_are_anonymous() {
        assert!(viewer_from_init_payload(&verifier(), &json!({})).0.is_none());
        assert!(viewer_from_init_payload(&verifier(), &Value::Null).0.is_none());
        assert!(viewer_from_init_payload(&verifier(), &json!({ "x-jwt": "garbage" })).0.is_none());
    }
}
