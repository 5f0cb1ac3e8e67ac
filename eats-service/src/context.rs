use std::sync::Arc;

use common_auth::{Claims, JwtSigner, Role};
use sqlx::PgPool;
use uuid::Uuid;

use crate::email::EmailSender;
use crate::metrics::ServiceMetrics;
use crate::pubsub::PubSub;

/// Shared handles every resolver and background task works with.
#[derive(Clone)]
pub struct AppContext {
    pub db: PgPool,
    pub pubsub: PubSub,
    pub signer: Arc<JwtSigner>,
    pub mailer: Arc<dyn EmailSender>,
    pub metrics: ServiceMetrics,
}

/// Authenticated account on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}

impl From<&Claims> for Caller {
    fn from(claims: &Claims) -> Self {
        Self {
            id: claims.subject,
            role: claims.role,
        }
    }
}
