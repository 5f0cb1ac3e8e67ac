pub mod claims;
pub mod config;
pub mod error;
pub mod extractors;
pub mod guards;
pub mod roles;
pub mod signer;
pub mod verifier;

pub use claims::Claims;
pub use config::JwtConfig;
pub use error::{AuthError, AuthResult};
pub use extractors::{bearer_from_headers, parse_bearer, AuthContext};
pub use guards::{ensure_role, GuardError};
pub use roles::{ParseRoleError, Role, ROLE_CLIENT, ROLE_DELIVERY, ROLE_OWNER};
pub use signer::JwtSigner;
pub use verifier::JwtVerifier;
