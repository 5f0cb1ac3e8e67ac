use thiserror::Error;

use crate::claims::Claims;
use crate::roles::Role;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("authentication required")]
    Unauthenticated,
    #[error("insufficient role, required one of: {}", role_list(.required))]
    Forbidden { required: Vec<Role> },
}

fn role_list(roles: &[Role]) -> String {
    roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
}

/// Checks the caller against an allow-list. An empty list admits any
/// authenticated caller.
pub fn ensure_role(claims: Option<&Claims>, allowed: &[Role]) -> Result<(), GuardError> {
    let claims = claims.ok_or(GuardError::Unauthenticated)?;
    if allowed.is_empty() || allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(GuardError::Forbidden {
            required: allowed.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn claims(role: Role) -> Claims {
        Claims {
            subject: Uuid::new_v4(),
            role,
            expires_at: Utc::now(),
            issued_at: None,
            issuer: "eats".into(),
            audience: vec![],
        }
    }

    #[test]
    fn anonymous_is_unauthenticated() {
        assert_eq!(ensure_role(None, &[]), Err(GuardError::Unauthenticated));
    }

    #[test]
    fn empty_allow_list_admits_any_role() {
        for role in Role::ALL {
            assert!(ensure_role(Some(&claims(role)), &[]).is_ok());
        }
    }

    #[test]
    fn role_outside_list_is_forbidden() {
        let err = ensure_role(Some(&claims(Role::Client)), &[Role::Owner]).expect_err("forbidden");
        assert_eq!(err, GuardError::Forbidden { required: vec![Role::Owner] });
        assert!(err.to_string().contains("owner"));
    }
}
