use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ROLE_CLIENT: &str = "client";
pub const ROLE_OWNER: &str = "owner";
pub const ROLE_DELIVERY: &str = "delivery";

/// Side of the marketplace an account acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "graphql", derive(async_graphql::Enum))]
#[cfg_attr(feature = "graphql", graphql(name = "UserRole", rename_items = "PascalCase"))]
pub enum Role {
    Client,
    Owner,
    Delivery,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Client, Role::Owner, Role::Delivery];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => ROLE_CLIENT,
            Role::Owner => ROLE_OWNER,
            Role::Delivery => ROLE_DELIVERY,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Error)]
#[error("unknown role '{0}'")]
pub struct ParseRoleError(pub String);

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            ROLE_CLIENT => Ok(Role::Client),
            ROLE_OWNER => Ok(Role::Owner),
            ROLE_DELIVERY => Ok(Role::Delivery),
            other => Err(ParseRoleError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_case() {
        assert_eq!("Owner".parse::<Role>().unwrap(), Role::Owner);
        assert_eq!(" delivery ".parse::<Role>().unwrap(), Role::Delivery);
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn as_str_round_trips() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
    }
}
