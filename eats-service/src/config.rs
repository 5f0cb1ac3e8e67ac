use anyhow::{anyhow, Context, Result};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use common_auth::JwtConfig;

#[derive(Debug, Clone)]
pub struct MailgunConfig {
    pub api_key: String,
    pub domain: String,
    pub from_email: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub bucket: String,
    pub region: String,
    /// Overrides the AWS endpoint for S3-compatible stores.
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub jwt: JwtConfig,
    pub jwt_secret: String,
    pub cors_allowed_origins: Vec<String>,
    pub promotion_sweep_interval: Duration,
    pub graphiql_enabled: bool,
    pub mailgun: Option<MailgunConfig>,
    pub uploads: Option<UploadConfig>,
}

pub fn load_service_config() -> Result<ServiceConfig> {
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    if jwt_secret.trim().is_empty() {
        return Err(anyhow!("JWT_SECRET must not be empty"));
    }

    let db_max_connections = parse_from_env("DB_MAX_CONNECTIONS")?.unwrap_or(10);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = parse_from_env("PORT")?.unwrap_or(4000);
    let ip: IpAddr = host
        .parse()
        .with_context(|| format!("HOST '{host}' is not a valid IP address"))?;
    let bind_addr = SocketAddr::from((ip, port));

    let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "eats".to_string());
    let audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| "eats-clients".to_string());
    let mut jwt = JwtConfig::new(issuer, audience);
    if let Some(leeway) = parse_from_env::<u32>("JWT_LEEWAY_SECONDS")? {
        jwt = jwt.with_leeway(leeway);
    }
    if let Some(ttl) = parse_from_env::<i64>("JWT_TTL_SECONDS")? {
        if ttl <= 0 {
            return Err(anyhow!("JWT_TTL_SECONDS must be positive"));
        }
        jwt = jwt.with_ttl(ttl);
    }

    let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
        .ok()
        .map(|value| parse_list(&value))
        .filter(|origins| !origins.is_empty())
        .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]);

    let sweep_secs: u64 = parse_from_env("PROMOTION_SWEEP_SECONDS")?.unwrap_or(50);
    let promotion_sweep_interval = Duration::from_secs(sweep_secs.max(1));

    let graphiql_enabled = bool_from_env("GRAPHIQL_ENABLED").unwrap_or(true);

    Ok(ServiceConfig {
        database_url,
        db_max_connections,
        bind_addr,
        jwt,
        jwt_secret,
        cors_allowed_origins,
        promotion_sweep_interval,
        graphiql_enabled,
        mailgun: load_mailgun_config(),
        uploads: load_upload_config(),
    })
}

fn load_mailgun_config() -> Option<MailgunConfig> {
    let api_key = optional_env("MAILGUN_API_KEY")?;
    let domain = optional_env("MAILGUN_DOMAIN")?;
    let from_email = optional_env("MAILGUN_FROM_EMAIL").unwrap_or_else(|| format!("Eats <mailgun@{domain}>"));
    let base_url = optional_env("MAILGUN_BASE_URL")
        .unwrap_or_else(|| "https://api.mailgun.net".to_string());
    Some(MailgunConfig {
        api_key,
        domain,
        from_email,
        base_url: base_url.trim_end_matches('/').to_string(),
    })
}

fn load_upload_config() -> Option<UploadConfig> {
    Some(UploadConfig {
        bucket: optional_env("UPLOAD_BUCKET")?,
        region: optional_env("UPLOAD_REGION").unwrap_or_else(|| "us-east-1".to_string()),
        endpoint: optional_env("UPLOAD_ENDPOINT").map(|value| value.trim_end_matches('/').to_string()),
        access_key_id: optional_env("AWS_ACCESS_KEY_ID")?,
        secret_access_key: optional_env("AWS_SECRET_ACCESS_KEY")?,
    })
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| normalize_optional(&value))
}

fn parse_from_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|err| anyhow!("Failed to parse {key}='{value}': {err}")),
        None => Ok(None),
    }
}

fn bool_from_env(key: &str) -> Option<bool> {
    env::var(key).ok().map(|value| parse_bool(&value))
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(normalize_optional)
        .collect()
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_accepts_common_truthy_values() {
        for raw in ["1", "true", "YES", " on "] {
            assert!(parse_bool(raw), "{raw} should be truthy");
        }
        for raw in ["0", "false", "off", ""] {
            assert!(!parse_bool(raw), "{raw} should be falsy");
        }
    }

    #[test]
    fn parse_list_trims_and_drops_empty_entries() {
        assert_eq!(
            parse_list(" http://a.test , ,http://b.test"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn normalize_optional_treats_blank_as_missing() {
        assert_eq!(normalize_optional("   "), None);
        assert_eq!(normalize_optional(" key "), Some("key".to_string()));
    }
}
