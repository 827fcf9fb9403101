use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use brokerdesk_core::{AppError, TenantId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct HttpRelayConfig {
    pub url: String,
    pub token: String,
    pub recipient: String,
}

#[derive(Debug, Clone)]
pub enum ContactRelayConfig {
    Console,
    Http(HttpRelayConfig),
}

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
    pub tenant_id: TenantId,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    pub storage_root: PathBuf,
    pub public_storage_url: String,
    /// File backing the demo workspace; in memory when unset.
    pub demo_storage_path: Option<PathBuf>,
    pub contact_relay: ContactRelayConfig,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let storage_root = env::var("STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./storage"));
        let public_storage_url = env::var("PUBLIC_STORAGE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{api_port}/files"));
        let demo_storage_path = optional_env("DEMO_STORAGE_PATH").map(PathBuf::from);

        let contact_relay = match env::var("CONTACT_RELAY")
            .unwrap_or_else(|_| "console".to_owned())
            .as_str()
        {
            "console" => ContactRelayConfig::Console,
            "http" => ContactRelayConfig::Http(HttpRelayConfig {
                url: required_non_empty_env("CONTACT_RELAY_URL")?,
                token: required_non_empty_env("CONTACT_RELAY_TOKEN")?,
                recipient: required_non_empty_env("CONTACT_RELAY_RECIPIENT")?,
            }),
            other => {
                return Err(AppError::Validation(format!(
                    "CONTACT_RELAY must be either 'console' or 'http', got '{other}'"
                )));
            }
        };

        let bootstrap_admin = match (
            optional_env("BOOTSTRAP_ADMIN_EMAIL"),
            optional_env("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdminConfig {
                email,
                password,
                tenant_id: parse_tenant_id(&required_non_empty_env("BOOTSTRAP_TENANT_ID")?)?,
            }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            cookie_secure,
            storage_root,
            public_storage_url,
            demo_storage_path,
            contact_relay,
            bootstrap_admin,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_tenant_id(value: &str) -> Result<TenantId, AppError> {
    uuid::Uuid::parse_str(value.trim())
        .map(TenantId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid BOOTSTRAP_TENANT_ID: {error}")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::parse_tenant_id;

    #[test]
    fn tenant_ids_must_be_uuids() {
        assert!(parse_tenant_id(" 7d3c0f52-5b1e-4c1a-9a53-0f6a2b9f4e11 ").is_ok());
        assert!(parse_tenant_id("correduria").is_err());
    }
}
