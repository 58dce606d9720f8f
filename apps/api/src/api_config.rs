use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use roleward_application::{AuthMode, DEFAULT_SESSION_STORAGE_KEY, SessionConfig};
use roleward_core::AppError;
use tracing_subscriber::EnvFilter;

const PRODUCTION_ENVIRONMENT: &str = "production";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreConfig {
    Memory,
    Redis { redis_url: String, ttl_seconds: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleStoreConfig {
    Memory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub environment: String,
    pub allow_demo_login: bool,
    pub session_store: SessionStoreConfig,
    pub session_storage_key: String,
    pub session_cookie_secure: bool,
    pub role_store: RoleStoreConfig,
    pub admin_credentials_file: Option<PathBuf>,
    pub seed_principals_file: Option<PathBuf>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let environment =
            env::var("ROLEWARD_ENV").unwrap_or_else(|_| PRODUCTION_ENVIRONMENT.to_owned());
        let allow_demo_login = parse_flag(env::var("ALLOW_DEMO_LOGIN").ok().as_deref())?;

        let session_store = match env::var("SESSION_STORE")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => SessionStoreConfig::Memory,
            "redis" => {
                let ttl_seconds = env::var("SESSION_TTL_SECONDS")
                    .ok()
                    .map(|value| {
                        value.parse::<u64>().map_err(|error| {
                            AppError::Validation(format!("invalid SESSION_TTL_SECONDS: {error}"))
                        })
                    })
                    .transpose()?
                    .unwrap_or(8 * 60 * 60);
                SessionStoreConfig::Redis {
                    redis_url: required_non_empty_env("REDIS_URL")?,
                    ttl_seconds,
                }
            }
            other => {
                return Err(AppError::Validation(format!(
                    "SESSION_STORE must be either 'memory' or 'redis', got '{other}'"
                )));
            }
        };

        let session_storage_key = env::var("SESSION_STORAGE_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_STORAGE_KEY.to_owned());

        let session_cookie_secure =
            parse_flag(env::var("SESSION_COOKIE_SECURE").ok().as_deref())?;

        let role_store = match env::var("ROLE_STORE")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => RoleStoreConfig::Memory,
            "postgres" => RoleStoreConfig::Postgres {
                database_url: required_non_empty_env("DATABASE_URL")?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "ROLE_STORE must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        Ok(Self {
            migrate_only,
            frontend_url,
            api_host,
            api_port,
            environment,
            allow_demo_login,
            session_store,
            session_storage_key,
            session_cookie_secure,
            role_store,
            admin_credentials_file: optional_path_env("ADMIN_CREDENTIALS_FILE"),
            seed_principals_file: optional_path_env("SEED_PRINCIPALS_FILE"),
        })
    }

    pub fn is_production_environment(&self) -> bool {
        is_production_environment(self.environment.as_str())
    }

    pub fn auth_mode(&self) -> AuthMode {
        AuthMode::from_flags(self.is_production_environment(), self.allow_demo_login)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            mode: self.auth_mode(),
            storage_key: self.session_storage_key.clone(),
        }
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

fn is_production_environment(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case(PRODUCTION_ENVIRONMENT)
}

fn parse_flag(value: Option<&str>) -> Result<bool, AppError> {
    match value.map(str::trim) {
        None | Some("") => Ok(false),
        Some(value) if value.eq_ignore_ascii_case("true") || value == "1" => Ok(true),
        Some(value) if value.eq_ignore_ascii_case("false") || value == "0" => Ok(false),
        Some(value) => Err(AppError::Validation(format!(
            "expected a boolean flag, got '{value}'"
        ))),
    }
}

fn optional_path_env(name: &str) -> Option<PathBuf> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
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
    use roleward_application::AuthMode;
    use roleward_core::AppError;

    use super::{is_production_environment, parse_flag};

    #[test]
    fn flags_accept_common_spellings() {
        assert!(matches!(parse_flag(None), Ok(false)));
        assert!(matches!(parse_flag(Some("TRUE")), Ok(true)));
        assert!(matches!(parse_flag(Some("1")), Ok(true)));
        assert!(matches!(parse_flag(Some(" false ")), Ok(false)));
        assert!(matches!(
            parse_flag(Some("sometimes")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn production_is_matched_case_insensitively() {
        assert!(is_production_environment("production"));
        assert!(is_production_environment(" Production"));
        assert!(!is_production_environment("staging"));
    }

    #[test]
    fn demo_flag_is_ignored_in_production() {
        assert_eq!(
            AuthMode::from_flags(is_production_environment("production"), true),
            AuthMode::Production
        );
        assert_eq!(
            AuthMode::from_flags(is_production_environment("development"), true),
            AuthMode::Demo
        );
    }
}
