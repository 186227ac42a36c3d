use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use rolegate_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

const MIN_INTERNAL_TOKEN_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub service_directory_url: Url,
    pub user_directory_url: Url,
    pub api_token: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub database_max_connections: u32,
    pub api_host: String,
    pub api_port: u16,
    pub internal_api_token: String,
    pub directories: DirectoryConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let database_url = required("DATABASE_URL")?;
        let database_max_connections =
            parse_or_default(&lookup, "DATABASE_MAX_CONNECTIONS", 10_u32)?;
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = parse_or_default(&lookup, "API_PORT", 3002_u16)?;

        // The migrate subcommand only needs the database.
        if migrate_only {
            return Ok(Self {
                migrate_only,
                database_url,
                database_max_connections,
                api_host,
                api_port,
                internal_api_token: String::new(),
                directories: DirectoryConfig {
                    service_directory_url: placeholder_url()?,
                    user_directory_url: placeholder_url()?,
                    api_token: None,
                    timeout: Duration::from_millis(3000),
                },
            });
        }

        let internal_api_token = required("INTERNAL_API_TOKEN")?;
        if internal_api_token.len() < MIN_INTERNAL_TOKEN_LENGTH {
            return Err(AppError::Validation(format!(
                "INTERNAL_API_TOKEN must be at least {MIN_INTERNAL_TOKEN_LENGTH} characters"
            )));
        }

        let service_directory_url = parse_url(
            "SERVICE_DIRECTORY_URL",
            &required("SERVICE_DIRECTORY_URL")?,
        )?;
        let user_directory_url =
            parse_url("USER_DIRECTORY_URL", &required("USER_DIRECTORY_URL")?)?;
        let api_token = lookup("DIRECTORY_API_TOKEN").filter(|value| !value.trim().is_empty());
        let timeout_ms = parse_or_default(&lookup, "DIRECTORY_TIMEOUT_MS", 3000_u64)?;
        if timeout_ms == 0 {
            return Err(AppError::Validation(
                "DIRECTORY_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            database_url,
            database_max_connections,
            api_host,
            api_port,
            internal_api_token,
            directories: DirectoryConfig {
                service_directory_url,
                user_directory_url,
                api_token,
                timeout: Duration::from_millis(timeout_ms),
            },
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

fn parse_or_default<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name).filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url, AppError> {
    let url = Url::parse(value.trim())
        .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AppError::Validation(format!(
            "{name} must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(url)
}

fn placeholder_url() -> Result<Url, AppError> {
    Url::parse("http://localhost/")
        .map_err(|error| AppError::Internal(format!("invalid placeholder url: {error}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use rolegate_core::AppError;

    use super::ApiConfig;

    fn lookup(values: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name| values.get(name).cloned()
    }

    const COMPLETE: [(&str, &str); 4] = [
        ("DATABASE_URL", "postgres://rolegate@localhost/rolegate"),
        ("INTERNAL_API_TOKEN", "0123456789abcdef0123456789abcdef"),
        ("SERVICE_DIRECTORY_URL", "http://portal.internal/api"),
        ("USER_DIRECTORY_URL", "https://identity.internal"),
    ];

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let Ok(config) = ApiConfig::from_lookup(false, lookup(&COMPLETE)) else {
            panic!("complete configuration should load");
        };

        assert_eq!(config.api_host, "127.0.0.1");
        assert_eq!(config.api_port, 3002);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.directories.timeout, Duration::from_millis(3000));
        assert_eq!(config.directories.api_token, None);
        assert_eq!(
            config.socket_address().ok().map(|address| address.port()),
            Some(3002)
        );
    }

    #[test]
    fn short_internal_token_is_rejected() {
        let mut values = COMPLETE.to_vec();
        values[1] = ("INTERNAL_API_TOKEN", "short");

        let result = ApiConfig::from_lookup(false, lookup(&values));

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn directory_urls_must_be_http() {
        let mut values = COMPLETE.to_vec();
        values[2] = ("SERVICE_DIRECTORY_URL", "ftp://portal.internal");

        let result = ApiConfig::from_lookup(false, lookup(&values));

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn migrate_only_needs_just_the_database() {
        let config = ApiConfig::from_lookup(
            true,
            lookup(&[("DATABASE_URL", "postgres://localhost/rolegate")]),
        );

        assert!(config.is_ok_and(|config| config.migrate_only));
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let mut values = COMPLETE.to_vec();
        values.push(("DIRECTORY_TIMEOUT_MS", "soon"));

        let result = ApiConfig::from_lookup(false, lookup(&values));

        assert!(matches!(
            result,
            Err(AppError::Validation(message)) if message.contains("DIRECTORY_TIMEOUT_MS")
        ));
    }
}
