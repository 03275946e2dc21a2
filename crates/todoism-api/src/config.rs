use std::env;
use std::path::PathBuf;

use anyhow::bail;

/// Largest page size accepted for item collections.
pub const MAX_ITEMS_PER_PAGE: i64 = 1000;

/// Secrets that are fine for local development and nothing else.
pub const PLACEHOLDER_SECRETS: &[&str] = &["secret string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,

    /// HMAC key for bearer tokens
    pub secret_key: String,

    /// Token lifetime in seconds
    pub token_ttl: i64,

    /// Page size of every item collection
    pub items_per_page: i64,

    /// Scheme and authority used for absolute links, e.g. `http://localhost:5000`
    pub public_url: String,

    /// Locales a user may pick at registration
    pub locales: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 5000,
            db_path: "todoism.db".into(),
            secret_key: "dev-secret-change-me".into(),
            token_ttl: 3600,
            items_per_page: 20,
            public_url: "http://localhost:5000".into(),
            locales: vec!["en_US".into(), "zh_Hans_CN".into()],
        }
    }
}

impl Config {
    /// Reads `TODOISM_*` variables, falling back to the defaults above.
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let port: u16 = env::var("TODOISM_PORT")
            .unwrap_or_else(|_| defaults.port.to_string())
            .parse()?;

        let token_ttl: i64 = env::var("TODOISM_TOKEN_TTL")
            .unwrap_or_else(|_| defaults.token_ttl.to_string())
            .parse()?;

        let items_per_page: i64 = env::var("TODOISM_ITEMS_PER_PAGE")
            .unwrap_or_else(|_| defaults.items_per_page.to_string())
            .parse()?;

        let public_url = env::var("TODOISM_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let locales = env::var("TODOISM_LOCALES")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .unwrap_or(defaults.locales);

        let config = Self {
            host: env::var("TODOISM_HOST").unwrap_or(defaults.host),
            port,
            db_path: env::var("TODOISM_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            secret_key: env::var("TODOISM_SECRET_KEY").unwrap_or(defaults.secret_key),
            token_ttl,
            items_per_page,
            public_url,
            locales,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the server cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.token_ttl <= 0 {
            bail!("TODOISM_TOKEN_TTL must be positive, got {}", self.token_ttl);
        }
        if !(1..=MAX_ITEMS_PER_PAGE).contains(&self.items_per_page) {
            bail!(
                "TODOISM_ITEMS_PER_PAGE must be between 1 and {}, got {}",
                MAX_ITEMS_PER_PAGE,
                self.items_per_page
            );
        }
        Ok(())
    }

    pub fn uses_placeholder_secret(&self) -> bool {
        self.secret_key.is_empty() || PLACEHOLDER_SECRETS.contains(&self.secret_key.as_str())
    }
}
