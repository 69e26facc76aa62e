use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use healthsync_crypto::EncryptionKey;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub encryption_key: EncryptionKey,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub tick_interval: Duration,
    pub call_timeout: Duration,
    pub max_in_flight: Option<usize>,
    pub push_url: Option<String>,
    pub push_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let encryption_key = var("HEALTHSYNC_ENCRYPTION_KEY")
            .ok_or_else(|| {
                anyhow!("HEALTHSYNC_ENCRYPTION_KEY is unset (run `healthsync keygen` for one)")
            })
            .and_then(|v| EncryptionKey::parse(&v))
            .context("HEALTHSYNC_ENCRYPTION_KEY")?;

        let jwt_secret = var("HEALTHSYNC_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("HEALTHSYNC_JWT_SECRET is unset or still a placeholder");
        }

        let host = var("HEALTHSYNC_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("HEALTHSYNC_PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("HEALTHSYNC_PORT")?;
        let db_path: PathBuf = var("HEALTHSYNC_DB_PATH")
            .unwrap_or_else(|| "healthsync.db".into())
            .into();

        let tick_interval = Duration::from_secs(positive(&var, "HEALTHSYNC_TICK_INTERVAL_SECS")?.unwrap_or(60));
        let call_timeout = Duration::from_secs(positive(&var, "HEALTHSYNC_CALL_TIMEOUT_SECS")?.unwrap_or(5));
        let max_in_flight = positive(&var, "HEALTHSYNC_MAX_IN_FLIGHT")?.map(|n| n as usize);

        Ok(Self {
            encryption_key,
            jwt_secret,
            host,
            port,
            db_path,
            tick_interval,
            call_timeout,
            max_in_flight,
            push_url: var("HEALTHSYNC_PUSH_URL"),
            push_token: var("HEALTHSYNC_PUSH_TOKEN"),
        })
    }
}

fn positive(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>> {
    let Some(raw) = var(name) else {
        return Ok(None);
    };
    let value: u64 = raw.trim().parse().with_context(|| format!("{} must be a number", name))?;
    if value == 0 {
        bail!("{} must be greater than zero", name);
    }
    Ok(Some(value))
}
