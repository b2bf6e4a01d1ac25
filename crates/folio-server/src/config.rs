use std::path::PathBuf;

use anyhow::{Context, Result};
use folio_api::config::ModerationConfig;

const DEFAULT_DEV_CLIENT_ORIGIN: &str = "http://localhost:5173";

/// Process configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub production: bool,
    pub dev_client_origin: String,
    pub moderation: ModerationConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = lookup("FOLIO_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("FOLIO_PORT")
            .unwrap_or_else(|| "5174".into())
            .parse()
            .context("FOLIO_PORT must be a port number")?;
        let data_dir: PathBuf = lookup("FOLIO_DATA_DIR")
            .unwrap_or_else(|| "data".into())
            .into();
        let production = lookup("FOLIO_ENV").is_some_and(|v| v.eq_ignore_ascii_case("production"));
        let dev_client_origin =
            lookup("FOLIO_DEV_CLIENT_ORIGIN").unwrap_or_else(|| DEFAULT_DEV_CLIENT_ORIGIN.into());

        let trust_proxy = match lookup("FOLIO_TRUST_PROXY") {
            None => true,
            Some(v) => parse_bool(&v).context("FOLIO_TRUST_PROXY must be true or false")?,
        };
        let moderation =
            ModerationConfig::new(lookup("FOLIO_ADMIN_KEY"), lookup("FOLIO_IP_HASH_SALT"))
                .with_trust_proxy(trust_proxy);

        Ok(Self {
            host,
            port,
            data_dir,
            production,
            dev_client_origin,
            moderation,
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("folio.db")
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
