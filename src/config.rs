//! Service configuration, read from the environment once at startup.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, anyhow};
use url::Url;

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1";
pub const DEFAULT_GATEWAY_MODEL: &str = "google/gemini-3-flash-preview";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    /// Bearer credential for the upstream gateway. A missing key is reported
    /// per request, not at startup.
    pub gateway_api_key: Option<String>,
    pub gateway_base_url: Url,
    pub gateway_model: String,
    /// Deadline for the single upstream call. `None` leaves the transport default.
    pub gateway_timeout: Option<Duration>,
    /// Reject recipes that parse as JSON but are missing required fields.
    pub strict_schema: bool,
    pub data_dir: PathBuf,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let host = env_or("RECIPE_BIND", "0.0.0.0");
        let port = env::var("RECIPE_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let gateway_base_url = parse_gateway_url(&env_or("AI_GATEWAY_URL", DEFAULT_GATEWAY_URL))?;

        Ok(Self {
            bind_address: format!("{host}:{port}"),
            gateway_api_key: non_blank("AI_GATEWAY_API_KEY"),
            gateway_base_url,
            gateway_model: env_or("AI_GATEWAY_MODEL", DEFAULT_GATEWAY_MODEL),
            gateway_timeout: env::var("AI_GATEWAY_TIMEOUT_SECS")
                .ok()
                .and_then(|value| value.trim().parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            strict_schema: env::var("RECIPE_STRICT_SCHEMA")
                .map(|value| is_truthy(&value))
                .unwrap_or(false),
            data_dir: resolve_data_dir(),
            log_filter: env_or("RECIPE_LOG", "info"),
        })
    }

    /// A configuration suitable for tests: no credential, default gateway.
    pub fn for_gateway(base_url: Url, api_key: Option<&str>) -> Self {
        Self {
            bind_address: format!("127.0.0.1:{DEFAULT_PORT}"),
            gateway_api_key: api_key.map(str::to_string),
            gateway_base_url: base_url,
            gateway_model: DEFAULT_GATEWAY_MODEL.to_string(),
            gateway_timeout: None,
            strict_schema: false,
            data_dir: env::temp_dir().join("rex-recipes"),
            log_filter: "info".to_string(),
        }
    }
}

pub fn parse_gateway_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|err| anyhow!("invalid AI_GATEWAY_URL {trimmed:?}: {err}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        scheme => Err(anyhow!("AI_GATEWAY_URL must use http or https, got {scheme}")),
    }
}

fn resolve_data_dir() -> PathBuf {
    if let Some(dir) = non_blank("RECIPE_DATA_DIR") {
        return PathBuf::from(dir);
    }
    let mut base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push("rex-recipes");
    base
}

fn env_or(key: &str, default: &str) -> String {
    non_blank(key).unwrap_or_else(|| default.to_string())
}

fn non_blank(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_url_must_be_http() {
        assert!(parse_gateway_url("https://ai.gateway.lovable.dev/v1").is_ok());
        assert!(parse_gateway_url("  http://127.0.0.1:8080/v1 ").is_ok());
        assert!(parse_gateway_url("ftp://example.com").is_err());
        assert!(parse_gateway_url("not a url").is_err());
    }

    #[test]
    fn truthy_flags() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("yes"));
    }
}
