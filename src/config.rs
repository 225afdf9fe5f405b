//! Environment configuration.
//!
//! `.env` is loaded by [`crate::run`]; this module only reads variables.

use actix_web::http::Uri;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

use crate::merge::banner::{BannerFallback, BOTTOM_BANNER_FILE, TOP_BANNER_FILE};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// Banner uploads travel base64-encoded inside JSON, so the limit is generous.
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 32 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the fallback banner files.
    pub banner_dir: PathBuf,
    pub top_banner_file: String,
    pub bottom_banner_file: String,
    /// Empty means any origin.
    pub cors_allowed_origins: Vec<String>,
    pub max_payload_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            banner_dir: PathBuf::from("."),
            top_banner_file: TOP_BANNER_FILE.to_string(),
            bottom_banner_file: BOTTOM_BANNER_FILE.to_string(),
            cors_allowed_origins: Vec::new(),
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unset keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            None => defaults.port,
        };
        let cors_allowed_origins = match var("CORS_ALLOWED_ORIGINS") {
            Some(raw) => {
                let origins = parse_origins(&raw);
                for origin in &origins {
                    validate_origin(origin).context("invalid CORS_ALLOWED_ORIGINS")?;
                }
                origins
            }
            None => defaults.cors_allowed_origins,
        };
        let max_payload_bytes = match var("MAX_PAYLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .with_context(|| format!("MAX_PAYLOAD_BYTES must be a byte count, got '{}'", raw))?,
            None => defaults.max_payload_bytes,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            banner_dir: var("BANNER_DIR").map(PathBuf::from).unwrap_or(defaults.banner_dir),
            top_banner_file: var("TOP_BANNER_FILE").unwrap_or(defaults.top_banner_file),
            bottom_banner_file: var("BOTTOM_BANNER_FILE").unwrap_or(defaults.bottom_banner_file),
            cors_allowed_origins,
            max_payload_bytes,
        })
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }

    pub fn banner_fallback(&self) -> BannerFallback {
        BannerFallback {
            top: Some(self.banner_dir.join(&self.top_banner_file)),
            bottom: Some(self.banner_dir.join(&self.bottom_banner_file)),
        }
    }
}

/// Comma-separated origins, blanks dropped.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// An origin is `scheme://host[:port]` with an http(s) scheme and nothing after.
pub fn validate_origin(origin: &str) -> Result<()> {
    if origin == "*" {
        bail!("'*' is not an origin; leave the variable unset to allow any origin");
    }
    let uri: Uri = origin
        .parse()
        .with_context(|| format!("'{}' is not a valid origin", origin))?;
    let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
    let path_ok = matches!(uri.path(), "" | "/") && !origin.ends_with('/');
    if !scheme_ok || uri.authority().is_none() || !path_ok || uri.query().is_some() {
        bail!("'{}' must look like https://example.org or http://localhost:5173", origin);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(
            config.banner_fallback().top,
            Some(PathBuf::from(".").join("upper banner.png"))
        );
    }

    #[test]
    fn test_values_are_read() {
        let config = AppConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "9000"),
            ("BANNER_DIR", "/srv/banners"),
            ("TOP_BANNER_FILE", "top.jpg"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:5173, ,https://example.org"),
            ("MAX_PAYLOAD_BYTES", "1024"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), ("127.0.0.1".to_string(), 9000));
        assert_eq!(config.cors_allowed_origins, ["http://localhost:5173", "https://example.org"]);
        assert_eq!(config.max_payload_bytes, 1024);

        let fallback = config.banner_fallback();
        assert_eq!(fallback.top, Some(PathBuf::from("/srv/banners/top.jpg")));
        assert_eq!(fallback.bottom, Some(PathBuf::from("/srv/banners/low banner.png")));
    }

    #[test]
    fn test_bad_cors_origins_are_rejected() {
        for raw in ["*", "example.org", "ftp://example.org", "https://example.org/app", "http://a b"] {
            let err = AppConfig::from_lookup(lookup(&[("CORS_ALLOWED_ORIGINS", raw)])).unwrap_err();
            assert!(format!("{:#}", err).contains("CORS_ALLOWED_ORIGINS"), "{raw}");
        }
        assert!(validate_origin("http://localhost:5173").is_ok());
        assert!(validate_origin("https://example.org").is_ok());
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
