//! Server address normalization
//!
//! Users type addresses like `192.168.1.20`, `localhost:9000` or
//! `https://lending.example.org/api`. They are turned into a base URL with a
//! scheme, a port and a trailing slash so relative endpoint paths join cleanly.

use reqwest::Url;

use crate::error::{AppError, AppResult};

/// Host the Android emulator exposes for the development machine's loopback
pub const EMULATOR_LOOPBACK_HOST: &str = "10.0.2.2";

#[derive(Debug, Clone, Copy)]
pub struct NormalizeOptions {
    pub default_port: u16,
    pub emulator_loopback: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            default_port: 8080,
            emulator_loopback: false,
        }
    }
}

pub fn normalize_base_url(input: &str, options: NormalizeOptions) -> AppResult<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidServerAddress("empty address".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme)
        .map_err(|e| AppError::InvalidServerAddress(format!("{}: {}", input.trim(), e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AppError::InvalidServerAddress(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::InvalidServerAddress(format!("{}: missing host", input.trim())))?
        .to_string();

    if options.emulator_loopback && is_loopback(&host) {
        url.set_host(Some(EMULATOR_LOOPBACK_HOST))
            .map_err(|e| AppError::InvalidServerAddress(e.to_string()))?;
    }

    // https keeps its implicit 443
    if url.scheme() == "http" && !has_explicit_port(&with_scheme) {
        url.set_port(Some(options.default_port))
            .map_err(|_| AppError::InvalidServerAddress(format!("{}: cannot set port", input.trim())))?;
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

fn is_loopback(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1"
}

/// Url drops a port equal to the scheme default, so look at the raw authority
fn has_explicit_port(raw: &str) -> bool {
    let after_scheme = raw.split_once("://").map(|(_, rest)| rest).unwrap_or(raw);
    let authority = after_scheme
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or("");
    let host_port = authority.rsplit_once('@').map(|(_, hp)| hp).unwrap_or(authority);

    if let Some(rest) = host_port.strip_prefix('[') {
        // IPv6 literal: [::1]:8080
        rest.split_once(']')
            .map(|(_, tail)| tail.starts_with(':') && tail.len() > 1)
            .unwrap_or(false)
    } else {
        host_port
            .split_once(':')
            .map(|(_, port)| !port.is_empty())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(input: &str) -> String {
        normalize_base_url(input, NormalizeOptions::default()).unwrap().to_string()
    }

    #[test]
    fn test_scheme_and_port_injection() {
        assert_eq!(normalize("192.168.1.20"), "http://192.168.1.20:8080/");
        assert_eq!(normalize("  lending.local:9000 "), "http://lending.local:9000/");
        assert_eq!(normalize("http://lending.local/api"), "http://lending.local:8080/api/");
    }

    #[test]
    fn test_explicit_default_port_is_kept() {
        assert_eq!(normalize("http://lending.local:80"), "http://lending.local/");
    }

    #[test]
    fn test_https_keeps_implicit_port() {
        assert_eq!(normalize("https://lending.example.org"), "https://lending.example.org/");
        assert_eq!(normalize("https://lending.example.org:8443/v1/"), "https://lending.example.org:8443/v1/");
    }

    #[test]
    fn test_emulator_loopback() {
        let options = NormalizeOptions {
            default_port: 8080,
            emulator_loopback: true,
        };
        assert_eq!(
            normalize_base_url("localhost", options).unwrap().as_str(),
            "http://10.0.2.2:8080/"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:3000/api", options).unwrap().as_str(),
            "http://10.0.2.2:3000/api/"
        );
        // Disabled: untouched
        assert_eq!(normalize("localhost"), "http://localhost:8080/");
    }

    #[test]
    fn test_rejects_bad_input() {
        let options = NormalizeOptions::default();
        assert!(normalize_base_url("", options).is_err());
        assert!(normalize_base_url("   ", options).is_err());
        assert!(normalize_base_url("ftp://files.local", options).is_err());
        assert!(normalize_base_url("http://", options).is_err());
    }

    #[test]
    fn test_explicit_port_detection() {
        assert!(has_explicit_port("http://host:1"));
        assert!(has_explicit_port("http://user:pw@host:1/x"));
        assert!(!has_explicit_port("http://user:pw@host/x"));
        assert!(has_explicit_port("http://[::1]:8080"));
        assert!(!has_explicit_port("http://[::1]/"));
    }
}
