//! URL validation and normalization for registration and refresh.

use thiserror::Error;
use url::Url;

/// A URL the roster refuses to audit.
#[derive(Debug, Error)]
pub enum InvalidUrl {
    #[error("not a valid URL: {0}")]
    Parse(#[from] url::ParseError),

    #[error("unsupported URL scheme `{0}` (expected http or https)")]
    Scheme(String),
}

/// Normalize a user-supplied URL to its canonical form.
///
/// Bare hostnames get an `https://` scheme; anything that is not http(s)
/// after parsing is rejected.
pub fn normalize_url(raw: &str) -> Result<String, InvalidUrl> {
    let trimmed = raw.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        other => Err(InvalidUrl::Scheme(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_hostname_gets_https() {
        assert_eq!(normalize_url("example.com").unwrap(), "https://example.com/");
    }

    #[test]
    fn test_full_url_canonicalized() {
        assert_eq!(
            normalize_url("  https://example.com/path?q=1 ").unwrap(),
            "https://example.com/path?q=1"
        );
    }

    #[test]
    fn test_http_accepted() {
        assert_eq!(normalize_url("http://intranet/").unwrap(), "http://intranet/");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(normalize_url("http://").is_err());
        assert!(normalize_url("").is_err());
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        assert!(matches!(
            normalize_url("ftp://example.com").unwrap_err(),
            InvalidUrl::Scheme(s) if s == "ftp"
        ));
    }
}
