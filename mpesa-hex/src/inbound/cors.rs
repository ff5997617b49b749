//! Cross-origin policy for the browser front-end.

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Origin of the registration page that calls the relay from the browser.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "https://augustine59-wangombe.github.io";

/// Rejected `ALLOWED_ORIGINS` entries.
#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("wildcard origin `*` is not supported; list each allowed origin")]
    Wildcard,

    #[error("invalid origin: {0:?}")]
    Invalid(String),
}

/// Parses a comma-separated origin list, skipping blanks.
pub fn parse_origins(raw: &str) -> Result<Vec<HeaderValue>, OriginError> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(|o| {
            if o == "*" {
                return Err(OriginError::Wildcard);
            }
            HeaderValue::from_str(o).map_err(|_| OriginError::Invalid(o.to_string()))
        })
        .collect()
}

/// Builds the CORS layer. Preflight requests are answered here and never
/// reach a handler.
///
/// A `*` entry is dropped: the policy is always an explicit list.
pub fn cors_layer(origins: Vec<HeaderValue>) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .into_iter()
        .filter(|o| {
            let wildcard = o.as_bytes() == b"*";
            if wildcard {
                tracing::warn!("Ignoring wildcard CORS origin");
            }
            !wildcard
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins(" https://a.example , ,https://b.example").unwrap();
        assert_eq!(origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_parse_origins_rejects_control_chars() {
        assert!(parse_origins("https://a.example\n").is_ok());
        assert!(matches!(
            parse_origins("https://bad\u{7f}.example"),
            Err(OriginError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_origins_rejects_wildcard() {
        assert!(matches!(parse_origins("*"), Err(OriginError::Wildcard)));
        assert!(matches!(
            parse_origins("https://a.example, *"),
            Err(OriginError::Wildcard)
        ));
    }

    #[test]
    fn test_cors_layer_drops_wildcard_instead_of_panicking() {
        let _layer = cors_layer(vec![
            HeaderValue::from_static("*"),
            HeaderValue::from_static("https://a.example"),
        ]);
    }
}
