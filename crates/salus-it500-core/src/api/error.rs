use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(reqwest::Error),

    #[error("HTTP {status} from {url}: {body}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
        body: String,
    },

    #[error("Session token not found in control page for device {0}")]
    TokenNotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Temperature {value} out of range ({min}..={max})")]
    TemperatureOutOfRange { value: f64, min: f64, max: f64 },

    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ApiError>,
    },
}

// Request URLs carry the session token in their query string.
impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::NetworkError(e.without_url())
    }
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Build a status error. The query string is dropped from `url`.
    pub fn from_status(status: reqwest::StatusCode, url: &reqwest::Url, body: &str) -> Self {
        let mut url = url.clone();
        url.set_query(None);
        ApiError::Status {
            status,
            url: url.to_string(),
            body: Self::truncate_body(body),
        }
    }

    /// The error that ended a retry loop, or `self` for single failures.
    pub fn root(&self) -> &ApiError {
        match self {
            ApiError::RetriesExhausted { last, .. } => last.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_body() {
        let short = "login failed";
        assert_eq!(ApiError::truncate_body(short), short);

        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.ends_with("(truncated, 520 total bytes)"));
    }

    #[test]
    fn test_truncate_body_respects_char_boundary() {
        let body = format!("{}°C", "a".repeat(MAX_ERROR_BODY_LENGTH - 1));
        // '°' is two bytes and straddles the cut
        let truncated = ApiError::truncate_body(&body);
        assert!(truncated.starts_with(&"a".repeat(MAX_ERROR_BODY_LENGTH - 1)));
        assert!(!truncated.contains('°'));
    }

    #[test]
    fn test_from_status_drops_query() {
        let url = reqwest::Url::parse(
            "https://salus-it500.com/public/ajax_device_values.php?devId=1&token=abc123&_=1",
        )
        .unwrap();
        let err = ApiError::from_status(reqwest::StatusCode::BAD_GATEWAY, &url, "down");
        let text = err.to_string();
        assert!(text.contains("/public/ajax_device_values.php"));
        assert!(!text.contains("abc123"));
        assert!(!text.contains('?'));
    }

    #[test]
    fn test_root_unwraps_retries() {
        let err = ApiError::RetriesExhausted {
            attempts: 11,
            last: Box::new(ApiError::TokenNotFound("12345".into())),
        };
        assert!(matches!(err.root(), ApiError::TokenNotFound(id) if id == "12345"));
        assert_eq!(
            err.to_string(),
            "Giving up after 11 attempts: Session token not found in control page for device 12345"
        );
    }
}
