//! API error types.

/// Errors from talking to the backend.
///
/// Timeouts are deliberately separate from HTTP errors: a slow analysis job
/// and a rejected request call for different handling upstream.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The request exceeded the client-side time budget.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-success status.
    #[error("server returned {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Connection-level failure (refused, DNS, TLS).
    #[error("network error: {0}")]
    Transport(String),

    /// The response body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(String),

    /// The configured base URL could not be parsed.
    #[error("invalid API base URL: {0}")]
    BaseUrl(String),
}

impl ApiError {
    /// True for HTTP 404, which the client uses to fall back to the older
    /// route generation.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Http { status: 404, .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = ApiError::Http {
            status: 404,
            detail: "Not Found".to_string(),
        };
        assert!(err.is_not_found());

        let err = ApiError::Http {
            status: 500,
            detail: "boom".to_string(),
        };
        assert!(!err.is_not_found());
        assert!(!ApiError::Timeout.is_not_found());
    }
}
