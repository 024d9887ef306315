//! Error types for the search core
//!
//! Every outbound Brave API call either succeeds or fails with one of the
//! [`SearchError`] variants below. Tool-level callers render them as text via
//! [`sanitize_error_message`] before they leave the process.

use crate::search::Operation;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Failure of a single search operation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Brave API error ({operation}): {status} {}\n{body}", reason_phrase(.status))]
    Upstream {
        operation: Operation,
        status: u16,
        body: String,
    },

    #[error("Brave API request failed ({operation}): {message}")]
    Network {
        operation: Operation,
        message: String,
    },

    #[error("Malformed Brave API response ({operation}): {message}")]
    MalformedResponse {
        operation: Operation,
        message: String,
    },

    #[error("HTTP client initialization failed: {message}")]
    ClientInit { message: String },
}

impl SearchError {
    /// Create upstream error from a non-success status
    pub fn upstream<S: Into<String>>(operation: Operation, status: u16, body: S) -> Self {
        Self::Upstream {
            operation,
            status,
            body: body.into(),
        }
    }

    /// Create network error
    pub fn network<S: Into<String>>(operation: Operation, message: S) -> Self {
        Self::Network {
            operation,
            message: message.into(),
        }
    }

    /// Create malformed response error
    pub fn malformed_response<S: Into<String>>(operation: Operation, message: S) -> Self {
        Self::MalformedResponse {
            operation,
            message: message.into(),
        }
    }

    /// Create client initialization error
    pub fn client_init<S: Into<String>>(message: S) -> Self {
        Self::ClientInit {
            message: message.into(),
        }
    }

    /// Upstream HTTP status, if this error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Operation that produced the error, if it reached the request stage
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::Upstream { operation, .. }
            | Self::Network { operation, .. }
            | Self::MalformedResponse { operation, .. } => Some(*operation),
            Self::RateLimitExceeded | Self::ClientInit { .. } => None,
        }
    }
}

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

fn reason_phrase(status: &u16) -> &'static str {
    reqwest::StatusCode::from_u16(*status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+").expect("secret pattern is valid")
});

static SENSITIVE_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
        .expect("path pattern is valid")
});

const MAX_ERROR_MESSAGE_LEN: usize = 500;

/// Sanitize error messages before they are returned to MCP clients
///
/// Upstream bodies are echoed verbatim into [`SearchError::Upstream`], so
/// anything that looks like a credential is redacted and the result is capped
/// at 500 bytes.
pub fn sanitize_error_message(message: &str) -> String {
    let sanitized = SECRET_PATTERN.replace_all(message, "${1}=***");
    let mut sanitized = SENSITIVE_PATH_PATTERN
        .replace_all(&sanitized, "/***REDACTED***/")
        .to_string();

    if sanitized.len() > MAX_ERROR_MESSAGE_LEN {
        let truncate_suffix = "...[truncated]";
        let mut cut = MAX_ERROR_MESSAGE_LEN - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str(truncate_suffix);
    }

    sanitized
}
