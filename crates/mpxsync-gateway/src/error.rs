use thiserror::Error;

/// Which half of a sync cycle a transfer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Upload,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Fetch => write!(f, "export fetch"),
            Operation::Upload => write!(f, "workbook upload"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. Uploads carry the response body for diagnostics.
    #[error("{operation} failed with HTTP status {status}")]
    Status {
        operation: Operation,
        status: u16,
        body: Option<String>,
    },

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },

    #[error("session cookie is not a valid header value")]
    InvalidSession,
}

impl TransferError {
    /// HTTP status of a rejected transfer, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            TransferError::Status { status, .. } => Some(*status),
            TransferError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// `true` when the vendor bounced the request to its login page or
    /// refused the session outright.
    #[must_use]
    pub fn is_session_rejected(&self) -> bool {
        matches!(self.status(), Some(301 | 302 | 303 | 401 | 403))
    }
}
