//! Classification of non-success HTTP responses.

use reqwest::StatusCode;

/// A response whose status is anything other than `200 OK`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnexpectedStatus {
    pub url: String,
    pub status: u16,
}

impl UnexpectedStatus {
    /// Returns an error when `status` is not `200 OK`.
    pub fn check(url: &str, status: StatusCode) -> Result<(), UnexpectedStatus> {
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            })
        }
    }
}

impl std::fmt::Display for UnexpectedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
        {
            Some(reason) => write!(f, "HTTP {} {}", self.status, reason),
            None => write!(f, "HTTP {}", self.status),
        }
    }
}

impl std::error::Error for UnexpectedStatus {}
