use thiserror::Error;

#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("({status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("schema parse error: {0}")]
    SchemaParse(String),

    #[error("response too large: {size} bytes (max {max})")]
    ResponseTooLarge { size: usize, max: usize },

    #[error("task panicked: {0}")]
    TaskPanicked(String),

    #[error("{0}")]
    Other(String),
}

impl FanoutError {
    /// HTTP status carried by the error, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Render the per-call failure line for request `index`.
    ///
    /// HTTP errors read `Request #1 failed (500): body`; everything else reads
    /// `Request #1 failed: <error>`.
    pub fn call_message(&self, index: usize) -> String {
        match self {
            Self::Upstream { .. } => format!("Request #{index} failed {self}"),
            _ => format!("Request #{index} failed: {self}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_carries_status_and_body() {
        let e = FanoutError::Upstream {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(e.call_message(1), "Request #1 failed (500): boom");
        assert_eq!(e.status(), Some(500));
    }

    #[test]
    fn other_errors_use_colon_form() {
        let e = FanoutError::Timeout(2500);
        assert_eq!(e.call_message(7), "Request #7 failed: timed out after 2500ms");
        assert_eq!(e.status(), None);
    }
}
