use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

/// Terminal result of one call in a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { index: usize, result: Value },
    Failure { index: usize, message: String },
}

impl Outcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Success { index, .. } | Self::Failure { index, .. } => *index,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The typed answer, when a success result matches the verdict schema.
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            Self::Success { result, .. } => serde_json::from_value(result.clone()).ok(),
            Self::Failure { .. } => None,
        }
    }
}

/// The `{value, reason, confidence}` answer the payload's schema asks for.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Verdict {
    pub value: bool,
    pub reason: Option<String>,
    pub confidence: Option<f64>,
}

/// Every outcome of one batch, ordered by call index.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub outcomes: Vec<Outcome>,
    pub elapsed: Duration,
}

impl BatchResult {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn ok(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn fail(&self) -> usize {
        self.len() - self.ok()
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Failure messages in index order.
    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.outcomes.iter().filter_map(|o| match o {
            Outcome::Failure { message, .. } => Some(message.as_str()),
            Outcome::Success { .. } => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn batch() -> BatchResult {
        BatchResult {
            outcomes: vec![
                Outcome::Success {
                    index: 0,
                    result: json!({"value": true, "reason": "match", "confidence": 88.5}),
                },
                Outcome::Failure {
                    index: 1,
                    message: "Request #1 failed (500): oops".to_string(),
                },
                Outcome::Success {
                    index: 2,
                    result: json!({"raw": "not json"}),
                },
            ],
            elapsed: Duration::from_millis(1234),
        }
    }

    #[test]
    fn counts_and_errors() {
        let b = batch();
        assert_eq!(b.len(), 3);
        assert_eq!(b.ok(), 2);
        assert_eq!(b.fail(), 1);
        assert_eq!(b.elapsed_ms(), 1234);
        assert_eq!(b.errors().collect::<Vec<_>>(), vec!["Request #1 failed (500): oops"]);
    }

    #[test]
    fn verdict_only_for_schema_shaped_successes() {
        let b = batch();
        assert_eq!(
            b.outcomes[0].verdict(),
            Some(Verdict {
                value: true,
                reason: Some("match".to_string()),
                confidence: Some(88.5),
            })
        );
        assert_eq!(b.outcomes[1].verdict(), None);
        assert_eq!(b.outcomes[2].verdict(), None);
    }
}
