//! Tagged tool outcome
//!
//! The gateway boundary converts every broker call into this union so
//! callers pattern-match on success/failure instead of probing ad hoc
//! fields. Failures keep a machine-readable kind plus a human-readable
//! message the model can relay in natural language.

use crate::error::BrokerError;
use serde_json::{json, Value};

/// Result of one tool invocation at the gateway boundary
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// The platform accepted the call; payload is the normalized response
    Success(Value),
    /// The call failed; never raised as a transport fault
    Failure {
        /// Stable error kind (`http`, `api`, `validation`, ...)
        kind: String,
        /// Human-readable message
        message: String,
    },
}

impl ToolOutcome {
    /// Build a failure outcome from a broker error
    #[must_use]
    pub fn failure(error: &BrokerError) -> Self {
        Self::Failure {
            kind: error.kind().to_string(),
            message: error.to_string(),
        }
    }

    /// Whether this outcome is a failure
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Serialize to the wire payload handed to the model.
    ///
    /// Successes pass the platform payload through; failures become
    /// `{"status": "error", "error": {"kind", "message"}}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Success(payload) => payload.clone(),
            Self::Failure { kind, message } => json!({
                "status": "error",
                "error": {
                    "kind": kind,
                    "message": message,
                }
            }),
        }
    }
}

impl From<crate::error::Result<Value>> for ToolOutcome {
    fn from(result: crate::error::Result<Value>) -> Self {
        match result {
            Ok(payload) => Self::Success(payload),
            Err(e) => Self::failure(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_passthrough() {
        let outcome = ToolOutcome::Success(json!({"status": "success", "data": {"cash": 1.0}}));
        assert!(!outcome.is_failure());
        assert_eq!(outcome.to_json()["status"], "success");
    }

    #[test]
    fn test_failure_shape() {
        let outcome = ToolOutcome::failure(&BrokerError::Api {
            status: 400,
            message: "invalid symbol".to_string(),
        });
        assert!(outcome.is_failure());

        let json = outcome.to_json();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"]["kind"], "api");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid symbol"));
    }

    #[test]
    fn test_from_result() {
        let ok: ToolOutcome = Ok(json!({"status": "success"})).into();
        assert!(!ok.is_failure());

        let err: ToolOutcome = Err(BrokerError::Http("timed out".into())).into();
        assert!(err.is_failure());
    }
}
