use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::LocationError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("invalid coordinate: lat={0}, lng={1}")]
    InvalidCoordinate(f64, f64),

    #[error("invalid accuracy: {0} (must be finite and >= 0)")]
    InvalidAccuracy(f64),

    #[error("invalid client context: {0}")]
    InvalidClientContext(String),

    #[error("invalid phone number '{number}': {reason}")]
    InvalidPhoneNumber { number: String, reason: String },

    #[error("invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Location,
    Dispatch,
}

/// Why an SOS session ended in `Failed`. The raw detail is kept out of this
/// type so it can never leak into user-facing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FailureReason {
    Unsupported,
    PermissionDenied,
    Timeout,
    PositionUnavailable,
    TransportFailure,
    ServerRejected { status: u16 },
}

impl FailureReason {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unsupported => "LOCATION_UNSUPPORTED",
            Self::PermissionDenied => "LOCATION_PERMISSION_DENIED",
            Self::Timeout => "LOCATION_TIMEOUT",
            Self::PositionUnavailable => "LOCATION_UNAVAILABLE",
            Self::TransportFailure => "DISPATCH_TRANSPORT_FAILURE",
            Self::ServerRejected { .. } => "DISPATCH_SERVER_REJECTED",
        }
    }

    #[must_use]
    pub const fn stage(self) -> FailureStage {
        match self {
            Self::Unsupported
            | Self::PermissionDenied
            | Self::Timeout
            | Self::PositionUnavailable => FailureStage::Location,
            Self::TransportFailure | Self::ServerRejected { .. } => FailureStage::Dispatch,
        }
    }

    /// Whether triggering a fresh SOS has a reasonable chance of succeeding.
    /// Nothing is ever retried automatically.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Timeout | Self::PositionUnavailable | Self::TransportFailure
        )
    }

    #[must_use]
    pub const fn suggests_direct_call(self) -> bool {
        matches!(self.stage(), FailureStage::Dispatch) || matches!(self, Self::Unsupported)
    }

    #[must_use]
    pub const fn user_facing_message(self) -> &'static str {
        match self {
            Self::Unsupported => {
                "Location is not available on this device. Use the quick call buttons to reach emergency services."
            }
            Self::PermissionDenied => {
                "Location access is required to send an SOS. Please enable location permissions in Settings, then try again."
            }
            Self::Timeout => {
                "Finding your location took too long. Move to an open area and try again, or use the quick call buttons."
            }
            Self::PositionUnavailable => {
                "Unable to obtain location. Please ensure location services are enabled."
            }
            Self::TransportFailure | Self::ServerRejected { .. } => {
                "Failed to send SOS. Please try calling local services."
            }
        }
    }
}

impl From<&LocationError> for FailureReason {
    fn from(e: &LocationError) -> Self {
        match e {
            LocationError::Unsupported => Self::Unsupported,
            LocationError::PermissionDenied => Self::PermissionDenied,
            LocationError::Timeout { .. } => Self::Timeout,
            LocationError::PositionUnavailable { .. } => Self::PositionUnavailable,
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ServerRejected { status } => write!(f, "{} ({status})", self.code()),
            _ => f.write_str(self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const LOCATION_REASONS: [FailureReason; 4] = [
        FailureReason::Unsupported,
        FailureReason::PermissionDenied,
        FailureReason::Timeout,
        FailureReason::PositionUnavailable,
    ];

    #[test]
    fn test_location_reasons_have_distinct_messages() {
        let messages: HashSet<_> = LOCATION_REASONS
            .iter()
            .map(|r| r.user_facing_message())
            .collect();
        assert_eq!(messages.len(), LOCATION_REASONS.len());
    }

    #[test]
    fn test_dispatch_failures_point_at_direct_call() {
        for reason in [
            FailureReason::TransportFailure,
            FailureReason::ServerRejected { status: 500 },
        ] {
            assert_eq!(reason.stage(), FailureStage::Dispatch);
            assert!(reason.suggests_direct_call());
            assert!(reason.user_facing_message().contains("calling local services"));
        }
    }

    #[test]
    fn test_permission_denied_is_not_retryable() {
        assert!(!FailureReason::PermissionDenied.is_retryable());
        assert!(!FailureReason::ServerRejected { status: 400 }.is_retryable());
        assert!(FailureReason::Timeout.is_retryable());
        assert!(FailureReason::TransportFailure.is_retryable());
    }

    #[test]
    fn test_location_error_mapping() {
        assert_eq!(
            FailureReason::from(&LocationError::Timeout { timeout_ms: 10_000 }),
            FailureReason::Timeout
        );
        assert_eq!(
            FailureReason::from(&LocationError::PositionUnavailable {
                reason: "no satellites".into()
            }),
            FailureReason::PositionUnavailable
        );
    }

    #[test]
    fn test_display_includes_status_for_rejections() {
        assert_eq!(
            FailureReason::ServerRejected { status: 503 }.to_string(),
            "DISPATCH_SERVER_REJECTED (503)"
        );
        assert_eq!(FailureReason::Timeout.to_string(), "LOCATION_TIMEOUT");
    }

    #[test]
    fn test_config_error_wraps_json_errors() {
        let err: ConfigError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
