use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::RawPosition;
use crate::error::{FailureReason, ValidationError};
use crate::{MAP_LINK_BASE, MAX_CLIENT_CONTEXT_BYTES};

// --- Typed IDs ---

macro_rules! typed_id {
    ($name:ident) => {
        #[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

typed_id!(SessionId);
typed_id!(QuickActionId);

/// Explicit timestamp unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnixTimeMs(pub u64);

// --- Location fix: validated, NaN-safe, immutable ---

#[derive(Clone, Copy, Debug, Serialize)]
pub struct LocationFix {
    latitude: f64,
    longitude: f64,
    accuracy_meters: f64,
    captured_at: UnixTimeMs,
}

impl LocationFix {
    pub fn new(
        latitude: f64,
        longitude: f64,
        accuracy_meters: f64,
        captured_at: UnixTimeMs,
    ) -> Result<Self, ValidationError> {
        if !latitude.is_finite()
            || !longitude.is_finite()
            || !(-90.0..=90.0).contains(&latitude)
            || !(-180.0..=180.0).contains(&longitude)
        {
            return Err(ValidationError::InvalidCoordinate(latitude, longitude));
        }
        if !accuracy_meters.is_finite() || accuracy_meters < 0.0 {
            return Err(ValidationError::InvalidAccuracy(accuracy_meters));
        }
        Ok(Self {
            latitude,
            longitude,
            accuracy_meters,
            captured_at,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn accuracy_meters(&self) -> f64 {
        self.accuracy_meters
    }

    pub fn captured_at(&self) -> UnixTimeMs {
        self.captured_at
    }

    /// `12.90000, 77.60000 (±15m)`
    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{:.5}, {:.5} (±{}m)",
            self.latitude,
            self.longitude,
            self.accuracy_meters.round()
        )
    }

    /// Shortest round-trip decimal form. Tiny values print positionally
    /// (`0.0000001`, never `1e-7`), which map links accept either way.
    #[must_use]
    pub fn map_link(&self) -> String {
        format!(
            "{MAP_LINK_BASE}{},{}",
            without_negative_zero(self.latitude),
            without_negative_zero(self.longitude)
        )
    }
}

// `-0.0 + 0.0` is `+0.0`, so `-0` never reaches a link.
fn without_negative_zero(value: f64) -> f64 {
    value + 0.0
}

impl PartialEq for LocationFix {
    fn eq(&self, other: &Self) -> bool {
        self.latitude.to_bits() == other.latitude.to_bits()
            && self.longitude.to_bits() == other.longitude.to_bits()
            && self.accuracy_meters.to_bits() == other.accuracy_meters.to_bits()
            && self.captured_at == other.captured_at
    }
}

impl Eq for LocationFix {}

impl TryFrom<RawPosition> for LocationFix {
    type Error = ValidationError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Self::new(
            raw.latitude,
            raw.longitude,
            raw.accuracy_meters,
            UnixTimeMs(raw.timestamp_ms),
        )
    }
}

// --- Client context: the opaque agent descriptor sent with every alert ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct ClientContext(String);

impl ClientContext {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.len() > MAX_CLIENT_CONTEXT_BYTES {
            return Err(ValidationError::InvalidClientContext(format!(
                "{} bytes exceeds maximum of {MAX_CLIENT_CONTEXT_BYTES}",
                s.len()
            )));
        }
        if s.chars().any(char::is_control) {
            return Err(ValidationError::InvalidClientContext(
                "contains control characters".into(),
            ));
        }
        Ok(Self(s))
    }

    pub fn unknown() -> Self {
        Self("unknown".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::unknown()
    }
}

impl TryFrom<String> for ClientContext {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientContext> for String {
    fn from(value: ClientContext) -> Self {
        value.0
    }
}

// --- Alert payload ---

/// Immutable alert body. Built only from validated parts, so construction
/// cannot fail and serialization is a pure function of its inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertPayload {
    fix: LocationFix,
    client_context: ClientContext,
}

/// Wire shape: `{lat, lng, accuracy, timestamp, userAgent}`.
#[derive(Serialize)]
struct WireAlert<'a> {
    lat: f64,
    lng: f64,
    accuracy: f64,
    timestamp: u64,
    #[serde(rename = "userAgent")]
    user_agent: &'a str,
}

impl AlertPayload {
    pub fn new(fix: LocationFix, client_context: ClientContext) -> Self {
        Self {
            fix,
            client_context,
        }
    }

    pub fn fix(&self) -> &LocationFix {
        &self.fix
    }

    pub fn client_context(&self) -> &ClientContext {
        &self.client_context
    }

    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl Serialize for AlertPayload {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireAlert {
            lat: self.fix.latitude,
            lng: self.fix.longitude,
            accuracy: self.fix.accuracy_meters,
            timestamp: self.fix.captured_at.0,
            user_agent: self.client_context.as_str(),
        }
        .serialize(serializer)
    }
}

// --- Dispatch outcome ---

/// Produced exactly once per dispatch attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Success,
    TransportFailure { detail: String },
    ServerRejected { status: u16, detail: String },
}

impl DispatchOutcome {
    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            Self::Success => None,
            Self::TransportFailure { .. } => Some(FailureReason::TransportFailure),
            Self::ServerRejected { status, .. } => {
                Some(FailureReason::ServerRejected { status: *status })
            }
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success => None,
            Self::TransportFailure { detail } | Self::ServerRejected { detail, .. } => {
                Some(detail)
            }
        }
    }
}

// --- Session state ---

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingConfirmation,
    AcquiringLocation,
    Dispatching,
    Succeeded,
    Failed(FailureReason),
}

impl SessionState {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AwaitingConfirmation => "awaiting_confirmation",
            Self::AcquiringLocation => "acquiring_location",
            Self::Dispatching => "dispatching",
            Self::Succeeded => "succeeded",
            Self::Failed(_) => "failed",
        }
    }

    /// A session is open from trigger until it resolves or is cancelled.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(
            self,
            Self::AwaitingConfirmation | Self::AcquiringLocation | Self::Dispatching
        )
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }
}
