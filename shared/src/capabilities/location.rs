use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DEFAULT_LOCATION_TIMEOUT_MS;

/// Parameters for a single position fix. The shell must honour `timeout_ms`
/// and answer with [`LocationError::Timeout`] when it expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRequest {
    pub timeout_ms: u64,
    pub high_accuracy: bool,
    /// Cached positions are never acceptable for an alert.
    pub maximum_age_ms: u64,
}

impl LocationRequest {
    pub fn one_shot(timeout_ms: u64) -> Self {
        Self {
            timeout_ms: timeout_ms.max(1),
            high_accuracy: true,
            maximum_age_ms: 0,
        }
    }
}

impl Default for LocationRequest {
    fn default() -> Self {
        Self::one_shot(DEFAULT_LOCATION_TIMEOUT_MS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationOperation {
    Acquire(LocationRequest),
}

impl Operation for LocationOperation {
    type Output = LocationResult;
}

/// Position as reported by the platform, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
    pub timestamp_ms: u64,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("geolocation is not supported on this device")]
    Unsupported,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("location request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("position unavailable: {reason}")]
    PositionUnavailable { reason: String },
}

pub type LocationResult = Result<RawPosition, LocationError>;

pub struct Location<Ev> {
    context: CapabilityContext<LocationOperation, Ev>,
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<Ev> Location<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn acquire<F>(&self, request: LocationRequest, make_event: F)
    where
        F: FnOnce(LocationResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(LocationOperation::Acquire(request))
                .await;
            ctx.update_app(make_event(result));
        });
    }
}
