//! Shared core of the SOS panel: confirmation, location capture, alert
//! dispatch and peer-sharing fallbacks, driven by events from the shell.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod gate;
pub mod model;
pub mod share;
pub mod view;

pub use app::{App, Model};
pub use capabilities::{Capabilities, Effect};
pub use config::{EmergencyService, PhoneNumber, SosConfig};
pub use crux_core::{render::Render, App as CruxApp};
pub use dispatch::AlertDispatcher;
pub use error::{ConfigError, FailureReason, FailureStage, ValidationError};
pub use event::{Event, QuickAction};
pub use gate::{ConfirmationGate, DispatchPermit, GateError, GateState};
pub use model::{
    AlertPayload, ClientContext, DispatchOutcome, LocationFix, SessionId, SessionState, UnixTimeMs,
};
pub use share::{ShareContent, ShareOutcome, ShareResult};
pub use view::{MessageKind, SosStatus, ViewModel};

pub const DEFAULT_LOCATION_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 15_000;
pub const MAX_LOCATION_TIMEOUT_MS: u64 = 120_000;
pub const MAX_DISPATCH_TIMEOUT_MS: u64 = 300_000;
pub const DEFAULT_EMERGENCY_NUMBER: &str = "+112";
pub const DEFAULT_SOS_ENDPOINT: &str = "/api/sos";
pub const MAP_LINK_BASE: &str = "https://maps.google.com/?q=";
pub const MAX_CLIENT_CONTEXT_BYTES: usize = 512;
/// Upper bound on failure detail kept for diagnostics.
pub const MAX_DETAIL_BYTES: usize = 2048;
