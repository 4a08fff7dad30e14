mod dialer;
mod http;
mod location;
mod share;

pub use self::dialer::{DialError, DialResult, Dialer, DialerOperation};
pub use self::http::{
    Endpoint, Http, HttpError, HttpHeaders, HttpMethod, HttpOperation, HttpOutput, HttpRequest,
    HttpResponse, HttpResult,
};
pub use self::location::{
    Location, LocationError, LocationOperation, LocationRequest, LocationResult, RawPosition,
};
pub use self::share::{Share, ShareError, ShareOperation, ShareOutput};

/// Render capability re-export.
///
/// Crux's built-in Render is enough for triggering view updates.
pub use crux_core::render::Render;

use crate::app::App;
use crate::event::Event;

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Location error: {0}")]
    Location(#[from] LocationError),

    #[error("Share error: {0}")]
    Share(#[from] ShareError),

    #[error("Dial error: {0}")]
    Dial(#[from] DialError),
}

#[derive(crux_core::macros::Effect)]
#[effect(app = "App")]
pub struct Capabilities {
    pub render: Render<Event>,
    pub http: Http<Event>,
    pub location: Location<Event>,
    pub share: Share<Event>,
    pub dialer: Dialer<Event>,
}
