use serde::{Deserialize, Serialize};

use crate::capabilities::{DialResult, HttpResult, LocationResult};
use crate::config::EmergencyService;
use crate::model::{LocationFix, QuickActionId, SessionId};
use crate::share::ShareResult;

/// Location actions that run outside the SOS session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    CopyLocation,
    ShareLocation,
}

impl QuickAction {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CopyLocation => "copy_location",
            Self::ShareLocation => "share_location",
        }
    }

    #[must_use]
    pub const fn copied_notice(self) -> &'static str {
        match self {
            Self::CopyLocation => "Location copied to clipboard.",
            Self::ShareLocation => "Location copied to clipboard — share it with your contact.",
        }
    }

    #[must_use]
    pub const fn failure_notice(self) -> &'static str {
        match self {
            Self::CopyLocation => {
                "Could not copy location — enable location services and allow clipboard access."
            }
            Self::ShareLocation => "Could not share location — enable location services.",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Event {
    // Shell
    ConfigReceived {
        json: String,
    },

    // SOS session
    SosTriggered,
    SosConfirmed,
    SosCancelled,
    MessageAcknowledged,

    // Quick actions
    CallRequested {
        service: EmergencyService,
    },
    CopyLocationRequested,
    ShareLocationRequested,

    // Capability results, never sent by the shell
    #[serde(skip)]
    SosLocationResolved {
        session: SessionId,
        result: Box<LocationResult>,
    },
    #[serde(skip)]
    SosShareResolved {
        session: SessionId,
        fix: LocationFix,
        result: ShareResult,
    },
    #[serde(skip)]
    SosDispatchResolved {
        session: SessionId,
        result: Box<HttpResult>,
    },
    #[serde(skip)]
    QuickLocationResolved {
        id: QuickActionId,
        action: QuickAction,
        result: Box<LocationResult>,
    },
    #[serde(skip)]
    QuickShareResolved {
        id: QuickActionId,
        action: QuickAction,
        fix: LocationFix,
        result: ShareResult,
    },
    #[serde(skip)]
    CallResolved {
        service: EmergencyService,
        result: DialResult,
    },
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ConfigReceived { .. } => "config_received",
            Self::SosTriggered => "sos_triggered",
            Self::SosConfirmed => "sos_confirmed",
            Self::SosCancelled => "sos_cancelled",
            Self::MessageAcknowledged => "message_acknowledged",
            Self::CallRequested { .. } => "call_requested",
            Self::CopyLocationRequested => "copy_location_requested",
            Self::ShareLocationRequested => "share_location_requested",
            Self::SosLocationResolved { .. } => "sos_location_resolved",
            Self::SosShareResolved { .. } => "sos_share_resolved",
            Self::SosDispatchResolved { .. } => "sos_dispatch_resolved",
            Self::QuickLocationResolved { .. } => "quick_location_resolved",
            Self::QuickShareResolved { .. } => "quick_share_resolved",
            Self::CallResolved { .. } => "call_resolved",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::SosTriggered
                | Self::SosConfirmed
                | Self::SosCancelled
                | Self::MessageAcknowledged
                | Self::CallRequested { .. }
                | Self::CopyLocationRequested
                | Self::ShareLocationRequested
        )
    }
}
