use serde::{Deserialize, Serialize};

use crate::config::{EmergencyService, SosConfig};
use crate::error::FailureReason;
use crate::model::SessionState;

pub const SUCCESS_MESSAGE: &str = "SOS sent — authorities notified.";
pub const SENDING_MESSAGE: &str = "Sending SOS…";
pub const SHARE_HINT: &str =
    "Your location could not be shared with a contact. Use Copy My Location to send it yourself.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SosStatus {
    Idle,
    Confirming,
    Sending,
    Success,
    Failure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmPrompt {
    pub title: String,
    pub body: String,
    pub confirm_label: String,
    pub cancel_label: String,
    pub tip: String,
}

impl Default for ConfirmPrompt {
    fn default() -> Self {
        Self {
            title: "Confirm SOS".into(),
            body: "Are you sure you want to send your location to emergency services?".into(),
            confirm_label: "Yes — Send SOS".into(),
            cancel_label: "Cancel".into(),
            tip: "If you're on mobile, use the quick call buttons for faster response while the SOS is processed.".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SosView {
    pub status: SosStatus,
    pub busy: bool,
    pub prompt: Option<ConfirmPrompt>,
    pub message: Option<StatusMessage>,
    pub suggest_direct_call: bool,
    /// Whether pressing SOS again is worth offering. Never retried for the user.
    pub suggest_retry: bool,
    pub failure_code: Option<String>,
}

impl SosView {
    pub(crate) fn from_state(state: &SessionState) -> Self {
        let idle = Self {
            status: SosStatus::Idle,
            busy: false,
            prompt: None,
            message: None,
            suggest_direct_call: false,
            suggest_retry: false,
            failure_code: None,
        };

        match state {
            SessionState::Idle => idle,
            SessionState::AwaitingConfirmation => Self {
                status: SosStatus::Confirming,
                prompt: Some(ConfirmPrompt::default()),
                ..idle
            },
            SessionState::AcquiringLocation | SessionState::Dispatching => Self {
                status: SosStatus::Sending,
                busy: true,
                message: Some(StatusMessage {
                    kind: MessageKind::Info,
                    text: SENDING_MESSAGE.into(),
                }),
                ..idle
            },
            SessionState::Succeeded => Self {
                status: SosStatus::Success,
                message: Some(StatusMessage {
                    kind: MessageKind::Success,
                    text: SUCCESS_MESSAGE.into(),
                }),
                ..idle
            },
            SessionState::Failed(reason) => Self::failure(*reason),
        }
    }

    fn failure(reason: FailureReason) -> Self {
        Self {
            status: SosStatus::Failure,
            busy: false,
            prompt: None,
            message: Some(StatusMessage {
                kind: MessageKind::Error,
                text: reason.user_facing_message().into(),
            }),
            suggest_direct_call: reason.suggests_direct_call(),
            suggest_retry: reason.is_retryable(),
            failure_code: Some(reason.code().into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickDialButton {
    pub service: EmergencyService,
    pub label: String,
    pub number: String,
}

impl QuickDialButton {
    pub(crate) fn all(config: &SosConfig) -> Vec<Self> {
        EmergencyService::ALL
            .iter()
            .map(|&service| Self {
                service,
                label: service.label().into(),
                number: config.number_for(service).as_str().into(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewModel {
    pub sos: SosView,
    pub quick_dial: Vec<QuickDialButton>,
    pub last_sent_location: Option<String>,
    pub notice: Option<String>,
    pub share_hint: Option<String>,
    pub config_warning: Option<String>,
}
