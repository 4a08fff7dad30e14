//! Peer sharing of a location fix: share-sheet content, and how the shell's
//! answers collapse into a single [`ShareOutcome`].
//!
//! Sharing never blocks dispatch and a failed share never fails a session.

use serde::{Deserialize, Serialize};

use crate::capabilities::{ShareError, ShareOutput};
use crate::model::LocationFix;

pub const EMERGENCY_SHARE_TITLE: &str = "Emergency — please help";
pub const PLAIN_SHARE_TITLE: &str = "My location";
pub const PLAIN_SHARE_TEXT: &str = "My current location";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareContent {
    pub title: String,
    pub text: String,
    pub url: String,
}

impl ShareContent {
    /// Content used while an SOS session is running.
    pub fn emergency(fix: &LocationFix) -> Self {
        let link = fix.map_link();
        Self {
            title: EMERGENCY_SHARE_TITLE.to_string(),
            text: format!("I'm in an emergency. My location: {link}"),
            url: link,
        }
    }

    pub fn plain(fix: &LocationFix) -> Self {
        Self {
            title: PLAIN_SHARE_TITLE.to_string(),
            text: PLAIN_SHARE_TEXT.to_string(),
            url: fix.map_link(),
        }
    }

    /// What lands on the clipboard when the share sheet is unavailable.
    pub fn clipboard_text(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ShareOutcome {
    Shared { recipients: u32 },
    CopiedToClipboard,
}

pub type ShareResult = Result<ShareOutcome, ShareError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PeerShareStep {
    Done(ShareResult),
    FallBackToClipboard,
}

pub(crate) fn after_peer_share(result: Result<ShareOutput, ShareError>) -> PeerShareStep {
    match result {
        Ok(ShareOutput::Shared { recipients }) => {
            PeerShareStep::Done(Ok(ShareOutcome::Shared { recipients }))
        }
        // Closing the sheet is a choice, not a fault.
        Ok(ShareOutput::Dismissed) => PeerShareStep::Done(Ok(ShareOutcome::Shared { recipients: 0 })),
        Ok(ShareOutput::Copied) => PeerShareStep::Done(Ok(ShareOutcome::CopiedToClipboard)),
        Err(ShareError::Unavailable) => PeerShareStep::FallBackToClipboard,
        Err(e @ ShareError::Denied { .. }) => PeerShareStep::Done(Err(e)),
    }
}

pub(crate) fn after_clipboard(result: Result<ShareOutput, ShareError>) -> ShareResult {
    match result {
        Ok(ShareOutput::Copied) => Ok(ShareOutcome::CopiedToClipboard),
        Ok(other) => Err(ShareError::Denied {
            reason: format!("unexpected clipboard answer: {other:?}"),
        }),
        Err(ShareError::Unavailable) => Err(ShareError::Denied {
            reason: "clipboard unavailable".to_string(),
        }),
        Err(e) => Err(e),
    }
}
