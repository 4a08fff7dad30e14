use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::share::{after_clipboard, after_peer_share, PeerShareStep, ShareContent, ShareResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareOperation {
    PeerShare {
        title: String,
        text: String,
        url: String,
    },
    CopyToClipboard {
        text: String,
    },
}

impl Operation for ShareOperation {
    type Output = Result<ShareOutput, ShareError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareOutput {
    Shared { recipients: u32 },
    Dismissed,
    Copied,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShareError {
    /// The platform has no such facility. Only ever seen by the capability.
    #[error("sharing facility unavailable")]
    Unavailable,

    #[error("share denied: {reason}")]
    Denied { reason: String },
}

pub struct Share<Ev> {
    context: CapabilityContext<ShareOperation, Ev>,
}

impl<Ev> Capability<Ev> for Share<Ev> {
    type Operation = ShareOperation;
    type MappedSelf<MappedEv> = Share<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Share::new(self.context.map_event(f))
    }
}

impl<Ev> Share<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<ShareOperation, Ev>) -> Self {
        Self { context }
    }

    /// Share sheet first; clipboard only when the sheet is unavailable.
    pub fn share_or_copy<F>(&self, content: ShareContent, make_event: F)
    where
        F: FnOnce(ShareResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let clipboard_text = content.clipboard_text().to_string();
            let peer = ctx
                .request_from_shell(ShareOperation::PeerShare {
                    title: content.title,
                    text: content.text,
                    url: content.url,
                })
                .await;

            let result = match after_peer_share(peer) {
                PeerShareStep::Done(result) => result,
                PeerShareStep::FallBackToClipboard => {
                    let copied = ctx
                        .request_from_shell(ShareOperation::CopyToClipboard {
                            text: clipboard_text,
                        })
                        .await;
                    after_clipboard(copied)
                }
            };
            ctx.update_app(make_event(result));
        });
    }

    pub fn copy<F>(&self, text: String, make_event: F)
    where
        F: FnOnce(ShareResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let copied = ctx
                .request_from_shell(ShareOperation::CopyToClipboard { text })
                .await;
            ctx.update_app(make_event(after_clipboard(copied)));
        });
    }
}
