use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{EmergencyService, PhoneNumber};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialerOperation {
    Call {
        service: EmergencyService,
        tel_uri: String,
    },
}

impl Operation for DialerOperation {
    type Output = DialResult;
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum DialError {
    #[error("this device cannot place calls")]
    Unsupported,

    #[error("call failed: {reason}")]
    Failed { reason: String },
}

/// `Ok` once the platform dialer has been opened.
pub type DialResult = Result<(), DialError>;

pub struct Dialer<Ev> {
    context: CapabilityContext<DialerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Dialer<Ev> {
    type Operation = DialerOperation;
    type MappedSelf<MappedEv> = Dialer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Dialer::new(self.context.map_event(f))
    }
}

impl<Ev> Dialer<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<DialerOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn call<F>(&self, service: EmergencyService, number: &PhoneNumber, make_event: F)
    where
        F: FnOnce(DialResult) -> Ev + Send + 'static,
        Ev: Send,
    {
        let operation = DialerOperation::Call {
            service,
            tel_uri: number.tel_uri(),
        };
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(make_event(result));
        });
    }
}
