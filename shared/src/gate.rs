//! Human confirmation before anything leaves the device.
//!
//! A trigger opens a gate in `Unconfirmed`. Approval moves it to `Confirmed`,
//! which can be exchanged exactly once for a [`DispatchPermit`]. Without a
//! permit no alert request can be built.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateState {
    Unconfirmed,
    Confirmed,
    /// The single permit has been handed out.
    Spent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GateError {
    #[error("no confirmation is pending")]
    NotAwaitingApproval,

    #[error("dispatch has not been approved")]
    NotApproved,

    #[error("this session has already dispatched")]
    AlreadyDispatched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationGate {
    session: SessionId,
    state: GateState,
}

impl ConfirmationGate {
    pub fn open(session: SessionId) -> Self {
        Self {
            session,
            state: GateState::Unconfirmed,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn approve(&mut self) -> Result<(), GateError> {
        match self.state {
            GateState::Unconfirmed => {
                self.state = GateState::Confirmed;
                Ok(())
            }
            GateState::Confirmed => Err(GateError::NotAwaitingApproval),
            GateState::Spent => Err(GateError::AlreadyDispatched),
        }
    }

    /// Consumes the gate. Cancelling after approval but before the permit is
    /// taken is allowed; once spent the dispatch can no longer be withdrawn.
    pub fn cancel(self) -> Result<(), GateError> {
        match self.state {
            GateState::Unconfirmed | GateState::Confirmed => Ok(()),
            GateState::Spent => Err(GateError::AlreadyDispatched),
        }
    }

    pub fn take_permit(&mut self) -> Result<DispatchPermit, GateError> {
        match self.state {
            GateState::Confirmed => {
                self.state = GateState::Spent;
                Ok(DispatchPermit {
                    session: self.session.clone(),
                })
            }
            GateState::Unconfirmed => Err(GateError::NotApproved),
            GateState::Spent => Err(GateError::AlreadyDispatched),
        }
    }
}

/// Proof of approval for one dispatch. Not `Clone`; consumed by the
/// dispatcher.
#[derive(Debug, PartialEq, Eq)]
pub struct DispatchPermit {
    session: SessionId,
}

impl DispatchPermit {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn for_tests(session: SessionId) -> Self {
        Self { session }
    }
}
