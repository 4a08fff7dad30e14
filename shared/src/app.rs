use tracing::{debug, error, info, warn};

use crate::capabilities::{
    CapabilityError, Capabilities, DialResult, HttpResult, LocationRequest, LocationResult,
};
use crate::config::{EmergencyService, SosConfig};
use crate::dispatch::AlertDispatcher;
use crate::error::FailureReason;
use crate::event::{Event, QuickAction};
use crate::gate::ConfirmationGate;
use crate::model::{AlertPayload, LocationFix, QuickActionId, SessionId, SessionState};
use crate::share::{ShareContent, ShareOutcome, ShareResult};
use crate::view::{QuickDialButton, SosView, ViewModel, SHARE_HINT};

/// The SOS session currently owned by the controller.
#[derive(Debug, Clone)]
pub(crate) struct ActiveSession {
    id: SessionId,
    gate: ConfirmationGate,
    fix: Option<LocationFix>,
}

#[derive(Debug, Clone)]
pub(crate) struct PendingQuickAction {
    id: QuickActionId,
    action: QuickAction,
}

#[derive(Debug, Default)]
pub struct Model {
    config: SosConfig,
    config_error: Option<String>,
    state: SessionState,
    session: Option<ActiveSession>,
    last_sent_location: Option<LocationFix>,
    notice: Option<String>,
    share_hint: Option<String>,
    quick_action: Option<PendingQuickAction>,
    last_diagnostic: Option<String>,
}

impl Model {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &SosConfig {
        &self.config
    }

    pub fn last_sent_location(&self) -> Option<&LocationFix> {
        self.last_sent_location.as_ref()
    }

    /// Raw detail of the most recent failure. Never shown to the user.
    pub fn last_diagnostic(&self) -> Option<&str> {
        self.last_diagnostic.as_deref()
    }

    fn session_id(&self) -> Option<&SessionId> {
        self.session.as_ref().map(|s| &s.id)
    }

    fn is_current(&self, session: &SessionId) -> bool {
        self.session_id() == Some(session)
    }
}

#[derive(Default)]
pub struct App;

impl App {
    fn fail(model: &mut Model, reason: FailureReason, diagnostic: String) {
        warn!(
            session = ?model.session_id().map(SessionId::as_str),
            code = reason.code(),
            diagnostic = %diagnostic,
            "sos session failed"
        );
        model.state = SessionState::Failed(reason);
        model.last_diagnostic = Some(diagnostic);
    }

    fn trigger(model: &mut Model) {
        if model.state.is_open() {
            debug!(state = model.state.name(), "trigger ignored, session already open");
            return;
        }

        let id = SessionId::generate();
        info!(session = %id, "sos triggered, awaiting confirmation");
        model.session = Some(ActiveSession {
            gate: ConfirmationGate::open(id.clone()),
            id,
            fix: None,
        });
        model.state = SessionState::AwaitingConfirmation;
        model.share_hint = None;
    }

    fn confirm(model: &mut Model, caps: &Capabilities) {
        if model.state != SessionState::AwaitingConfirmation {
            debug!(state = model.state.name(), "confirmation ignored");
            return;
        }
        let Some(session) = model.session.as_mut() else {
            error!("awaiting confirmation without a session");
            model.state = SessionState::Idle;
            return;
        };
        if let Err(e) = session.gate.approve() {
            warn!(session = %session.id, error = %e, "approval rejected");
            return;
        }

        let id = session.id.clone();
        info!(session = %id, "sos confirmed, acquiring location");
        model.state = SessionState::AcquiringLocation;
        caps.location.acquire(
            LocationRequest::one_shot(model.config.location_timeout_ms()),
            move |result| Event::SosLocationResolved {
                session: id,
                result: Box::new(result),
            },
        );
    }

    fn cancel(model: &mut Model) {
        match model.state {
            SessionState::AwaitingConfirmation | SessionState::AcquiringLocation => {
                if let Some(session) = model.session.take() {
                    let id = session.id.clone();
                    match session.gate.cancel() {
                        Ok(()) => info!(session = %id, "sos cancelled"),
                        Err(e) => warn!(session = %id, error = %e, "cancel after dispatch"),
                    }
                }
                model.state = SessionState::Idle;
            }
            SessionState::Dispatching => {
                debug!("cancel ignored, dispatch already in flight");
            }
            _ => {}
        }
    }

    fn acknowledge(model: &mut Model) {
        if model.state.is_resolved() {
            model.state = SessionState::Idle;
            model.session = None;
            model.share_hint = None;
        }
        model.notice = None;
    }

    fn location_resolved(
        model: &mut Model,
        session: &SessionId,
        result: LocationResult,
        caps: &Capabilities,
    ) {
        if !model.is_current(session) || model.state != SessionState::AcquiringLocation {
            debug!(session = %session, "discarding stale location result");
            return;
        }

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                let reason = FailureReason::from(&e);
                Self::fail(model, reason, CapabilityError::from(e).to_string());
                return;
            }
        };
        let fix = match LocationFix::try_from(raw) {
            Ok(fix) => fix,
            Err(e) => {
                Self::fail(model, FailureReason::PositionUnavailable, e.to_string());
                return;
            }
        };
        debug!(
            session = %session,
            lat = fix.latitude(),
            lng = fix.longitude(),
            accuracy = fix.accuracy_meters(),
            "location acquired"
        );

        let Some(active) = model.session.as_mut() else {
            return;
        };
        let permit = match active.gate.take_permit() {
            Ok(permit) => permit,
            Err(e) => {
                error!(session = %session, error = %e, "no dispatch permit");
                Self::fail(model, FailureReason::TransportFailure, e.to_string());
                return;
            }
        };
        active.fix = Some(fix);

        let payload = AlertPayload::new(fix, model.config.client_context().clone());
        let request = match AlertDispatcher::prepare(permit, &payload, &model.config) {
            Ok(request) => request,
            Err(e) => {
                let diagnostic = CapabilityError::from(e).to_string();
                Self::fail(model, FailureReason::TransportFailure, diagnostic);
                return;
            }
        };

        // Best effort, runs alongside the dispatch.
        let share_session = session.clone();
        caps.share
            .share_or_copy(ShareContent::emergency(&fix), move |result| {
                Event::SosShareResolved {
                    session: share_session,
                    fix,
                    result,
                }
            });

        info!(session = %session, request_id = request.request_id(), "dispatching sos");
        model.state = SessionState::Dispatching;
        let dispatch_session = session.clone();
        caps.http.execute(request, move |result| Event::SosDispatchResolved {
            session: dispatch_session,
            result: Box::new(result),
        });
    }

    fn share_resolved(
        model: &mut Model,
        session: &SessionId,
        fix: LocationFix,
        result: ShareResult,
    ) {
        if !model.is_current(session) {
            debug!(session = %session, "discarding stale share result");
            return;
        }
        match result {
            Ok(ShareOutcome::CopiedToClipboard) => {
                info!(session = %session, "location copied to clipboard");
                model.last_sent_location = Some(fix);
            }
            Ok(ShareOutcome::Shared { recipients }) => {
                info!(session = %session, recipients, "location shared");
            }
            Err(e) => {
                warn!(session = %session, error = %e, "share denied");
                model.share_hint = Some(SHARE_HINT.to_string());
                model.last_diagnostic = Some(CapabilityError::from(e).to_string());
            }
        }
    }

    fn dispatch_resolved(model: &mut Model, session: &SessionId, result: &HttpResult) {
        if !model.is_current(session) || model.state != SessionState::Dispatching {
            debug!(session = %session, "discarding stale dispatch result");
            return;
        }

        let outcome = AlertDispatcher::classify(result);
        match outcome.failure_reason() {
            None => {
                info!(session = %session, "sos delivered");
                model.state = SessionState::Succeeded;
                if let Some(fix) = model.session.as_ref().and_then(|s| s.fix) {
                    model.last_sent_location = Some(fix);
                }
            }
            Some(reason) => {
                let detail = outcome.detail().unwrap_or_default().to_string();
                Self::fail(model, reason, detail);
            }
        }
    }

    fn call(model: &mut Model, service: EmergencyService, caps: &Capabilities) {
        info!(service = service.label(), "direct call requested");
        caps.dialer
            .call(service, model.config.number_for(service), move |result| {
                Event::CallResolved { service, result }
            });
    }

    fn call_resolved(model: &mut Model, service: EmergencyService, result: DialResult) {
        if let Err(e) = result {
            warn!(service = service.label(), error = %e, "call failed");
            model.notice = Some(format!(
                "Could not start a call. Dial {} manually.",
                model.config.number_for(service)
            ));
            model.last_diagnostic = Some(CapabilityError::from(e).to_string());
        }
    }

    fn start_quick_action(model: &mut Model, action: QuickAction, caps: &Capabilities) {
        if let Some(pending) = &model.quick_action {
            debug!(
                pending = pending.action.name(),
                requested = action.name(),
                "quick action ignored, another is in flight"
            );
            return;
        }

        let id = QuickActionId::generate();
        debug!(action = action.name(), id = %id, "quick action started");
        model.quick_action = Some(PendingQuickAction {
            id: id.clone(),
            action,
        });
        model.notice = None;
        caps.location.acquire(
            LocationRequest::one_shot(model.config.location_timeout_ms()),
            move |result| Event::QuickLocationResolved {
                id,
                action,
                result: Box::new(result),
            },
        );
    }

    fn is_pending_quick_action(model: &Model, id: &QuickActionId) -> bool {
        model.quick_action.as_ref().is_some_and(|p| &p.id == id)
    }

    fn quick_action_failed(model: &mut Model, action: QuickAction, diagnostic: String) {
        warn!(action = action.name(), diagnostic = %diagnostic, "quick action failed");
        model.quick_action = None;
        model.notice = Some(action.failure_notice().to_string());
        model.last_diagnostic = Some(diagnostic);
    }

    fn quick_location_resolved(
        model: &mut Model,
        id: QuickActionId,
        action: QuickAction,
        result: LocationResult,
        caps: &Capabilities,
    ) {
        if !Self::is_pending_quick_action(model, &id) {
            debug!(id = %id, "discarding stale quick action result");
            return;
        }

        let fix = match result
            .map_err(|e| CapabilityError::from(e).to_string())
            .and_then(|raw| LocationFix::try_from(raw).map_err(|e| e.to_string()))
        {
            Ok(fix) => fix,
            Err(diagnostic) => {
                Self::quick_action_failed(model, action, diagnostic);
                return;
            }
        };

        let make_event = move |result| Event::QuickShareResolved {
            id,
            action,
            fix,
            result,
        };
        match action {
            QuickAction::CopyLocation => caps.share.copy(fix.map_link(), make_event),
            QuickAction::ShareLocation => {
                caps.share.share_or_copy(ShareContent::plain(&fix), make_event);
            }
        }
    }

    fn quick_share_resolved(
        model: &mut Model,
        id: &QuickActionId,
        action: QuickAction,
        fix: LocationFix,
        result: ShareResult,
    ) {
        if !Self::is_pending_quick_action(model, id) {
            debug!(id = %id, "discarding stale quick share result");
            return;
        }

        match result {
            Ok(ShareOutcome::CopiedToClipboard) => {
                info!(action = action.name(), "location copied to clipboard");
                model.quick_action = None;
                model.last_sent_location = Some(fix);
                model.notice = Some(action.copied_notice().to_string());
            }
            Ok(ShareOutcome::Shared { recipients }) => {
                info!(action = action.name(), recipients, "location shared");
                model.quick_action = None;
            }
            Err(e) => {
                Self::quick_action_failed(model, action, CapabilityError::from(e).to_string());
            }
        }
    }

    fn config_received(model: &mut Model, json: &str) {
        match SosConfig::from_json(json) {
            Ok(config) => {
                info!(
                    endpoint = config.sos_endpoint().as_str(),
                    location_timeout_ms = config.location_timeout_ms(),
                    dispatch_timeout_ms = config.dispatch_timeout_ms(),
                    "config applied"
                );
                model.config = config;
                model.config_error = None;
            }
            Err(e) => {
                warn!(error = %e, "config rejected, keeping previous");
                model.config_error = Some(e.to_string());
            }
        }
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        debug!(
            event = event.name(),
            user = event.is_user_initiated(),
            state = model.state.name(),
            "update"
        );

        match event {
            Event::ConfigReceived { json } => Self::config_received(model, &json),
            Event::SosTriggered => Self::trigger(model),
            Event::SosConfirmed => Self::confirm(model, caps),
            Event::SosCancelled => Self::cancel(model),
            Event::MessageAcknowledged => Self::acknowledge(model),
            Event::CallRequested { service } => Self::call(model, service, caps),
            Event::CopyLocationRequested => {
                Self::start_quick_action(model, QuickAction::CopyLocation, caps);
            }
            Event::ShareLocationRequested => {
                Self::start_quick_action(model, QuickAction::ShareLocation, caps);
            }
            Event::SosLocationResolved { session, result } => {
                Self::location_resolved(model, &session, *result, caps);
            }
            Event::SosShareResolved {
                session,
                fix,
                result,
            } => Self::share_resolved(model, &session, fix, result),
            Event::SosDispatchResolved { session, result } => {
                Self::dispatch_resolved(model, &session, &result);
            }
            Event::QuickLocationResolved { id, action, result } => {
                Self::quick_location_resolved(model, id, action, *result, caps);
            }
            Event::QuickShareResolved {
                id,
                action,
                fix,
                result,
            } => Self::quick_share_resolved(model, &id, action, fix, result),
            Event::CallResolved { service, result } => {
                Self::call_resolved(model, service, result);
            }
        }

        caps.render.render();
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel {
            sos: SosView::from_state(&model.state),
            quick_dial: QuickDialButton::all(&model.config),
            last_sent_location: model.last_sent_location.as_ref().map(LocationFix::display),
            notice: model.notice.clone(),
            share_hint: model.share_hint.clone(),
            config_warning: model
                .config_error
                .as_ref()
                .map(|e| format!("Configuration rejected, using previous settings: {e}")),
        }
    }
}
