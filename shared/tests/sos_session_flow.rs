mod common;

use common::{position, response, Harness, MAP_LINK};
use shared::capabilities::{
    HttpError, HttpMethod, HttpOperation, LocationError, LocationOperation, ShareError,
    ShareOperation, ShareOutput,
};
use shared::{Event, FailureReason, MessageKind, SessionState, SosStatus};

#[test]
fn test_successful_sos_session() {
    let mut h = Harness::new();

    let effects = h.send(Event::SosTriggered);
    assert_eq!(*h.model.state(), SessionState::AwaitingConfirmation);
    assert!(effects.is_silent(), "no location or network before approval");
    assert_eq!(effects.renders, 1);

    let mut location = h.confirmed_session();
    let LocationOperation::Acquire(request) = &location.operation;
    assert_eq!(request.timeout_ms, 10_000);
    assert_eq!(request.maximum_age_ms, 0);
    assert_eq!(*h.model.state(), SessionState::AcquiringLocation);

    let mut effects = h.resolve(&mut location, Ok(position()));
    assert_eq!(*h.model.state(), SessionState::Dispatching);
    assert_eq!(effects.share.len(), 1);
    assert_eq!(effects.http.len(), 1);

    let HttpOperation::Execute(http) = &effects.http[0].operation;
    assert_eq!(http.method(), HttpMethod::Post);
    assert_eq!(http.endpoint().as_str(), "/api/sos");
    let body: serde_json::Value = serde_json::from_slice(http.body().unwrap()).unwrap();
    assert_eq!(body["lat"], 12.9);
    assert_eq!(body["lng"], 77.6);
    assert_eq!(body["accuracy"], 15.0);
    assert_eq!(body["timestamp"], 1_700_000_000_000_u64);
    assert_eq!(body["userAgent"], "unknown");

    let mut dispatch = effects.http.remove(0);
    let effects = h.resolve(&mut dispatch, response(200, "{}"));
    assert!(effects.http.is_empty());
    assert_eq!(*h.model.state(), SessionState::Succeeded);

    let view = h.app.view(&h.model);
    assert_eq!(view.sos.status, SosStatus::Success);
    let message = view.sos.message.unwrap();
    assert_eq!(message.kind, MessageKind::Success);
    assert_eq!(message.text, "SOS sent — authorities notified.");
    assert_eq!(
        view.last_sent_location.as_deref(),
        Some("12.90000, 77.60000 (±15m)")
    );
}

#[test]
fn test_permission_denied_fails_without_dispatch() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();

    let effects = h.resolve(&mut location, Err(LocationError::PermissionDenied));
    assert!(effects.is_silent());
    assert_eq!(
        *h.model.state(),
        SessionState::Failed(FailureReason::PermissionDenied)
    );

    let view = h.app.view(&h.model);
    assert_eq!(view.sos.status, SosStatus::Failure);
    assert_eq!(view.sos.failure_code.as_deref(), Some("LOCATION_PERMISSION_DENIED"));
    assert!(view.sos.message.unwrap().text.contains("enable location permissions"));
    assert_eq!(view.last_sent_location, None);
}

#[test]
fn test_unsupported_location_suggests_direct_call() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();

    let effects = h.resolve(&mut location, Err(LocationError::Unsupported));
    assert!(effects.is_silent());
    assert_eq!(
        *h.model.state(),
        SessionState::Failed(FailureReason::Unsupported)
    );

    let view = h.app.view(&h.model);
    assert!(view.sos.suggest_direct_call);
    assert!(!view.sos.suggest_retry);
    assert_eq!(view.sos.failure_code.as_deref(), Some("LOCATION_UNSUPPORTED"));
    let text = view.sos.message.unwrap().text;
    assert!(text.contains("quick call buttons"));
    for other in [
        FailureReason::PermissionDenied,
        FailureReason::Timeout,
        FailureReason::PositionUnavailable,
    ] {
        assert_ne!(text, other.user_facing_message());
    }
}

#[test]
fn test_location_timeout_fails_session() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();

    let effects = h.resolve(
        &mut location,
        Err(LocationError::Timeout { timeout_ms: 10_000 }),
    );
    assert!(effects.http.is_empty());
    assert_eq!(*h.model.state(), SessionState::Failed(FailureReason::Timeout));
}

#[test]
fn test_invalid_fix_counts_as_unavailable() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();

    let mut bogus = position();
    bogus.latitude = f64::NAN;
    let effects = h.resolve(&mut location, Ok(bogus));
    assert!(effects.http.is_empty());
    assert_eq!(
        *h.model.state(),
        SessionState::Failed(FailureReason::PositionUnavailable)
    );
}

#[test]
fn test_server_rejection_keeps_detail_internal() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut effects = h.resolve(&mut location, Ok(position()));

    let mut dispatch = effects.http.remove(0);
    h.resolve(&mut dispatch, response(500, "internal error"));

    assert_eq!(
        *h.model.state(),
        SessionState::Failed(FailureReason::ServerRejected { status: 500 })
    );
    assert_eq!(h.model.last_diagnostic(), Some("internal error"));

    let view = h.app.view(&h.model);
    assert!(view.sos.suggest_direct_call);
    let text = view.sos.message.unwrap().text;
    assert_eq!(text, "Failed to send SOS. Please try calling local services.");
    assert!(!text.contains("internal error"));
    assert_eq!(view.last_sent_location, None);
}

#[test]
fn test_transport_failure() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut effects = h.resolve(&mut location, Ok(position()));

    let mut dispatch = effects.http.remove(0);
    h.resolve(
        &mut dispatch,
        Err(HttpError::ConnectionError {
            host: "sos.example".into(),
            message: "connection reset".into(),
        }),
    );
    assert_eq!(
        *h.model.state(),
        SessionState::Failed(FailureReason::TransportFailure)
    );
    assert!(h.model.last_diagnostic().unwrap().contains("connection reset"));
}

#[test]
fn test_cancel_at_gate_makes_no_calls() {
    let mut h = Harness::new();

    let mut effects = h.send(Event::SosTriggered);
    assert!(effects.is_silent());
    effects = h.send(Event::SosCancelled);
    assert!(effects.is_silent());

    assert_eq!(*h.model.state(), SessionState::Idle);
    let view = h.app.view(&h.model);
    assert_eq!(view.sos.status, SosStatus::Idle);
    assert!(view.sos.prompt.is_none());
}

#[test]
fn test_confirm_after_cancel_is_ignored() {
    let mut h = Harness::new();
    h.send(Event::SosTriggered);
    h.send(Event::SosCancelled);

    let effects = h.send(Event::SosConfirmed);
    assert!(effects.is_silent());
    assert_eq!(*h.model.state(), SessionState::Idle);
}

#[test]
fn test_peer_share_unavailable_falls_back_to_clipboard() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut first = h.resolve(&mut location, Ok(position()));
    let mut dispatch = first.http.remove(0);
    let mut share = first.share.remove(0);

    match &share.operation {
        ShareOperation::PeerShare { title, text, url } => {
            assert_eq!(title, "Emergency — please help");
            assert_eq!(text, &format!("I'm in an emergency. My location: {MAP_LINK}"));
            assert_eq!(url, MAP_LINK);
        }
        ShareOperation::CopyToClipboard { .. } => panic!("expected peer share first"),
    }

    let mut effects = h.resolve(&mut share, Err(ShareError::Unavailable));
    assert_eq!(effects.share.len(), 1);
    let mut clipboard = effects.share.remove(0);
    assert_eq!(
        clipboard.operation,
        ShareOperation::CopyToClipboard {
            text: MAP_LINK.to_string()
        }
    );

    h.resolve(&mut clipboard, Ok(ShareOutput::Copied));
    assert_eq!(*h.model.state(), SessionState::Dispatching);
    assert_eq!(
        h.app.view(&h.model).last_sent_location.as_deref(),
        Some("12.90000, 77.60000 (±15m)")
    );

    h.resolve(&mut dispatch, response(201, ""));
    assert_eq!(*h.model.state(), SessionState::Succeeded);
}

#[test]
fn test_dismissed_share_sheet_is_benign() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut first = h.resolve(&mut location, Ok(position()));
    let mut share = first.share.remove(0);

    let effects = h.resolve(&mut share, Ok(ShareOutput::Dismissed));
    assert!(effects.share.is_empty());
    assert_eq!(*h.model.state(), SessionState::Dispatching);
    assert_eq!(h.app.view(&h.model).share_hint, None);
}

#[test]
fn test_share_denied_does_not_abort_session() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut first = h.resolve(&mut location, Ok(position()));
    let mut dispatch = first.http.remove(0);
    let mut share = first.share.remove(0);

    h.resolve(
        &mut share,
        Err(ShareError::Denied {
            reason: "not allowed".into(),
        }),
    );
    assert_eq!(*h.model.state(), SessionState::Dispatching);
    assert!(h.app.view(&h.model).share_hint.is_some());

    h.resolve(&mut dispatch, response(200, ""));
    assert_eq!(*h.model.state(), SessionState::Succeeded);
}

#[test]
fn test_repeated_triggers_dispatch_once() {
    let mut h = Harness::new();

    h.send(Event::SosTriggered);
    let effects = h.send(Event::SosTriggered);
    assert!(effects.is_silent());

    let mut location = h.confirmed_session();
    let effects = h.send(Event::SosConfirmed);
    assert!(effects.is_silent(), "second approval must not acquire again");
    let effects = h.send(Event::SosTriggered);
    assert!(effects.is_silent());

    let first = h.resolve(&mut location, Ok(position()));
    assert_eq!(first.http.len(), 1);

    let effects = h.send(Event::SosConfirmed);
    assert!(effects.is_silent());
}

#[test]
fn test_late_cancel_discards_location() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();

    h.send(Event::SosCancelled);
    assert_eq!(*h.model.state(), SessionState::Idle);

    let effects = h.resolve(&mut location, Ok(position()));
    assert!(effects.is_silent());
    assert_eq!(*h.model.state(), SessionState::Idle);
    assert_eq!(h.model.last_sent_location(), None);
}

#[test]
fn test_stale_location_does_not_leak_into_next_session() {
    let mut h = Harness::new();
    let mut stale = h.confirmed_session();
    h.send(Event::SosCancelled);

    let _fresh = h.confirmed_session();
    let effects = h.resolve(&mut stale, Ok(position()));
    assert!(effects.http.is_empty());
    assert_eq!(*h.model.state(), SessionState::AcquiringLocation);
}

#[test]
fn test_cancel_during_dispatch_is_ignored() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut first = h.resolve(&mut location, Ok(position()));

    h.send(Event::SosCancelled);
    assert_eq!(*h.model.state(), SessionState::Dispatching);

    let mut dispatch = first.http.remove(0);
    h.resolve(&mut dispatch, response(200, ""));
    assert_eq!(*h.model.state(), SessionState::Succeeded);
}

#[test]
fn test_acknowledge_returns_to_idle_and_keeps_last_location() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut first = h.resolve(&mut location, Ok(position()));
    let mut dispatch = first.http.remove(0);
    h.resolve(&mut dispatch, response(200, ""));

    h.send(Event::MessageAcknowledged);
    assert_eq!(*h.model.state(), SessionState::Idle);
    let view = h.app.view(&h.model);
    assert_eq!(view.sos.status, SosStatus::Idle);
    assert!(view.sos.message.is_none());
    assert!(view.last_sent_location.is_some());
}

#[test]
fn test_retry_after_failure_is_a_fresh_session() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    h.resolve(&mut location, Err(LocationError::PermissionDenied));

    let effects = h.send(Event::SosTriggered);
    assert!(effects.is_silent());
    assert_eq!(*h.model.state(), SessionState::AwaitingConfirmation);
}

#[test]
fn test_superseded_share_result_is_ignored() {
    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut first = h.resolve(&mut location, Ok(position()));
    let mut dispatch = first.http.remove(0);
    let mut old_share = first.share.remove(0);
    h.resolve(&mut dispatch, response(200, "{}"));
    assert_eq!(*h.model.state(), SessionState::Succeeded);

    h.send(Event::SosTriggered);
    assert_eq!(*h.model.state(), SessionState::AwaitingConfirmation);

    let effects = h.resolve(
        &mut old_share,
        Err(ShareError::Denied {
            reason: "not allowed".into(),
        }),
    );
    assert!(effects.is_silent());
    assert_eq!(*h.model.state(), SessionState::AwaitingConfirmation);
    assert_eq!(h.app.view(&h.model).share_hint, None);
    assert_eq!(h.model.last_diagnostic(), None);

    let effects = h.send(Event::SosConfirmed);
    assert_eq!(effects.location.len(), 1);
    assert_eq!(*h.model.state(), SessionState::AcquiringLocation);
}

#[test]
fn test_trigger_from_succeeded_opens_new_session() {
    fn idempotency_key(request: &shared::capabilities::HttpRequest) -> String {
        request
            .headers()
            .get("Idempotency-Key")
            .expect("dispatch carries an idempotency key")
            .to_string()
    }

    let mut h = Harness::new();
    let mut location = h.confirmed_session();
    let mut first = h.resolve(&mut location, Ok(position()));
    let mut dispatch = first.http.remove(0);
    let HttpOperation::Execute(request) = &dispatch.operation;
    let first_key = idempotency_key(request);
    h.resolve(&mut dispatch, response(200, "{}"));
    assert_eq!(*h.model.state(), SessionState::Succeeded);

    let effects = h.send(Event::SosTriggered);
    assert!(effects.is_silent());
    assert_eq!(*h.model.state(), SessionState::AwaitingConfirmation);
    let view = h.app.view(&h.model);
    assert_eq!(view.sos.status, SosStatus::Confirming);
    assert!(view.sos.prompt.is_some());

    let mut location = h.send(Event::SosConfirmed).location.remove(0);
    let mut second = h.resolve(&mut location, Ok(position()));
    assert_eq!(second.http.len(), 1);
    let dispatch = second.http.remove(0);
    let HttpOperation::Execute(request) = &dispatch.operation;
    assert_ne!(idempotency_key(request), first_key);
}

#[test]
fn test_config_applies_endpoint_and_timeouts() {
    let mut h = Harness::new();
    h.send(Event::ConfigReceived {
        json: r#"{
            "sosEndpoint": "https://sos.example.org/v1/alerts",
            "locationTimeoutMs": 5000,
            "dispatchTimeoutMs": 8000,
            "clientContext": "panel/2.1"
        }"#
        .into(),
    });

    let mut location = h.confirmed_session();
    let LocationOperation::Acquire(request) = &location.operation;
    assert_eq!(request.timeout_ms, 5000);

    let first = h.resolve(&mut location, Ok(position()));
    let HttpOperation::Execute(http) = &first.http[0].operation;
    assert_eq!(http.endpoint().as_str(), "https://sos.example.org/v1/alerts");
    assert_eq!(http.timeout_ms(), 8000);
    let body: serde_json::Value = serde_json::from_slice(http.body().unwrap()).unwrap();
    assert_eq!(body["userAgent"], "panel/2.1");
}

#[test]
fn test_invalid_config_keeps_previous() {
    let mut h = Harness::new();
    h.send(Event::ConfigReceived {
        json: r#"{"police": "100"}"#.into(),
    });
    h.send(Event::ConfigReceived {
        json: r#"{"police": "dial me", "fire": "101"}"#.into(),
    });

    let view = h.app.view(&h.model);
    assert!(view.config_warning.is_some());
    assert_eq!(view.quick_dial[0].number, "100");
    assert_eq!(view.quick_dial[2].number, "+112");
}

#[test]
fn test_every_event_renders() {
    let mut h = Harness::new();
    for event in [
        Event::SosTriggered,
        Event::SosCancelled,
        Event::MessageAcknowledged,
    ] {
        assert_eq!(h.send(event).renders, 1);
    }
}
