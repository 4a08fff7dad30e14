#![allow(dead_code)]

use crux_core::capability::Operation;
use crux_core::testing::AppTester;
use crux_core::Request;
use shared::capabilities::{
    DialerOperation, HttpHeaders, HttpOperation, HttpResponse, HttpResult, LocationOperation,
    RawPosition, ShareOperation,
};
use shared::{App, Effect, Event, Model};

/// Effects of one step, grouped by capability.
#[derive(Default)]
pub struct Effects {
    pub renders: usize,
    pub location: Vec<Request<LocationOperation>>,
    pub http: Vec<Request<HttpOperation>>,
    pub share: Vec<Request<ShareOperation>>,
    pub dialer: Vec<Request<DialerOperation>>,
}

impl Effects {
    fn absorb(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Render(_) => self.renders += 1,
                Effect::Location(request) => self.location.push(request),
                Effect::Http(request) => self.http.push(request),
                Effect::Share(request) => self.share.push(request),
                Effect::Dialer(request) => self.dialer.push(request),
            }
        }
    }

    pub fn is_silent(&self) -> bool {
        self.location.is_empty()
            && self.http.is_empty()
            && self.share.is_empty()
            && self.dialer.is_empty()
    }
}

pub struct Harness {
    pub app: AppTester<App, Effect>,
    pub model: Model,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            app: AppTester::default(),
            model: Model::default(),
        }
    }

    pub fn send(&mut self, event: Event) -> Effects {
        let mut effects = Effects::default();
        self.drain(vec![event], &mut effects);
        effects
    }

    pub fn resolve<Op: Operation>(&mut self, request: &mut Request<Op>, output: Op::Output) -> Effects {
        let update = self
            .app
            .resolve(request, output)
            .expect("request should resolve");
        let mut effects = Effects::default();
        effects.absorb(update.effects);
        self.drain(update.events, &mut effects);
        effects
    }

    fn drain(&mut self, events: Vec<Event>, effects: &mut Effects) {
        let mut queue = std::collections::VecDeque::from(events);
        while let Some(event) = queue.pop_front() {
            let update = self.app.update(event, &mut self.model);
            effects.absorb(update.effects);
            queue.extend(update.events);
        }
    }

    /// Trigger and confirm, returning the pending location request.
    pub fn confirmed_session(&mut self) -> Request<LocationOperation> {
        self.send(Event::SosTriggered);
        let mut effects = self.send(Event::SosConfirmed);
        assert_eq!(effects.location.len(), 1, "exactly one location request");
        effects.location.remove(0)
    }
}

pub fn position() -> RawPosition {
    RawPosition {
        latitude: 12.9,
        longitude: 77.6,
        accuracy_meters: 15.0,
        timestamp_ms: 1_700_000_000_000,
    }
}

pub fn response(status: u16, body: &str) -> HttpResult {
    Ok(HttpResponse::new(
        status,
        HttpHeaders::new(),
        body.as_bytes().to_vec(),
        "req-test".to_string(),
        42,
    ))
}

pub const MAP_LINK: &str = "https://maps.google.com/?q=12.9,77.6";
