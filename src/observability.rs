use biometrics::{Collector, Counter};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("cicero.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("cicero.client.request_errors");

pub(crate) static STREAM_FRAMES: Counter = Counter::new("cicero.stream.frames");
pub(crate) static STREAM_DROPPED_FRAMES: Counter = Counter::new("cicero.stream.dropped_frames");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("cicero.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("cicero.stream.bytes");

pub(crate) static SESSION_TURNS: Counter = Counter::new("cicero.session.turns");
pub(crate) static SESSION_TURN_FAILURES: Counter = Counter::new("cicero.session.turn_failures");
pub(crate) static SESSION_TURN_INTERRUPTS: Counter = Counter::new("cicero.session.turn_interrupts");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_FRAMES);
    collector.register_counter(&STREAM_DROPPED_FRAMES);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_TURN_FAILURES);
    collector.register_counter(&SESSION_TURN_INTERRUPTS);
}
