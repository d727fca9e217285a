use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter},
};

pub struct ServerMetrics {
    open: Counter<u64>,
    handshakes: Counter<u64>,
    failures: Counter<u64>,
    status: Counter<u64>,
    players: Counter<u64>,
    duration: Histogram<u64>,
}

impl ServerMetrics {
    pub fn new(meter: &Meter) -> Self {
        Self {
            open: meter.u64_counter("minerva_socket_open_total").build(),
            handshakes: meter.u64_counter("minerva_handshake_total").build(),
            failures: meter.u64_counter("minerva_handshake_fail_total").build(),
            status: meter.u64_counter("minerva_status_response_total").build(),
            players: meter.u64_counter("minerva_player_identified_total").build(),
            duration: meter.u64_histogram("minerva_handshake_time_ms").build(),
        }
    }

    pub fn record_open(&self) {
        self.open.add(1, &[]);
    }

    pub fn record_handshake(&self, state: &'static str) {
        self.handshakes.add(1, &[KeyValue::new("state", state)]);
    }

    pub fn record_failure(&self, state: &'static str) {
        self.failures.add(1, &[KeyValue::new("state", state)]);
    }

    pub fn record_status(&self) {
        self.status.add(1, &[]);
    }

    pub fn record_player(&self) {
        self.players.add(1, &[]);
    }

    pub fn record_duration(&self, elapsed_ms: u64, state: &'static str) {
        self.duration
            .record(elapsed_ms, &[KeyValue::new("state", state)]);
    }
}
