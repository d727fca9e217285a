pub mod oltp;

use opentelemetry::{global, metrics::Meter};

/// Meter backed by whatever provider is installed globally; a no-op until `init_meter` runs.
pub fn get_meter() -> Meter {
    global::meter_provider().meter("minerva")
}
