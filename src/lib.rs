pub mod clickup;
pub mod config;
pub mod error;
pub mod handlers;
pub mod stub;
pub mod suite;

pub use error::{AppError, AppResult, Error};
pub use stub::{SharedStubState, Store, StubState, create_app};
pub use suite::{RunReport, Step, Suite};

use std::time::Duration;

/// Renders a latency in µs below a millisecond, ms below a second, else seconds.
pub(crate) fn format_latency(latency: Duration) -> String {
    if latency < Duration::from_millis(1) {
        format!("{}µs", latency.as_micros())
    } else if latency < Duration::from_secs(1) {
        format!("{}ms", latency.as_millis())
    } else {
        format!("{:.1}s", latency.as_secs_f64())
    }
}
