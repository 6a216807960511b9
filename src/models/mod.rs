// Domain models

mod snapshot;

pub use snapshot::{
    MetricSnapshot, NO_IP, NOT_AVAILABLE, Reading, Readings, SampleError, TIMESTAMP_FORMAT,
    format_celsius, format_percent,
};
