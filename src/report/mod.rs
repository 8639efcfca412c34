/// Report rendering and the clock it stamps reports with
pub mod clock;
pub mod formatter;

pub use clock::{Clock, SystemClock};
pub use formatter::{ReportFormatter, ReportSnapshot, NO_DATA_REPORT};

#[cfg(test)]
pub use clock::MockClock;
