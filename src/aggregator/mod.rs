/// Bounded sample history with status and trend classification
pub mod history;

pub use history::{HistoryBuffer, Status, Trend};
