//! Stock reducers over numeric values.

mod max;
mod mean;

pub use max::Max;
pub use mean::{Mean, MeanAcc};

/// Render a float the way the intermediate and final files spell numbers:
/// whole values keep a trailing `.0` (`2.0`, not `2`).
pub fn format_number(value: f64) -> String {
    format!("{value:?}")
}
