use super::format_number;
use crate::api::Reducer;

/// Largest value under a key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Max;

impl Reducer for Max {
    type Value = f64;
    type Acc = f64;

    fn init(&self, first: f64) -> f64 {
        first
    }

    fn fold(&self, acc: &mut f64, value: f64) {
        *acc = acc.max(value);
    }

    fn finish(&self, acc: f64) -> String {
        format_number(acc)
    }
}
