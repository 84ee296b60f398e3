use super::format_number;
use crate::api::Reducer;

/// Arithmetic mean of every value under a key.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mean;

#[derive(Clone, Copy, Debug)]
pub struct MeanAcc {
    sum: f64,
    count: u64,
}

impl Reducer for Mean {
    type Value = f64;
    type Acc = MeanAcc;

    fn init(&self, first: f64) -> MeanAcc {
        MeanAcc { sum: first, count: 1 }
    }

    fn fold(&self, acc: &mut MeanAcc, value: f64) {
        acc.sum += value;
        acc.count += 1;
    }

    fn finish(&self, acc: MeanAcc) -> String {
        format_number(acc.sum / acc.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_all_values() {
        assert_eq!(Mean.reduce([1.0, 3.0]).as_deref(), Some("2.0"));
        assert_eq!(Mean.reduce([5.0]).as_deref(), Some("5.0"));
        assert_eq!(Mean.reduce([1.0, 2.0]).as_deref(), Some("1.5"));
    }

    #[test]
    fn parses_integer_counts_as_floats() {
        assert_eq!(Mean.parse(" 12 "), Some(12.0));
        assert_eq!(Mean.parse("n/a"), None);
    }
}
