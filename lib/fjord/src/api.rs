use crate::io::Record;
use std::str::FromStr;

// ========== Core MapReduce traits ==========

/// Per-record transform. Emits zero or more `(key, value)` pairs; a record the
/// mapper cannot interpret should simply emit nothing.
pub trait Mapper: Send + Sync {
    fn do_map<F>(&self, record: &Record, emit: &mut F)
    where
        F: FnMut(String, String);
}

/// Plain functions and closures returning their pairs work as mappers.
impl<T> Mapper for T
where
    T: Fn(&Record) -> Vec<(String, String)> + Send + Sync,
{
    fn do_map<F>(&self, record: &Record, emit: &mut F)
    where
        F: FnMut(String, String),
    {
        for (key, value) in self(record) {
            emit(key, value);
        }
    }
}

/// Incremental aggregation of every value that shares a key.
///
/// The framework parses each intermediate value into `Value`; values that fail
/// to parse are skipped. A group's accumulator is created from its first value
/// and folded with every later one, so `finish` never sees an empty group.
pub trait Reducer: Send + Sync {
    type Value: FromStr;
    type Acc;

    fn init(&self, first: Self::Value) -> Self::Acc;

    fn fold(&self, acc: &mut Self::Acc, value: Self::Value);

    /// Render the result written after `key,`.
    fn finish(&self, acc: Self::Acc) -> String;

    /// Reduce a whole group at once. `None` when there are no values.
    fn reduce<I>(&self, values: I) -> Option<String>
    where
        I: IntoIterator<Item = Self::Value>,
    {
        let mut values = values.into_iter();
        let mut acc = self.init(values.next()?);
        for value in values {
            self.fold(&mut acc, value);
        }
        Some(self.finish(acc))
    }

    /// Parse a raw intermediate value.
    fn parse(&self, raw: &str) -> Option<Self::Value> {
        raw.trim().parse().ok()
    }
}
