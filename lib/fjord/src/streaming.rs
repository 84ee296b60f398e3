//! Single-process stdin/stdout stages, meant to be chained through an
//! external sort:
//!
//! ```text
//! ngram_map < input.txt | fs_sort | ngram_reduce > results.csv
//! ```

use crate::api::{Mapper, Reducer};
use crate::error::Result;
use crate::io::{for_each_line, RecordFormat};
use crate::map::{map_records, MapFailure};
use crate::reduce::{parse_line, write_result};
use crate::stats::{MapTaskStats, ReduceTaskStats};
use crate::utils::elapsed_ms;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::debug;

/// Map every record of `input`, writing `key<TAB>value` lines to `output`.
pub fn map_stream<M, F, R, W>(
    mapper: &M,
    format: &F,
    input: R,
    mut output: W,
) -> Result<MapTaskStats>
where
    M: Mapper,
    F: RecordFormat,
    R: BufRead,
    W: Write,
{
    let start = Instant::now();
    let mut stats = map_records(mapper, format.records(input), &mut output)
        .map_err(MapFailure::into_inner)?;
    output.flush()?;
    stats.wall_ms = elapsed_ms(start);
    debug!(records = stats.records_in, pairs = stats.pairs_out, "map stream done");
    Ok(stats)
}

/// Reduce `key<TAB>value` lines that arrive grouped by key.
///
/// Each contiguous run of one key is one group, so input that is not sorted
/// (or at least grouped) produces one result per run, not per key. The last
/// group is written once the input ends.
pub fn reduce_sorted<Red, R, W>(
    reducer: &Red,
    input: R,
    mut output: W,
) -> Result<ReduceTaskStats>
where
    Red: Reducer,
    R: BufRead,
    W: Write,
{
    let start = Instant::now();
    let mut stats = ReduceTaskStats::default();
    let mut current: Option<(String, Red::Acc)> = None;

    for_each_line(input, |line| {
        if line.is_empty() {
            return Ok(());
        }
        stats.lines_in += 1;
        let Some((key, value)) = parse_line(reducer, line) else {
            stats.lines_skipped += 1;
            return Ok(());
        };
        match &mut current {
            Some((cur, acc)) if cur.as_str() == key => reducer.fold(acc, value),
            slot => {
                let fresh = (key.to_owned(), reducer.init(value));
                if let Some((done, acc)) = slot.replace(fresh) {
                    write_result(&mut output, &done, &reducer.finish(acc))?;
                    stats.groups += 1;
                }
            }
        }
        Ok(())
    })?;

    if let Some((done, acc)) = current.take() {
        write_result(&mut output, &done, &reducer.finish(acc))?;
        stats.groups += 1;
    }
    output.flush()?;
    stats.wall_ms = elapsed_ms(start);
    debug!(lines = stats.lines_in, groups = stats.groups, "reduce stream done");
    Ok(stats)
}
