use crate::api::Reducer;
use crate::error::{IoContext, Result};
use crate::io::{for_each_line, open_reader, open_writer, split_kv_bytes};
use crate::stats::ReduceTaskStats;
use crate::utils::elapsed_ms;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};

/// One reduce worker's assignment: its shuffle bucket and the output file it
/// owns.
#[derive(Clone, Debug)]
pub struct ReduceTask {
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
}

pub fn run_reduce_task<R>(reducer: &R, task: &ReduceTask) -> Result<ReduceTaskStats>
where
    R: Reducer,
{
    let start = Instant::now();
    debug!(bucket = task.index, input = %task.input.display(), "reduce task starting");
    let reader = open_reader(&task.input)?;
    let grouped = group_lines(reducer, reader).at(&task.input)?;
    let mut stats = grouped.stats;

    let mut writer = open_writer(&task.output)?;
    for (key, acc) in grouped.groups {
        write_result(&mut writer, &key, &reducer.finish(acc)).at(&task.output)?;
    }
    writer.flush().at(&task.output)?;

    if stats.lines_skipped > 0 {
        warn!(
            bucket = task.index,
            skipped = stats.lines_skipped,
            "skipped malformed shuffle lines"
        );
    }
    stats.bucket = task.index;
    stats.wall_ms = elapsed_ms(start);
    debug!(
        bucket = task.index,
        lines = stats.lines_in,
        groups = stats.groups,
        wall_ms = stats.wall_ms,
        "reduce task done"
    );
    Ok(stats)
}

pub(crate) struct Grouped<A> {
    /// Keys in the order they were first seen, with their folded values.
    pub groups: Vec<(String, A)>,
    pub stats: ReduceTaskStats,
}

/// Fold every `key<TAB>value` line of `input` into per-key accumulators.
///
/// Keys need not be contiguous. Lines without a tab, with a non utf-8 key or
/// with a value the reducer cannot parse are counted and skipped.
pub(crate) fn group_lines<R, B>(reducer: &R, input: B) -> std::io::Result<Grouped<R::Acc>>
where
    R: Reducer,
    B: BufRead,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, R::Acc)> = Vec::new();
    let mut stats = ReduceTaskStats::default();

    for_each_line(input, |line| {
        if line.is_empty() {
            return Ok(());
        }
        stats.lines_in += 1;
        let Some((key, value)) = parse_line(reducer, line) else {
            stats.lines_skipped += 1;
            return Ok(());
        };
        match index.get(key) {
            Some(&slot) => reducer.fold(&mut groups[slot].1, value),
            None => {
                index.insert(key.to_owned(), groups.len());
                groups.push((key.to_owned(), reducer.init(value)));
            }
        }
        Ok(())
    })?;

    stats.groups = groups.len() as u64;
    Ok(Grouped { groups, stats })
}

/// Split a shuffle line into its utf-8 key and parsed value.
pub(crate) fn parse_line<'a, R>(reducer: &R, line: &'a [u8]) -> Option<(&'a str, R::Value)>
where
    R: Reducer,
{
    let (k, v) = split_kv_bytes(line)?;
    let key = std::str::from_utf8(k).ok()?;
    let value = reducer.parse(std::str::from_utf8(v).ok()?)?;
    Some((key, value))
}

/// Final output line: `key,result`.
pub(crate) fn write_result<W>(writer: &mut W, key: &str, result: &str) -> std::io::Result<()>
where
    W: Write,
{
    writer.write_all(key.as_bytes())?;
    writer.write_all(b",")?;
    writer.write_all(result.as_bytes())?;
    writer.write_all(b"\n")
}
