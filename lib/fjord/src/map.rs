use crate::api::Mapper;
use crate::error::{IoContext, Result};
use crate::io::{is_encodable, open_records, open_writer, write_kv, Record, RecordFormat};
use crate::stats::MapTaskStats;
use crate::utils::elapsed_ms;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::debug;

/// One map worker's assignment: a single input partition and the single
/// output file it owns.
#[derive(Clone, Debug)]
pub struct MapTask {
    pub index: usize,
    pub input: PathBuf,
    pub output: PathBuf,
}

pub fn run_map_task<M, F>(mapper: &M, format: &F, task: &MapTask) -> Result<MapTaskStats>
where
    M: Mapper,
    F: RecordFormat,
{
    let start = Instant::now();
    debug!(task = task.index, input = %task.input.display(), "map task starting");
    let records = open_records(&task.input, format)?;
    let mut writer = open_writer(&task.output)?;
    let mut stats = match map_records(mapper, records, &mut writer) {
        Ok(stats) => stats,
        Err(MapFailure::Read(e)) => return Err(e).at(&task.input),
        Err(MapFailure::Write(e)) => return Err(e).at(&task.output),
    };
    writer.flush().at(&task.output)?;
    stats.task = task.index;
    stats.wall_ms = elapsed_ms(start);
    debug!(
        task = task.index,
        records = stats.records_in,
        pairs = stats.pairs_out,
        dropped = stats.pairs_dropped,
        wall_ms = stats.wall_ms,
        "map task done"
    );
    Ok(stats)
}

/// Which side of a map task failed.
#[derive(Debug)]
pub(crate) enum MapFailure {
    Read(io::Error),
    Write(io::Error),
}

impl MapFailure {
    pub(crate) fn into_inner(self) -> io::Error {
        match self {
            MapFailure::Read(e) | MapFailure::Write(e) => e,
        }
    }
}

/// Run `mapper` over `records`, writing each pair as a `key<TAB>value` line.
/// The first read or write error stops the task.
pub(crate) fn map_records<M, I, W>(
    mapper: &M,
    records: I,
    out: &mut W,
) -> std::result::Result<MapTaskStats, MapFailure>
where
    M: Mapper,
    I: IntoIterator<Item = io::Result<Record>>,
    W: Write,
{
    let mut stats = MapTaskStats::default();
    let mut failed: Option<io::Error> = None;
    for record in records {
        let record = record.map_err(MapFailure::Read)?;
        stats.records_in += 1;
        mapper.do_map(&record, &mut |key: String, value: String| {
            if failed.is_some() {
                return;
            }
            if !is_encodable(&key, &value) {
                stats.pairs_dropped += 1;
                return;
            }
            match write_kv(&mut *out, &key, &value) {
                Ok(n) => {
                    stats.pairs_out += 1;
                    stats.bytes_out += n as u64;
                }
                Err(e) => failed = Some(e),
            }
        });
        if let Some(e) = failed.take() {
            return Err(MapFailure::Write(e));
        }
    }
    Ok(stats)
}
