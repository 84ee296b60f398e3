use serde::Serialize;
use std::path::PathBuf;

#[derive(Default, Clone, Debug, Serialize)]
pub struct MapTaskStats {
    pub task: usize,
    pub records_in: u64,
    pub pairs_out: u64,
    /// Pairs whose key or value cannot be written as a `key<TAB>value` line.
    pub pairs_dropped: u64,
    pub bytes_out: u64,
    pub wall_ms: u64,
}

#[derive(Default, Clone, Debug, Serialize)]
pub struct MapStats {
    pub tasks: usize,
    pub total_records: u64,
    pub total_pairs: u64,
    pub total_dropped: u64,
    pub total_bytes_out: u64,
    pub min_task_ms: u64,
    pub max_task_ms: u64,
    pub wall_ms: u64,
}

impl MapStats {
    pub fn aggregate(per_task: &[MapTaskStats], wall_ms: u64) -> Self {
        Self {
            tasks: per_task.len(),
            total_records: per_task.iter().map(|t| t.records_in).sum(),
            total_pairs: per_task.iter().map(|t| t.pairs_out).sum(),
            total_dropped: per_task.iter().map(|t| t.pairs_dropped).sum(),
            total_bytes_out: per_task.iter().map(|t| t.bytes_out).sum(),
            min_task_ms: per_task.iter().map(|t| t.wall_ms).min().unwrap_or(0),
            max_task_ms: per_task.iter().map(|t| t.wall_ms).max().unwrap_or(0),
            wall_ms,
        }
    }
}

#[derive(Default, Clone, Debug, Serialize)]
pub struct ShuffleStats {
    pub inputs: usize,
    pub lines_in: u64,
    pub lines_skipped: u64,
    /// Lines written to each bucket, by bucket index.
    pub bucket_lines: Vec<u64>,
    pub spills: u64,
    pub wall_ms: u64,
}

#[derive(Default, Clone, Debug, Serialize)]
pub struct ReduceTaskStats {
    pub bucket: usize,
    pub lines_in: u64,
    pub lines_skipped: u64,
    pub groups: u64,
    pub wall_ms: u64,
}

#[derive(Default, Clone, Debug, Serialize)]
pub struct ReduceStats {
    pub reducers: usize,
    pub total_lines: u64,
    pub total_skipped: u64,
    pub total_groups: u64,
    pub min_reducer_ms: u64,
    pub max_reducer_ms: u64,
    pub wall_ms: u64,
}

impl ReduceStats {
    pub fn aggregate(per_task: &[ReduceTaskStats], wall_ms: u64) -> Self {
        Self {
            reducers: per_task.len(),
            total_lines: per_task.iter().map(|t| t.lines_in).sum(),
            total_skipped: per_task.iter().map(|t| t.lines_skipped).sum(),
            total_groups: per_task.iter().map(|t| t.groups).sum(),
            min_reducer_ms: per_task.iter().map(|t| t.wall_ms).min().unwrap_or(0),
            max_reducer_ms: per_task.iter().map(|t| t.wall_ms).max().unwrap_or(0),
            wall_ms,
        }
    }
}

#[derive(Default, Clone, Debug, Serialize)]
pub struct MergeStats {
    pub inputs: usize,
    pub bytes_out: u64,
    pub wall_ms: u64,
}

/// What a finished run reports back to the caller.
#[derive(Clone, Debug, Serialize)]
pub struct RunSummary {
    pub output: PathBuf,
    pub map: MapStats,
    pub shuffle: ShuffleStats,
    pub reduce: ReduceStats,
    pub merge: MergeStats,
}

impl RunSummary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
