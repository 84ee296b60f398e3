use crate::api::{Mapper, Reducer};
use crate::config::JobConfig;
use crate::error::{Error, Result};
use crate::io::{ensure_dir, RecordFormat};
use crate::map::{run_map_task, MapTask};
use crate::merge::merge_outputs;
use crate::reduce::{run_reduce_task, ReduceTask};
use crate::shuffle::Shuffle;
use crate::stats::{MapStats, ReduceStats, RunSummary};
use crate::utils::elapsed_ms;
use rayon::prelude::*;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runs one job on the local machine: map, shuffle, reduce and merge, each
/// phase finishing completely before the next one starts.
pub struct RuntimePipeline {
    config: JobConfig,
}

impl RuntimePipeline {
    pub fn new(config: JobConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn map_reduce<M, R, F>(&self, mapper: M, reducer: R, format: F) -> Result<RunSummary>
    where
        M: Mapper,
        R: Reducer,
        F: RecordFormat,
    {
        let config = &self.config;
        let run_start = Instant::now();

        // Nothing touches the work dir until the job is known to be runnable.
        config.validate()?;
        let inputs = config.input_paths()?;
        ensure_dir(&config.work_dir)?;
        info!(
            n_map = config.n_map,
            n_reduce = config.n_reduce,
            work_dir = %config.work_dir.display(),
            "fjord starting map phase"
        );

        // Map phase
        let map_tasks: Vec<MapTask> = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| MapTask {
                index,
                input,
                output: config.map_output_path(index),
            })
            .collect();
        let map_start = Instant::now();
        let per_task = run_phase("map", &map_tasks, |task| {
            run_map_task(&mapper, &format, task)
        })?;
        let map = MapStats::aggregate(&per_task, elapsed_ms(map_start));
        info!(
            phase = "map",
            tasks = map.tasks,
            total_records = map.total_records,
            total_pairs = map.total_pairs,
            total_dropped = map.total_dropped,
            total_bytes_out = map.total_bytes_out,
            min_task_ms = map.min_task_ms,
            max_task_ms = map.max_task_ms,
            wall_ms = map.wall_ms,
            "Map phase complete"
        );

        // Shuffle
        let map_outputs: Vec<PathBuf> = map_tasks.iter().map(|t| t.output.clone()).collect();
        let buckets: Vec<PathBuf> = (0..config.n_reduce)
            .map(|i| config.shuffle_path(i))
            .collect();
        let shuffle = Shuffle::new(buckets, config.spill_bytes).run(&map_outputs)?;
        info!(
            phase = "shuffle",
            inputs = shuffle.inputs,
            lines = shuffle.lines_in,
            skipped = shuffle.lines_skipped,
            spills = shuffle.spills,
            wall_ms = shuffle.wall_ms,
            "Shuffle phase complete"
        );

        // Reduce phase
        let reduce_tasks: Vec<ReduceTask> = (0..config.n_reduce)
            .map(|index| ReduceTask {
                index,
                input: config.shuffle_path(index),
                output: config.reduce_output_path(index),
            })
            .collect();
        let reduce_start = Instant::now();
        let per_reducer = run_phase("reduce", &reduce_tasks, |task| {
            run_reduce_task(&reducer, task)
        })?;
        let reduce = ReduceStats::aggregate(&per_reducer, elapsed_ms(reduce_start));
        info!(
            phase = "reduce",
            reducers = reduce.reducers,
            total_lines = reduce.total_lines,
            total_skipped = reduce.total_skipped,
            total_groups = reduce.total_groups,
            min_reducer_ms = reduce.min_reducer_ms,
            max_reducer_ms = reduce.max_reducer_ms,
            wall_ms = reduce.wall_ms,
            "Reduce phase complete"
        );

        // Merge
        let reducer_outputs: Vec<PathBuf> =
            reduce_tasks.iter().map(|t| t.output.clone()).collect();
        let output = config.final_output_path();
        let merge = merge_outputs(&reducer_outputs, &output)?;
        info!(
            phase = "merge",
            inputs = merge.inputs,
            bytes_out = merge.bytes_out,
            output = %output.display(),
            wall_ms = merge.wall_ms,
            "Merge phase complete"
        );

        if config.keep_intermediates {
            debug!(work_dir = %config.work_dir.display(), "keeping intermediates");
        } else {
            let bucket_files = reduce_tasks.iter().map(|t| &t.input);
            remove_intermediates(
                map_outputs
                    .iter()
                    .chain(bucket_files)
                    .chain(reducer_outputs.iter()),
            );
        }

        let summary = RunSummary {
            output,
            map,
            shuffle,
            reduce,
            merge,
        };
        info!(wall_ms = elapsed_ms(run_start), "fjord run complete");
        if let Ok(json) = summary.to_json() {
            debug!(summary = %json, "run summary");
        }
        Ok(summary)
    }
}

/// Run `work` once per task on a dedicated pool with one thread per task and
/// wait for all of them. Results come back in task order; the first failure
/// (or panic) fails the phase.
pub(crate) fn run_phase<T, S, W>(phase: &'static str, tasks: &[T], work: W) -> Result<Vec<S>>
where
    T: Sync,
    S: Send,
    W: Fn(&T) -> Result<S> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(tasks.len().max(1))
        .thread_name(move |i| format!("fjord-{phase}-{i}"))
        .build()
        .map_err(|source| Error::Pool { phase, source })?;
    pool.install(|| {
        tasks
            .par_iter()
            .enumerate()
            .map(|(index, task)| {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(task)));
                outcome.unwrap_or_else(|payload| {
                    Err(Error::WorkerPanicked {
                        phase,
                        index,
                        message: panic_message(payload.as_ref()),
                    })
                })
            })
            .collect()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Best effort: a file that cannot be removed is logged, never fatal.
fn remove_intermediates<'a>(paths: impl Iterator<Item = &'a PathBuf>) {
    let mut removed = 0usize;
    for path in paths {
        match fs::remove_file(path) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not remove intermediate")
            }
        }
    }
    debug!(removed, "removed intermediates");
}
