use anyhow::{Context, Result};
use clap::Parser;
use fjord::constants::{DEFAULT_FIRST_INDEX, DEFAULT_INPUT_PREFIX, DEFAULT_INPUT_SUFFIX};
use fjord::mappers::ArtistDurationMapper;
use fjord::reducers::Max;
use fjord::{CsvFormat, JobConfig, PartitionNaming, RuntimePipeline};
use std::path::PathBuf;
use tracing::info;

/// Longest song duration per artist.
///
/// Reads `<input-dir>/music_part01.csv` .. `music_partNN.csv` (NN = n_map),
/// rows `id,artist,duration`, and writes `artist,max_duration` lines.
#[derive(Parser, Debug)]
struct Args {
    /// Number of map workers, one per input partition
    n_map: usize,
    /// Number of reduce workers and shuffle buckets
    n_reduce: usize,
    /// Directory holding the input partitions
    #[arg(long, default_value = ".")]
    input_dir: PathBuf,
    /// Directory for intermediate files [env: FJORD_WORK_DIR]
    #[arg(long)]
    work_dir: Option<PathBuf>,
    /// Final results file, relative to the work dir unless absolute
    #[arg(long, default_value = fjord::constants::DEFAULT_FINAL_OUTPUT)]
    output: PathBuf,
    #[arg(long, default_value = DEFAULT_INPUT_PREFIX)]
    input_prefix: String,
    #[arg(long, default_value = DEFAULT_INPUT_SUFFIX)]
    input_suffix: String,
    #[arg(long, default_value_t = DEFAULT_FIRST_INDEX)]
    first_index: usize,
    /// Leave map, shuffle and reducer files in the work dir [env: FJORD_KEEP_INTERMEDIATES]
    #[arg(long)]
    keep_intermediates: bool,
    /// Bucket buffer size before the shuffle writes it out [env: FJORD_SPILL_BYTES]
    #[arg(long)]
    spill_bytes: Option<usize>,
    /// Zero-based column holding the artist
    #[arg(long, default_value_t = 1)]
    artist_column: usize,
    /// Zero-based column holding the duration
    #[arg(long, default_value_t = 2)]
    duration_column: usize,
}

fn main() -> Result<()> {
    fjord::logging::init(fjord::constants::DEFAULT_LOG_FILTER);
    let args = Args::parse();

    let mut config = JobConfig::from_env(args.n_map, args.n_reduce)
        .with_input_dir(&args.input_dir)
        .with_output(&args.output)
        .with_naming(
            PartitionNaming::new(&args.input_prefix, &args.input_suffix)
                .with_first_index(args.first_index),
        );
    if let Some(dir) = &args.work_dir {
        config = config.with_work_dir(dir);
    }
    if args.keep_intermediates {
        config = config.with_keep_intermediates(true);
    }
    if let Some(bytes) = args.spill_bytes {
        config = config.with_spill_bytes(bytes);
    }

    let mapper = ArtistDurationMapper::new(args.artist_column, args.duration_column);
    let summary = RuntimePipeline::new(config)
        .map_reduce(mapper, Max, CsvFormat::default())
        .with_context(|| {
            format!(
                "songs job failed (n_map={}, n_reduce={})",
                args.n_map, args.n_reduce
            )
        })?;
    info!(output = %summary.output.display(), "results written");
    Ok(())
}
