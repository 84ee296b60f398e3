use anyhow::{Context, Result};
use clap::Parser;
use fjord::reducers::Mean;
use fjord::streaming::reduce_sorted;
use std::io::{self, BufWriter};
use tracing::debug;

/// Mean value per key. Input must already be sorted (or grouped) by key,
/// e.g. piped through `fs_sort` or `sort`.
#[derive(Parser, Debug)]
struct Args {}

fn main() -> Result<()> {
    fjord::logging::init(fjord::constants::DEFAULT_LOG_FILTER);
    let _args = Args::parse();

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    let stats = reduce_sorted(&Mean, stdin, stdout).context("reducing stdin")?;
    debug!(
        lines = stats.lines_in,
        groups = stats.groups,
        skipped = stats.lines_skipped,
        "ngram_reduce done"
    );
    Ok(())
}
