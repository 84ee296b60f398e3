use anyhow::{Context, Result};
use clap::Parser;
use fjord::constants::{DEFAULT_LOG_FILTER, DEFAULT_MAX_YEAR, DEFAULT_SUBSTRINGS};
use fjord::mappers::NgramYearMapper;
use fjord::streaming::map_stream;
use fjord::WhitespaceFormat;
use std::io::{self, BufWriter};
use tracing::debug;

#[derive(Parser, Debug)]
struct Args {
    /// Substrings to look for in each n-gram, comma separated
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SUBSTRINGS.map(String::from))]
    substrings: Vec<String>,
    /// Latest year kept
    #[arg(long, default_value_t = DEFAULT_MAX_YEAR)]
    max_year: i64,
}

fn main() -> Result<()> {
    fjord::logging::init(DEFAULT_LOG_FILTER);
    let args = Args::parse();
    let mapper = NgramYearMapper::new(args.substrings).with_max_year(args.max_year);

    let stdin = io::stdin().lock();
    let stdout = BufWriter::new(io::stdout().lock());
    let stats = map_stream(&mapper, &WhitespaceFormat, stdin, stdout)
        .context("mapping stdin")?;
    debug!(records = stats.records_in, pairs = stats.pairs_out, "ngram_map done");
    Ok(())
}
