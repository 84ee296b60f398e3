use anyhow::{Context, Result};
use clap::Parser;
use fjord::sort::{sort_file_by_key, sort_lines_by_key, SortOutcome};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Parser, Debug)]
struct Args {
    /// Input TSV file (key\tvalue per line), stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output TSV file path, stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    fjord::logging::init(fjord::constants::DEFAULT_LOG_FILTER);
    let args = Args::parse();
    let t0 = Instant::now();

    let out: Box<dyn Write> = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("create {}", path.display()))?;
            Box::new(BufWriter::with_capacity(32 * 1024 * 1024, file))
        }
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let outcome: SortOutcome = match &args.input {
        Some(path) => sort_file_by_key(path, out)?,
        None => {
            let mut bytes = Vec::new();
            io::stdin().lock().read_to_end(&mut bytes).context("read stdin")?;
            sort_lines_by_key(&bytes, out).context("write sorted lines")?
        }
    };

    info!(
        lines = outcome.lines_in,
        bytes = outcome.bytes_in,
        sort_ms = outcome.sort_ms,
        write_ms = outcome.write_ms,
        total_ms = t0.elapsed().as_millis() as u64,
        "fs_sort done"
    );
    Ok(())
}
