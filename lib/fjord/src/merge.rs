use crate::error::{IoContext, Result};
use crate::io::{open_reader, open_writer};
use crate::stats::MergeStats;
use crate::utils::elapsed_ms;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Concatenate reducer outputs, in the order given, into `output`.
/// Whatever was at `output` before is replaced.
pub fn merge_outputs(inputs: &[PathBuf], output: &Path) -> Result<MergeStats> {
    let start = Instant::now();
    let mut writer = open_writer(output)?;
    let mut bytes_out = 0u64;
    for path in inputs {
        let mut reader = open_reader(path)?;
        bytes_out += std::io::copy(&mut reader, &mut writer).at(output)?;
    }
    writer.flush().at(output)?;
    debug!(inputs = inputs.len(), bytes_out, output = %output.display(), "merge done");
    Ok(MergeStats {
        inputs: inputs.len(),
        bytes_out,
        wall_ms: elapsed_ms(start),
    })
}
