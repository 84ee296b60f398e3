use crate::error::{Error, IoContext, Result};
use crate::io::{for_each_line, open_reader, open_writer, split_kv_bytes};
use crate::stats::ShuffleStats;
use crate::utils::elapsed_ms;
use fnv::FnvHasher;
use std::fs::OpenOptions;
use std::hash::Hasher;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, warn};

/// Reduce partition of `key`: 64-bit FNV-1a of the key bytes, modulo
/// `n_reduce`. Depends on nothing but the bytes, so every run, process and
/// platform puts a key in the same bucket.
pub fn bucket_index(key: &[u8], n_reduce: usize) -> usize {
    debug_assert!(n_reduce > 0, "n_reduce must be positive");
    let mut hasher = FnvHasher::default();
    hasher.write(key);
    (hasher.finish() % n_reduce as u64) as usize
}

/// Redistributes map output into one file per reduce partition.
///
/// Single threaded: the bucket buffers belong to the shuffle alone. Each
/// bucket buffers its lines in memory and is appended to its file whenever it
/// grows past `spill_bytes`. A bucket file is open only while it is spilled,
/// so `n_reduce` is not bounded by the descriptor limit.
pub struct Shuffle {
    buckets: Vec<PathBuf>,
    spill_bytes: usize,
}

impl Shuffle {
    /// One output path per reduce partition; `buckets.len()` is `n_reduce`.
    pub fn new(buckets: Vec<PathBuf>, spill_bytes: usize) -> Self {
        Self {
            buckets,
            spill_bytes,
        }
    }

    pub fn n_reduce(&self) -> usize {
        self.buckets.len()
    }

    pub fn bucket_paths(&self) -> &[PathBuf] {
        &self.buckets
    }

    pub fn run(&self, map_outputs: &[PathBuf]) -> Result<ShuffleStats> {
        let start = Instant::now();
        let n_reduce = self.n_reduce();
        if n_reduce == 0 {
            return Err(Error::InvalidConfig(
                "shuffle needs at least one bucket".into(),
            ));
        }

        // Truncate every bucket up front so empty buckets still exist and
        // spills can append.
        for path in &self.buckets {
            open_writer(path)?;
        }
        let mut buffers: Vec<Vec<u8>> = vec![Vec::new(); n_reduce];
        let mut stats = ShuffleStats {
            inputs: map_outputs.len(),
            bucket_lines: vec![0; n_reduce],
            ..ShuffleStats::default()
        };

        for path in map_outputs {
            let reader = open_reader(path)?;
            let mut skipped_here = 0u64;
            let mut spill_err: Option<Error> = None;
            for_each_line(reader, |line| {
                if line.is_empty() {
                    return Ok(());
                }
                stats.lines_in += 1;
                let Some((key, _)) = split_kv_bytes(line) else {
                    skipped_here += 1;
                    return Ok(());
                };
                let b = bucket_index(key, n_reduce);
                let buf = &mut buffers[b];
                buf.extend_from_slice(line);
                buf.push(b'\n');
                stats.bucket_lines[b] += 1;
                if buf.len() >= self.spill_bytes {
                    if let Err(e) = self.spill(b, buf) {
                        spill_err = Some(e);
                        return Err(std::io::Error::other("bucket spill failed"));
                    }
                    stats.spills += 1;
                }
                Ok(())
            })
            .or_else(|e| match spill_err.take() {
                Some(spill) => Err(spill),
                None => Err(e).at(path),
            })?;
            if skipped_here > 0 {
                warn!(
                    input = %path.display(),
                    skipped = skipped_here,
                    "skipped map output lines without a tab"
                );
            }
            stats.lines_skipped += skipped_here;
        }

        for (b, buf) in buffers.iter_mut().enumerate() {
            self.spill(b, buf)?;
        }

        stats.wall_ms = elapsed_ms(start);
        debug!(
            inputs = stats.inputs,
            lines = stats.lines_in,
            spills = stats.spills,
            "shuffle done"
        );
        Ok(stats)
    }

    fn spill(&self, bucket: usize, buf: &mut Vec<u8>) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let path = &self.buckets[bucket];
        let mut file = OpenOptions::new().append(true).open(path).at(path)?;
        file.write_all(buf).at(path)?;
        buf.clear();
        Ok(())
    }
}
