use crate::error::{IoContext, Result};
use crate::utils::elapsed_ms;
use memchr::memchr;
use memmap2::Mmap;
use rayon::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Instant;

#[derive(Clone, Debug, Default, Serialize)]
pub struct SortOutcome {
    pub lines_in: u64,
    pub bytes_in: u64,
    pub sort_ms: u64,
    pub write_ms: u64,
}

/// Stable sort of `key<TAB>value` lines by the raw bytes of their key.
///
/// A line without a tab is all key. Empty lines are dropped, `\r\n` endings
/// are normalized to `\n`, and lines with equal keys keep their input order.
pub fn sort_lines_by_key<W: Write>(bytes: &[u8], mut out: W) -> std::io::Result<SortOutcome> {
    // (start, end, key_end) per line
    let mut lines: Vec<(usize, usize, usize)> = Vec::new();
    let mut offset = 0usize;
    while offset < bytes.len() {
        let nl = memchr(b'\n', &bytes[offset..])
            .map(|i| offset + i + 1)
            .unwrap_or(bytes.len());
        let mut end = nl;
        if end > offset && bytes[end - 1] == b'\n' {
            end -= 1;
        }
        if end > offset && bytes[end - 1] == b'\r' {
            end -= 1;
        }
        if end > offset {
            let key_end = memchr(b'\t', &bytes[offset..end])
                .map(|i| offset + i)
                .unwrap_or(end);
            lines.push((offset, end, key_end));
        }
        offset = nl;
    }

    let sort_start = Instant::now();
    lines.par_sort_by(|a, b| bytes[a.0..a.2].cmp(&bytes[b.0..b.2]));
    let sort_ms = elapsed_ms(sort_start);

    let write_start = Instant::now();
    for &(s, e, _) in &lines {
        out.write_all(&bytes[s..e])?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    Ok(SortOutcome {
        lines_in: lines.len() as u64,
        bytes_in: bytes.len() as u64,
        sort_ms,
        write_ms: elapsed_ms(write_start),
    })
}

/// [`sort_lines_by_key`] over a memory-mapped file.
pub fn sort_file_by_key<W: Write>(path: &Path, out: W) -> Result<SortOutcome> {
    let file = File::open(path).at(path)?;
    let len = file.metadata().at(path)?.len();
    if len == 0 {
        // zero-length mappings are rejected on some platforms
        return sort_lines_by_key(&[], out).at(path);
    }
    // the input is only read, and nothing else in the process writes it
    let mmap = unsafe { Mmap::map(&file) }.at(path)?;
    sort_lines_by_key(&mmap[..], out).at(path)
}
