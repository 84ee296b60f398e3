use crate::error::{IoContext, Result};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// One unit of input: an ordered tuple of raw fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.fields.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Record {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// A lazily read stream of records. A failed read is yielded once and ends it.
pub type Records<'a> = Box<dyn Iterator<Item = io::Result<Record>> + 'a>;

/// Turns a byte stream into records.
///
/// Rows the format cannot parse are dropped, they never end the stream. An
/// error from the underlying reader does: it is the last item yielded.
pub trait RecordFormat: Send + Sync {
    fn records<'a, R>(&self, input: R) -> Records<'a>
    where
        R: BufRead + 'a;
}

/// One record per line, fields separated by runs of whitespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct WhitespaceFormat;

impl RecordFormat for WhitespaceFormat {
    fn records<'a, R>(&self, input: R) -> Records<'a>
    where
        R: BufRead + 'a,
    {
        let rows = input.lines().filter_map(|line| match line {
            Ok(line) => Some(Ok(line.split_whitespace().collect::<Record>())),
            // not utf-8; the line is consumed, so keep reading
            Err(e) if e.kind() == io::ErrorKind::InvalidData => None,
            Err(e) => Some(Err(e)),
        });
        Box::new(stop_after_error(rows))
    }
}

/// Comma separated rows with quoting, no header, any number of fields per row.
#[derive(Clone, Copy, Debug)]
pub struct CsvFormat {
    delimiter: u8,
    has_headers: bool,
}

impl Default for CsvFormat {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: false,
        }
    }
}

impl CsvFormat {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }
}

impl RecordFormat for CsvFormat {
    fn records<'a, R>(&self, input: R) -> Records<'a>
    where
        R: BufRead + 'a,
    {
        let reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_headers)
            .flexible(true)
            .from_reader(input);
        let rows = reader.into_records().filter_map(|row| match row {
            Ok(row) => Some(Ok(row.iter().collect::<Record>())),
            Err(e) => match e.into_kind() {
                csv::ErrorKind::Io(e) => Some(Err(e)),
                // bad quoting, bad utf-8 and the like
                _ => None,
            },
        });
        Box::new(stop_after_error(rows))
    }
}

/// Pass rows through up to and including the first error.
fn stop_after_error<I, T>(rows: I) -> impl Iterator<Item = io::Result<T>>
where
    I: Iterator<Item = io::Result<T>>,
{
    let mut rows = rows.fuse();
    let mut failed = false;
    std::iter::from_fn(move || {
        if failed {
            return None;
        }
        let row = rows.next()?;
        failed = row.is_err();
        Some(row)
    })
}

/// Open a partition as a lazy record stream. Calling this again starts over.
pub fn open_records<F>(path: impl AsRef<Path>, format: &F) -> Result<Records<'static>>
where
    F: RecordFormat,
{
    let reader = open_reader(path)?;
    Ok(format.records(reader))
}

pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    fs::create_dir_all(path.as_ref()).at(path.as_ref())
}

pub fn open_writer(path: impl AsRef<Path>) -> Result<BufWriter<File>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    let file = File::create(path).at(path)?;
    Ok(BufWriter::new(file))
}

pub fn open_reader(path: impl AsRef<Path>) -> Result<BufReader<File>> {
    let path = path.as_ref();
    let file = File::open(path).at(path)?;
    Ok(BufReader::new(file))
}

/// Feed every line of `input` to `f` as raw bytes, without the trailing
/// `\n` or `\r\n`. Bytes need not be valid utf-8.
pub fn for_each_line<B, F>(mut input: B, mut f: F) -> io::Result<()>
where
    B: BufRead,
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let mut line = buf.as_slice();
        if let Some(rest) = line.strip_suffix(b"\n") {
            line = rest;
        }
        if let Some(rest) = line.strip_suffix(b"\r") {
            line = rest;
        }
        f(line)?;
    }
}

/// Split a raw `key<TAB>value` line at its first tab.
pub fn split_kv_bytes(line: &[u8]) -> Option<(&[u8], &[u8])> {
    memchr::memchr(b'\t', line).map(|i| (&line[..i], &line[i + 1..]))
}

/// Split an intermediate `key<TAB>value` line. Returns `None` for lines
/// without a separator.
pub fn split_kv(line: &str) -> Option<(&str, &str)> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.split_once('\t')
}

/// Whether a pair survives the `key<TAB>value\n` encoding unchanged.
pub fn is_encodable(key: &str, value: &str) -> bool {
    !key.contains(['\t', '\n', '\r']) && !value.contains(['\n', '\r'])
}

pub fn write_kv<W: Write>(writer: &mut W, key: &str, value: &str) -> io::Result<usize> {
    writer.write_all(key.as_bytes())?;
    writer.write_all(b"\t")?;
    writer.write_all(value.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(key.len() + value.len() + 2)
}

/// Serves its bytes once, then fails every read.
#[cfg(test)]
pub(crate) struct FailingReader {
    good: &'static [u8],
}

#[cfg(test)]
impl FailingReader {
    pub(crate) fn new(good: &'static [u8]) -> Self {
        Self { good }
    }
}

#[cfg(test)]
impl io::Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.good.is_empty() {
            return Err(io::Error::other("disk gone"));
        }
        let n = self.good.len().min(buf.len());
        buf[..n].copy_from_slice(&self.good[..n]);
        self.good = &self.good[n..];
        Ok(n)
    }
}
