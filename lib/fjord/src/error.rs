use std::path::PathBuf;

/// Errors that abort a worker and, with it, the whole run.
///
/// Malformed records never show up here: they are skipped where they are read
/// and only counted in the phase stats.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid job configuration: {0}")]
    InvalidConfig(String),

    #[error("input partition {index} not found at {}", path.display())]
    MissingPartition { index: usize, path: PathBuf },

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure on a caller-supplied reader or writer (streaming mode).
    #[error("i/o error on stream")]
    Stream(#[from] std::io::Error),

    #[error("{phase} worker {index} panicked: {message}")]
    WorkerPanicked {
        phase: &'static str,
        index: usize,
        message: String,
    },

    #[error("failed to build {phase} worker pool")]
    Pool {
        phase: &'static str,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Attach the offending path to an i/o error.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
