pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod logging;
pub mod map;
pub mod mappers;
pub mod merge;
pub mod reduce;
pub mod reducers;
pub mod runtime;
pub mod shuffle;
pub mod sort;
pub mod stats;
pub mod streaming;
pub mod utils;

pub use api::{Mapper, Reducer};
pub use config::{JobConfig, PartitionNaming};
pub use error::{Error, Result};
pub use io::{CsvFormat, Record, RecordFormat, WhitespaceFormat};
pub use runtime::RuntimePipeline;
pub use stats::RunSummary;
