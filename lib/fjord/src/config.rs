use crate::constants::*;
use crate::error::{Error, Result};
use crate::utils::{env_parse, env_var_truthy};
use std::path::{Path, PathBuf};

/// Fixed naming convention for input partitions: `<prefix><index><suffix>`
/// with the index zero-padded to `width` digits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionNaming {
    pub prefix: String,
    pub suffix: String,
    pub first_index: usize,
    pub width: usize,
}

impl Default for PartitionNaming {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_INPUT_PREFIX.to_string(),
            suffix: DEFAULT_INPUT_SUFFIX.to_string(),
            first_index: DEFAULT_FIRST_INDEX,
            width: DEFAULT_INDEX_WIDTH,
        }
    }
}

impl PartitionNaming {
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            ..Self::default()
        }
    }

    pub fn with_first_index(mut self, first_index: usize) -> Self {
        self.first_index = first_index;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// File name of the `i`-th partition (zero based).
    pub fn file_name(&self, i: usize) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            self.first_index + i,
            self.suffix,
            width = self.width
        )
    }
}

/// Name of an intermediate file: `<prefix><NN>.txt`, `NN` zero based.
pub fn intermediate_name(prefix: &str, index: usize) -> String {
    format!("{prefix}{index:02}{INTERMEDIATE_SUFFIX}")
}

/// Everything the driver needs for one run.
#[derive(Clone, Debug)]
pub struct JobConfig {
    pub n_map: usize,
    pub n_reduce: usize,
    pub input_dir: PathBuf,
    pub naming: PartitionNaming,
    pub work_dir: PathBuf,
    /// Final merged file. Relative paths are resolved against `work_dir`.
    pub output: PathBuf,
    pub keep_intermediates: bool,
    pub spill_bytes: usize,
}

impl JobConfig {
    pub fn new(n_map: usize, n_reduce: usize) -> Self {
        Self {
            n_map,
            n_reduce,
            input_dir: PathBuf::from("."),
            naming: PartitionNaming::default(),
            work_dir: PathBuf::from("."),
            output: PathBuf::from(DEFAULT_FINAL_OUTPUT),
            keep_intermediates: false,
            spill_bytes: DEFAULT_SPILL_BYTES,
        }
    }

    /// Defaults overridden by `FJORD_*` environment variables.
    pub fn from_env(n_map: usize, n_reduce: usize) -> Self {
        let mut config = Self::new(n_map, n_reduce);
        if let Ok(dir) = std::env::var(ENV_WORK_DIR) {
            config.work_dir = PathBuf::from(dir);
        }
        config.keep_intermediates = env_var_truthy(ENV_KEEP_INTERMEDIATES);
        if let Some(bytes) = env_parse::<usize>(ENV_SPILL_BYTES) {
            config.spill_bytes = bytes;
        }
        config
    }

    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn with_naming(mut self, naming: PartitionNaming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_keep_intermediates(mut self, keep: bool) -> Self {
        self.keep_intermediates = keep;
        self
    }

    pub fn with_spill_bytes(mut self, bytes: usize) -> Self {
        self.spill_bytes = bytes;
        self
    }

    /// Reject parallelism and naming settings the driver cannot run with.
    /// Partition existence is checked separately by [`JobConfig::input_paths`].
    pub fn validate(&self) -> Result<()> {
        if self.n_map == 0 {
            return Err(Error::InvalidConfig("n_map must be at least 1".into()));
        }
        if self.n_reduce == 0 {
            return Err(Error::InvalidConfig("n_reduce must be at least 1".into()));
        }
        if self.naming.width == 0 {
            return Err(Error::InvalidConfig(
                "partition index width must be at least 1".into(),
            ));
        }
        if self.spill_bytes == 0 {
            return Err(Error::InvalidConfig("spill_bytes must be at least 1".into()));
        }
        Ok(())
    }

    /// Paths of the `n_map` input partitions. Fails on the first one missing.
    pub fn input_paths(&self) -> Result<Vec<PathBuf>> {
        (0..self.n_map)
            .map(|i| {
                let path = self.input_dir.join(self.naming.file_name(i));
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(Error::MissingPartition { index: i, path })
                }
            })
            .collect()
    }

    pub fn map_output_path(&self, i: usize) -> PathBuf {
        self.work_dir.join(intermediate_name(MAP_OUTPUT_PREFIX, i))
    }

    pub fn shuffle_path(&self, i: usize) -> PathBuf {
        self.work_dir.join(intermediate_name(SHUFFLE_PREFIX, i))
    }

    pub fn reduce_output_path(&self, i: usize) -> PathBuf {
        self.work_dir.join(intermediate_name(REDUCER_OUTPUT_PREFIX, i))
    }

    pub fn final_output_path(&self) -> PathBuf {
        resolve(&self.work_dir, &self.output)
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
