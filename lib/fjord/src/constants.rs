//! Environment variable names, file naming conventions and defaults.

// Environment variable names
pub const ENV_WORK_DIR: &str = "FJORD_WORK_DIR";
pub const ENV_KEEP_INTERMEDIATES: &str = "FJORD_KEEP_INTERMEDIATES";
pub const ENV_SPILL_BYTES: &str = "FJORD_SPILL_BYTES";

// Intermediate and final files, all under the work dir
pub const MAP_OUTPUT_PREFIX: &str = "map_output_";
pub const SHUFFLE_PREFIX: &str = "shuffle_";
pub const REDUCER_OUTPUT_PREFIX: &str = "reducer_output_";
pub const INTERMEDIATE_SUFFIX: &str = ".txt";
pub const DEFAULT_FINAL_OUTPUT: &str = "final_results.csv";

// Input partitions: music_part01.csv, music_part02.csv, ...
pub const DEFAULT_INPUT_PREFIX: &str = "music_part";
pub const DEFAULT_INPUT_SUFFIX: &str = ".csv";
pub const DEFAULT_FIRST_INDEX: usize = 1;
pub const DEFAULT_INDEX_WIDTH: usize = 2;

/// Bucket buffer size before the shuffle appends it to the bucket file.
pub const DEFAULT_SPILL_BYTES: usize = 16 * 1024 * 1024; // 16 MiB

pub const DEFAULT_LOG_FILTER: &str = "info";

// N-gram demo
pub const DEFAULT_SUBSTRINGS: [&str; 3] = ["nu", "chi", "haw"];
pub const DEFAULT_MAX_YEAR: i64 = 2022;
