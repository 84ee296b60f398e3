//! tests/api/helpers.rs
use fjord::JobConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestJob {
    pub input_dir: TempDir,
    pub work_dir: TempDir,
}

impl TestJob {
    /// One `music_partNN.csv` per element of `parts`, numbered from 01.
    pub fn with_partitions(parts: &[&str]) -> Self {
        let input_dir = tempfile::tempdir().expect("Failed to create input dir");
        let work_dir = tempfile::tempdir().expect("Failed to create work dir");
        for (i, body) in parts.iter().enumerate() {
            let path = input_dir.path().join(format!("music_part{:02}.csv", i + 1));
            fs::write(path, body).expect("Failed to write partition");
        }
        Self {
            input_dir,
            work_dir,
        }
    }

    pub fn config(&self, n_map: usize, n_reduce: usize) -> JobConfig {
        JobConfig::new(n_map, n_reduce)
            .with_input_dir(self.input_dir.path())
            .with_work_dir(self.work_dir.path())
    }

    pub fn work_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.work_dir.path())
            .expect("Failed to list work dir")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// `key,result` lines keyed by everything before the last comma, so keys with
/// commas in them survive.
pub fn read_results(path: &Path) -> BTreeMap<String, String> {
    parse_results(&fs::read_to_string(path).expect("Failed to read results"))
}

pub fn parse_results(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .map(|line| {
            let (key, value) = line.rsplit_once(',').expect("result line without a comma");
            (key.to_string(), value.to_string())
        })
        .collect()
}

pub fn final_results(job: &TestJob) -> PathBuf {
    job.work_dir.path().join("final_results.csv")
}
