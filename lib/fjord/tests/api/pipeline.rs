//! tests/api/pipeline.rs
use crate::helpers::{final_results, read_results, TestJob};
use claims::{assert_matches, assert_ok};
use fjord::mappers::{ArtistDurationMapper, NgramYearMapper};
use fjord::reducers::{Max, Mean};
use fjord::{CsvFormat, Error, PartitionNaming, Record, Reducer, RuntimePipeline, WhitespaceFormat};
use std::fs;

const PART_1: &str = "1,Abba,180\n2,\"Simon, Paul\",245.5\n3,Blur,200\n";
const PART_2: &str = "4,Abba,240\n5,Blur,190\n";
const PART_3: &str = "6,Coldplay,300\n7,\"Simon, Paul\",100\n8,Abba,210\n";

/// Every value of a key, sorted, joined with `|`.
struct Collect;

impl Reducer for Collect {
    type Value = String;
    type Acc = Vec<String>;

    fn init(&self, first: String) -> Vec<String> {
        vec![first]
    }

    fn fold(&self, acc: &mut Vec<String>, value: String) {
        acc.push(value);
    }

    fn finish(&self, mut acc: Vec<String>) -> String {
        acc.sort();
        acc.join("|")
    }
}

#[test]
fn should_compute_max_duration_per_artist() {
    // Arrange
    let job = TestJob::with_partitions(&[PART_1, PART_2, PART_3]);
    let pipeline = RuntimePipeline::new(job.config(3, 2));

    // Act
    let summary = assert_ok!(pipeline.map_reduce(
        ArtistDurationMapper::default(),
        Max,
        CsvFormat::default()
    ));

    // Assert
    let results = read_results(&summary.output);
    assert_eq!(results.len(), 4);
    assert_eq!(results["Abba"], "240.0");
    assert_eq!(results["Blur"], "200.0");
    assert_eq!(results["Coldplay"], "300.0");
    assert_eq!(results["Simon, Paul"], "245.5");
    assert_eq!(summary.map.total_records, 8);
    assert_eq!(summary.reduce.total_groups, 4);
}

#[test]
fn should_reduce_every_emitted_value_exactly_once() {
    let job = TestJob::with_partitions(&[PART_1, PART_2, PART_3]);
    let pipeline = RuntimePipeline::new(job.config(3, 4));

    assert_ok!(pipeline.map_reduce(
        ArtistDurationMapper::default(),
        Collect,
        CsvFormat::default()
    ));

    let results = read_results(&final_results(&job));
    assert_eq!(results["Abba"], "180.0|210.0|240.0");
    assert_eq!(results["Blur"], "190.0|200.0");
    assert_eq!(results["Simon, Paul"], "100.0|245.5");
    assert_eq!(results["Coldplay"], "300.0");
}

#[test]
fn should_produce_identical_output_on_rerun() {
    let job = TestJob::with_partitions(&[PART_1, PART_2, PART_3]);
    let pipeline = RuntimePipeline::new(job.config(3, 3));

    pipeline
        .map_reduce(ArtistDurationMapper::default(), Max, CsvFormat::default())
        .unwrap();
    let first = fs::read(final_results(&job)).unwrap();
    pipeline
        .map_reduce(ArtistDurationMapper::default(), Max, CsvFormat::default())
        .unwrap();
    let second = fs::read(final_results(&job)).unwrap();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn should_skip_corrupt_records() {
    let corrupt = "1,Abba,180\n2,Abba,not-a-number\n3\n4,Abba,\"unterminated\n";
    let job = TestJob::with_partitions(&[corrupt, PART_2]);
    let pipeline = RuntimePipeline::new(job.config(2, 1));

    let summary = assert_ok!(pipeline.map_reduce(
        ArtistDurationMapper::default(),
        Collect,
        CsvFormat::default()
    ));

    let results = read_results(&summary.output);
    assert_eq!(results["Abba"], "180.0|240.0");
    assert_eq!(results["Blur"], "190.0");
}

#[test]
fn should_write_an_empty_result_for_empty_input() {
    let job = TestJob::with_partitions(&["", ""]);
    let pipeline = RuntimePipeline::new(job.config(2, 3));

    let summary = assert_ok!(pipeline.map_reduce(
        ArtistDurationMapper::default(),
        Max,
        CsvFormat::default()
    ));

    assert_eq!(fs::read_to_string(&summary.output).unwrap(), "");
    assert_eq!(summary.shuffle.bucket_lines, [0, 0, 0]);
}

#[test]
fn should_fail_on_missing_partition_before_writing_anything() {
    let job = TestJob::with_partitions(&[PART_1, PART_2]);
    let pipeline = RuntimePipeline::new(job.config(3, 2));

    let result = pipeline.map_reduce(ArtistDurationMapper::default(), Max, CsvFormat::default());

    assert_matches!(result, Err(Error::MissingPartition { index: 2, .. }));
    assert!(job.work_files().is_empty());
}

#[test]
fn should_reject_zero_parallelism_before_writing_anything() {
    let job = TestJob::with_partitions(&[PART_1]);

    for (n_map, n_reduce) in [(0, 1), (1, 0)] {
        let pipeline = RuntimePipeline::new(job.config(n_map, n_reduce));
        let result =
            pipeline.map_reduce(ArtistDurationMapper::default(), Max, CsvFormat::default());
        assert_matches!(result, Err(Error::InvalidConfig(_)));
    }
    assert!(job.work_files().is_empty());
}

#[test]
fn should_remove_intermediates_after_success() {
    let job = TestJob::with_partitions(&[PART_1, PART_2]);
    let pipeline = RuntimePipeline::new(job.config(2, 2));

    pipeline
        .map_reduce(ArtistDurationMapper::default(), Max, CsvFormat::default())
        .unwrap();

    assert_eq!(job.work_files(), ["final_results.csv"]);
}

#[test]
fn should_keep_intermediates_when_asked() {
    let job = TestJob::with_partitions(&[PART_1, PART_2]);
    let pipeline = RuntimePipeline::new(job.config(2, 2).with_keep_intermediates(true));

    pipeline
        .map_reduce(ArtistDurationMapper::default(), Max, CsvFormat::default())
        .unwrap();

    assert_eq!(
        job.work_files(),
        [
            "final_results.csv",
            "map_output_00.txt",
            "map_output_01.txt",
            "reducer_output_00.txt",
            "reducer_output_01.txt",
            "shuffle_00.txt",
            "shuffle_01.txt",
        ]
    );
}

#[test]
fn should_fail_the_run_when_a_mapper_panics() {
    let job = TestJob::with_partitions(&[PART_1, "9,boom,1\n"]);
    let pipeline = RuntimePipeline::new(job.config(2, 1));
    let exploding = |r: &Record| -> Vec<(String, String)> {
        if r.get(1) == Some("boom") {
            panic!("cannot map {r:?}");
        }
        vec![(r.get(1).unwrap_or_default().to_string(), "1".to_string())]
    };

    let result = pipeline.map_reduce(exploding, Max, CsvFormat::default());

    assert_matches!(result, Err(Error::WorkerPanicked { phase: "map", index: 1, .. }));
    assert!(!final_results(&job).exists());
}

#[test]
fn should_average_ngram_counts_with_custom_naming() {
    let input_dir = tempfile::tempdir().unwrap();
    let work_dir = tempfile::tempdir().unwrap();
    fs::write(
        input_dir.path().join("ngrams-0.txt"),
        "nuance 1999 3 1\nchild chimney 1999 5 2\nhawk 2023 9 9\n",
    )
    .unwrap();
    fs::write(
        input_dir.path().join("ngrams-1.txt"),
        "nudge 1999 1 1\nbad row\n",
    )
    .unwrap();
    let config = fjord::JobConfig::new(2, 2)
        .with_input_dir(input_dir.path())
        .with_work_dir(work_dir.path())
        .with_output("ngrams.csv")
        .with_naming(
            PartitionNaming::new("ngrams-", ".txt")
                .with_first_index(0)
                .with_width(1),
        );

    let summary = assert_ok!(RuntimePipeline::new(config).map_reduce(
        NgramYearMapper::default(),
        Mean,
        WhitespaceFormat
    ));

    assert!(summary.output.ends_with("ngrams.csv"));
    let results = read_results(&summary.output);
    assert_eq!(results.len(), 2);
    assert_eq!(results["1999,nu"], "2.0");
    assert_eq!(results["1999,chi"], "5.0");
}
