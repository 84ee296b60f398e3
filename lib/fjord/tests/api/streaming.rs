//! tests/api/streaming.rs
use crate::helpers::{parse_results, read_results};
use claims::assert_ok;
use fjord::mappers::NgramYearMapper;
use fjord::reducers::Mean;
use fjord::sort::sort_lines_by_key;
use fjord::streaming::{map_stream, reduce_sorted};
use fjord::{JobConfig, PartitionNaming, RuntimePipeline, WhitespaceFormat};
use std::fs;
use std::io::Cursor;

#[test]
fn should_group_sorted_runs() {
    let mut out = Vec::new();

    assert_ok!(reduce_sorted(&Mean, Cursor::new("a\t1.0\na\t3.0\nb\t5.0\n"), &mut out));

    assert_eq!(String::from_utf8(out).unwrap(), "a,2.0\nb,5.0\n");
}

#[test]
fn should_match_the_orchestrated_result_through_map_sort_reduce() {
    // Arrange
    let input = "\
nuance 2001 4 1
child 1999 2 1
chihuahua hawthorn 2001 6 3
nunchuck 1999 8 2
nothing 1999 100 1
nudist 2023 1 1
";
    let input_dir = tempfile::tempdir().unwrap();
    let work_dir = tempfile::tempdir().unwrap();
    let (head, tail) = input.split_at(input.find("nunchuck").unwrap());
    fs::write(input_dir.path().join("ngrams-0.txt"), head).unwrap();
    fs::write(input_dir.path().join("ngrams-1.txt"), tail).unwrap();
    let naming = PartitionNaming::new("ngrams-", ".txt")
        .with_first_index(0)
        .with_width(1);
    let config = JobConfig::new(2, 3)
        .with_input_dir(input_dir.path())
        .with_work_dir(work_dir.path())
        .with_naming(naming);
    let mapper = NgramYearMapper::default();

    // Act
    let mut mapped = Vec::new();
    let map_stats = assert_ok!(map_stream(
        &mapper,
        &WhitespaceFormat,
        Cursor::new(input),
        &mut mapped
    ));
    let mut sorted = Vec::new();
    assert_ok!(sort_lines_by_key(&mapped, &mut sorted));
    let mut reduced = Vec::new();
    assert_ok!(reduce_sorted(&Mean, Cursor::new(sorted), &mut reduced));
    let summary = assert_ok!(RuntimePipeline::new(config).map_reduce(
        mapper,
        Mean,
        WhitespaceFormat
    ));

    // Assert
    let streamed = String::from_utf8(reduced).unwrap();
    assert_eq!(map_stats.records_in, 6);
    assert_eq!(
        streamed,
        "\
1999,chi,2.0
1999,nu,8.0
2001,chi,6.0
2001,haw,6.0
2001,nu,4.0
"
    );
    assert_eq!(parse_results(&streamed), read_results(&summary.output));
}
