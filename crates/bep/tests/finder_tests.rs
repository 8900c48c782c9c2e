use blazebridge_bep::{
    BepTestFinderStrategy, CancellationFlag, DelimitedEventReader, ReaderStreamProvider,
    TestResultFinderStrategy, TestResults,
};
use blazebridge_config::BepConfig;
use rstest::rstest;
use std::path::PathBuf;
use tempfile::TempDir;

mod common;
use common::*;

#[test]
fn single_target_yields_one_result_pointing_at_its_xml() {
    let dir = TempDir::new().unwrap();
    let path = write_bep_file(dir.path(), &single_test_build());

    let mut finder = BepTestFinderStrategy::for_file(&path, &BepConfig::default());
    let results = finder.find_test_results();

    let found = results.results();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].label, "//t:test");
    assert_eq!(found[0].configuration_mnemonic, "k8-fastbuild");
    assert_eq!(found[0].output_files.len(), 1);
    assert_eq!(found[0].output_files[0].name, "/out/t/a.xml");
    assert_eq!(
        found[0].local_paths().collect::<Vec<_>>(),
        vec![PathBuf::from("/out/t/a.xml")]
    );
    assert!(!path.exists(), "output file is deleted after reading");
}

#[test]
fn truncated_file_returns_no_results_and_is_deleted() {
    let dir = TempDir::new().unwrap();
    let mut bytes = as_bytes(&single_test_build());
    bytes.truncate(bytes.len() - 3);
    let path = dir.path().join("truncated.bep");
    std::fs::write(&path, bytes).unwrap();

    let results = BepTestFinderStrategy::for_file(&path, &BepConfig::default()).find_test_results();

    assert_eq!(results, TestResults::NoResults);
    assert!(!path.exists());
}

#[test]
fn corrupted_length_prefix_after_valid_events_returns_no_results() {
    let dir = TempDir::new().unwrap();
    let mut bytes = as_bytes(&[started("u"), configuration("cfg-k8", "k8-fastbuild")]);
    bytes.extend_from_slice(&[0xff; 11]);
    let path = dir.path().join("corrupt-prefix.bep");
    std::fs::write(&path, bytes).unwrap();

    let results = BepTestFinderStrategy::for_file(&path, &BepConfig::default()).find_test_results();

    assert!(results.is_no_results());
    assert!(!path.exists());
}

#[test]
fn aspect_completion_keeps_the_test_result() {
    let mut events = single_test_build();
    events.insert(3, set_of_files(&["/out/t/test.intellij-info.txt"], "info", &[]));
    events.insert(
        5,
        aspect_complete(
            "//t:test",
            "cfg-k8",
            "//aspect:intellij_info_bundled.bzl%intellij_info_aspect",
            vec![output_group("intellij-info-generic", &["info"])],
        ),
    );
    let dir = TempDir::new().unwrap();
    let path = write_bep_file(dir.path(), &events);

    let results = BepTestFinderStrategy::for_file(&path, &BepConfig::default()).find_test_results();

    let found = results.results();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].output_files[0].name, "/out/t/a.xml");
}

#[test]
fn stream_finder_can_move_to_a_worker_thread() {
    fn assert_send<T: Send>() {}
    assert_send::<BepTestFinderStrategy>();

    let bytes = as_bytes(&single_test_build());
    let provider = ReaderStreamProvider::new(
        DelimitedEventReader::new(std::io::Cursor::new(bytes)),
        CancellationFlag::new(),
    );
    let mut finders: Vec<Box<dyn TestResultFinderStrategy + Send>> = vec![Box::new(
        BepTestFinderStrategy::for_stream(provider, &BepConfig::default()),
    )];

    let results = std::thread::spawn(move || finders[0].find_test_results())
        .join()
        .unwrap();

    assert_eq!(results.results().len(), 1);
}

#[test]
fn missing_file_returns_no_results() {
    let dir = TempDir::new().unwrap();
    let mut finder =
        BepTestFinderStrategy::for_file(dir.path().join("never-written.bep"), &BepConfig::default());
    assert!(finder.find_test_results().is_no_results());
}

#[test]
fn second_lookup_after_deletion_returns_no_results() {
    let dir = TempDir::new().unwrap();
    let path = write_bep_file(dir.path(), &single_test_build());
    let mut finder = BepTestFinderStrategy::for_file(&path, &BepConfig::default());

    assert_eq!(finder.find_test_results().results().len(), 1);
    assert!(finder.find_test_results().is_no_results());
}

#[test]
fn deleting_temporary_files_twice_is_harmless() {
    let dir = TempDir::new().unwrap();
    let path = write_bep_file(dir.path(), &single_test_build());
    let mut finder = BepTestFinderStrategy::for_file(&path, &BepConfig::default());

    finder.delete_temporary_output_files();
    assert!(!path.exists());
    finder.delete_temporary_output_files();
    assert!(finder.find_test_results().is_no_results());
}

#[test]
fn retained_file_survives_lookup() {
    let dir = TempDir::new().unwrap();
    let path = write_bep_file(dir.path(), &single_test_build());
    let mut finder =
        BepTestFinderStrategy::for_file(&path, &BepConfig::default()).retain_output_file();

    assert_eq!(finder.find_test_results().results().len(), 1);
    finder.delete_temporary_output_files();
    assert!(path.exists());
    assert_eq!(finder.output_file(), Some(path.as_path()));
}

#[test]
fn build_without_test_outputs_is_empty_not_missing() {
    let events = vec![
        started("u"),
        configuration("cfg", "k8"),
        set_of_files(&["/out/lib.jar"], "jar", &[]),
        target_complete("//lib", "cfg", vec![output_group("default", &["jar"])]),
    ];
    let dir = TempDir::new().unwrap();
    let path = write_bep_file(dir.path(), &events);

    let results = BepTestFinderStrategy::for_file(&path, &BepConfig::default()).find_test_results();

    assert_eq!(results, TestResults::Results(vec![]));
}

#[test]
fn structural_error_returns_no_results() {
    let events = vec![
        configuration("cfg", "k8"),
        set_of_files(&["/out/a.xml"], "s1", &["s2"]),
        set_of_files(&["/out/b.xml"], "s2", &["s1"]),
        target_complete("//t:test", "cfg", vec![output_group("test.outputs", &["s1"])]),
    ];
    let dir = TempDir::new().unwrap();
    let path = write_bep_file(dir.path(), &events);

    let results = BepTestFinderStrategy::for_file(&path, &BepConfig::default()).find_test_results();

    assert!(results.is_no_results());
}

#[rstest]
#[case(vec!["test.outputs"], 1)]
#[case(vec!["test.outputs", "test.logs"], 2)]
#[case(vec!["baseline.lcov"], 0)]
fn configured_groups_select_files(#[case] groups: Vec<&str>, #[case] expected_files: usize) {
    let events = vec![
        configuration("cfg", "k8"),
        set_of_files(&["/out/t/test.xml"], "xml", &[]),
        set_of_files(&["/out/t/test.log"], "log", &[]),
        target_complete(
            "//t:test",
            "cfg",
            vec![
                output_group("test.outputs", &["xml"]),
                output_group("test.logs", &["log"]),
            ],
        ),
    ];
    let config = BepConfig {
        test_output_groups: groups.iter().map(|g| g.to_string()).collect(),
        ..BepConfig::default()
    };
    let dir = TempDir::new().unwrap();
    let path = write_bep_file(dir.path(), &events);

    let results = BepTestFinderStrategy::for_file(&path, &config).find_test_results();

    let files: usize = results.results().iter().map(|r| r.output_files.len()).sum();
    assert_eq!(files, expected_files);
}

#[test]
fn failing_stream_is_no_results_in_strict_mode() {
    let mut events = single_test_build();
    events.pop();
    let provider = FailingProvider::new(events, "connection reset");

    let results = BepTestFinderStrategy::for_stream(provider, &BepConfig::default())
        .find_test_results();

    assert!(results.is_no_results());
}

#[test]
fn failing_stream_keeps_partial_results_in_best_effort_mode() {
    let mut events = single_test_build();
    events.pop();
    let provider = FailingProvider::new(events, "connection reset");
    let config = BepConfig {
        best_effort: true,
        ..BepConfig::default()
    };

    let mut finder = BepTestFinderStrategy::for_stream(provider, &config);
    let results = finder.find_test_results();

    assert_eq!(results.results().len(), 1);
    assert!(finder.find_test_results().is_no_results(), "stream is single use");
}

#[test]
fn cancelled_stream_ends_cleanly() {
    let bytes = as_bytes(&single_test_build());
    let flag = CancellationFlag::new();
    flag.cancel();
    let provider =
        ReaderStreamProvider::new(DelimitedEventReader::new(std::io::Cursor::new(bytes)), flag);

    let results = BepTestFinderStrategy::for_stream(provider, &BepConfig::default())
        .find_test_results();

    assert_eq!(results, TestResults::Results(vec![]));
}
