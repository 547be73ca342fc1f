use dupfind::duplicates::{DetectorConfig, DuplicateDetector, DuplicateFinder, FinderError, SizeBuckets};
use dupfind::scanner::{FileRecord, Fingerprinter, ScanError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_detect_continues_when_files_vanish() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"present").unwrap();
    fs::write(dir.path().join("b"), b"present").unwrap();

    // Two records whose files are gone by fingerprinting time
    let buckets: SizeBuckets = vec![
        FileRecord::new(dir.path().join("a"), 7),
        FileRecord::new(dir.path().join("b"), 7),
        FileRecord::new(dir.path().join("vanished_1"), 7),
        FileRecord::new(dir.path().join("vanished_2"), 7),
    ]
    .into_iter()
    .collect();

    let detector = DuplicateDetector::new(Fingerprinter::default(), DetectorConfig::default());
    let (sets, stats) = detector.detect(&buckets);

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].duplicates.len(), 1);
    assert_eq!(stats.failed_files, 2);
    assert_eq!(stats.hashed_files, 2);
}

#[test]
fn test_absent_digests_never_form_a_set() {
    let buckets: SizeBuckets = vec![
        FileRecord::new(PathBuf::from("nonexistent_1.txt"), 100),
        FileRecord::new(PathBuf::from("nonexistent_2.txt"), 100),
    ]
    .into_iter()
    .collect();

    let detector = DuplicateDetector::new(Fingerprinter::default(), DetectorConfig::default());
    let (sets, stats) = detector.detect(&buckets);

    assert!(sets.is_empty());
    assert_eq!(stats.failed_files, 2);
    assert_eq!(stats.distinct_digests, 0);
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let result = DuplicateFinder::with_defaults().find_duplicates(&dir.path().join("missing"));

    match result {
        Err(FinderError::Scan(ScanError::NotFound(path))) => assert!(path.ends_with("missing")),
        other => panic!("Expected NotFound, got: {:?}", other.map(|r| r.summary)),
    }
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, b"not a directory").unwrap();

    let result = DuplicateFinder::with_defaults().find_duplicates(&file);
    assert!(matches!(
        result,
        Err(FinderError::Scan(ScanError::NotADirectory(_)))
    ));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same bytes").unwrap();
    fs::write(dir.path().join("b"), b"same bytes").unwrap();
    let locked = dir.path().join("c");
    fs::write(&locked, b"same bytes").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; only check the skip when permissions apply
    if fs::read(&locked).is_ok() {
        return;
    }

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(result.sets.len(), 1);
    assert_eq!(result.sets[0].duplicates.len(), 1);
    assert_eq!(result.summary.failed_files, 1);
    assert!(result.summary.has_errors());
}

#[cfg(unix)]
#[test]
fn test_broken_symlink_counts_toward_folder() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("real"), b"data").unwrap();
    std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling")).unwrap();

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.summary.total_files, 2);
    assert_eq!(result.summary.unreadable_files, 1);
    assert_eq!(result.scan.folders.get(dir.path()), Some(&2));
    assert!(result.summary.has_errors());
}

#[cfg(unix)]
#[test]
fn test_fifo_beside_empty_file_does_not_block() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("empty"), b"").unwrap();
    let status = std::process::Command::new("mkfifo")
        .arg(dir.path().join("pipe"))
        .status()
        .unwrap();
    assert!(status.success());

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.sets.is_empty());
    assert_eq!(result.summary.total_files, 2);
    assert_eq!(result.summary.candidate_files, 0);
    assert_eq!(result.summary.failed_files, 0);
    assert!(!result.summary.has_errors());
}
