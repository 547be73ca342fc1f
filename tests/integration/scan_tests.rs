use dupfind::duplicates::{DuplicateFinder, FinderConfig};
use dupfind::scanner::{HashAlgorithm, PartialReadPolicy, PartialSizes};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_file(path: PathBuf, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let result = finder.find_duplicates(dir.path()).unwrap();

    assert!(result.sets.is_empty());
    assert!(result.scan.buckets.is_empty());
    assert_eq!(result.summary.total_files, 0);
    assert_eq!(result.summary.duplicate_sets, 0);
    assert_eq!(result.scan.folders.get(dir.path()), Some(&0));
}

#[test]
fn test_scan_two_of_three_identical() {
    let dir = tempdir().unwrap();
    let x = vec![b'x'; 100];
    let y = vec![b'y'; 100];
    write_file(dir.path().join("a.txt"), &x);
    write_file(dir.path().join("b.txt"), &x);
    write_file(dir.path().join("c.txt"), &y);

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.scan.buckets.len(), 1);
    assert_eq!(result.sets.len(), 1);
    let set = &result.sets[0];
    assert_eq!(set.size, 100);
    assert_eq!(set.duplicates.len(), 1);
    assert!(set.original.path.ends_with("a.txt"));
    assert!(set.duplicates[0].path.ends_with("b.txt"));
    assert_eq!(result.summary.total_files, 3);
    assert_eq!(result.summary.duplicate_files, 1);
    assert_eq!(result.summary.reclaimable_space, 100);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path().join("a.txt"), b"content a");
    write_file(dir.path().join("b.txt"), b"content b");
    write_file(dir.path().join("c.txt"), b"content c");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.sets.is_empty());
    assert_eq!(result.summary.total_files, 3);
    assert_eq!(result.summary.candidate_files, 3);
    assert_eq!(result.summary.hashed_files, 3);
}

#[test]
fn test_scan_same_content_different_sizes_never_grouped() {
    let dir = tempdir().unwrap();
    write_file(dir.path().join("short"), b"abc");
    write_file(dir.path().join("long"), b"abcabc");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.sets.is_empty());
    // Singleton buckets are never fingerprinted
    assert_eq!(result.summary.candidate_files, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    let deeper = sub.join("deeper");
    fs::create_dir_all(&deeper).unwrap();

    write_file(dir.path().join("a.txt"), b"same content");
    write_file(sub.join("b.txt"), b"same content");
    write_file(deeper.join("c.txt"), b"same content");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.sets.len(), 1);
    assert_eq!(result.sets[0].duplicates.len(), 2);
    assert_eq!(result.scan.folders.len(), 3);
    assert_eq!(result.scan.folders.get(&sub), Some(&1));
    assert_eq!(result.scan.folders.get(&deeper), Some(&1));
}

#[test]
fn test_scan_sets_sorted_largest_first() {
    let dir = tempdir().unwrap();
    for name in ["s1", "s2"] {
        write_file(dir.path().join(name), b"tiny");
    }
    for name in ["l1", "l2"] {
        write_file(dir.path().join(name), &[7u8; 4096]);
    }
    for name in ["m1", "m2"] {
        write_file(dir.path().join(name), &[3u8; 512]);
    }

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let sizes: Vec<u64> = result.sets.iter().map(|s| s.size).collect();
    assert_eq!(sizes, vec![4096, 512, 4]);
}

#[test]
fn test_scan_is_idempotent() {
    let dir = tempdir().unwrap();
    for i in 0..6 {
        write_file(dir.path().join(format!("dup_{i}")), b"repeated payload");
        write_file(dir.path().join(format!("uniq_{i}")), format!("unique {i:04}").as_bytes());
    }

    let finder = DuplicateFinder::new(FinderConfig::default().with_io_threads(4));
    let first = finder.find_duplicates(dir.path()).unwrap();
    let second = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first.sets, second.sets);
    assert_eq!(first.sets.len(), 1);
    assert_eq!(first.sets[0].duplicates.len(), 5);
    assert!(first.sets[0].original.path.ends_with("dup_0"));
}

#[test]
fn test_scan_single_thread_matches_many() {
    let dir = tempdir().unwrap();
    for i in 0..10 {
        write_file(dir.path().join(format!("f{i}")), format!("group {}", i % 3).as_bytes());
    }

    let one = DuplicateFinder::new(FinderConfig::default().with_io_threads(1))
        .find_duplicates(dir.path())
        .unwrap();
    let many = DuplicateFinder::new(FinderConfig::default().with_io_threads(8))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(one.sets, many.sets);
    assert_eq!(one.sets.len(), 3);
}

#[test]
fn test_scan_with_each_algorithm() {
    let dir = tempdir().unwrap();
    write_file(dir.path().join("a"), b"identical");
    write_file(dir.path().join("b"), b"identical");

    for algorithm in [
        HashAlgorithm::Blake3_128,
        HashAlgorithm::Blake3,
        HashAlgorithm::Sha256,
    ] {
        let result = DuplicateFinder::new(FinderConfig::default().with_hash_algorithm(algorithm))
            .find_duplicates(dir.path())
            .unwrap();
        assert_eq!(result.sets.len(), 1);
        assert_eq!(result.sets[0].digest.len(), algorithm.hex_len());
    }
}

#[test]
fn test_scan_partial_policy_groups_by_head_and_tail() {
    let dir = tempdir().unwrap();
    write_file(dir.path().join("a.iso"), b"HEAD-aaaa-TAIL");
    write_file(dir.path().join("b.iso"), b"HEAD-bbbb-TAIL");
    write_file(dir.path().join("a.txt"), b"HEAD-aaaa-TAIL");
    write_file(dir.path().join("b.txt"), b"HEAD-bbbb-TAIL");

    let mut sizes = PartialSizes::default();
    sizes.insert("ISO", PartialReadPolicy::HeadTail { head: 4, tail: 4 });
    let result = DuplicateFinder::new(FinderConfig::default().with_partial_sizes(sizes))
        .find_duplicates(dir.path())
        .unwrap();

    // .iso files match on head and tail; .txt files are hashed in full
    let paths: Vec<String> = result
        .sets
        .iter()
        .flat_map(|s| s.duplicates.iter())
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(result.sets.len(), 1);
    assert_eq!(paths, vec!["b.iso"]);
}

#[test]
fn test_scan_zero_byte_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write_file(dir.path().join("empty1"), b"");
    write_file(dir.path().join("empty2"), b"");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.sets.len(), 1);
    assert_eq!(result.sets[0].size, 0);
    assert_eq!(result.summary.reclaimable_space, 0);
}

#[cfg(unix)]
#[test]
fn test_scan_symlinked_directory_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let real = dir.path().join("real");
    fs::create_dir(&real).unwrap();
    write_file(real.join("file.txt"), b"payload");
    std::os::unix::fs::symlink(&real, dir.path().join("link")).unwrap();

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.summary.total_files, 1);
    assert!(result.sets.is_empty());
}
