//! Size buckets, duplicate sets and the digest grouping step.
//!
//! # Overview
//!
//! [`SizeBuckets`] is the cheap pre-filter: files of different sizes can
//! never be duplicates, so only buckets holding two or more files are worth
//! fingerprinting. [`DuplicateGrouper`] then folds `(record, digest)` results
//! into [`DuplicateSet`]s: the first record seen for a digest becomes the
//! set's original and every later record with that digest is a duplicate.
//! Grouping is keyed by size as well as digest, since a partial read can
//! give files of different sizes the same digest.
//!
//! # Example
//!
//! ```
//! use dupfind::duplicates::{DuplicateGrouper, SizeBuckets};
//! use dupfind::scanner::FileRecord;
//!
//! let buckets: SizeBuckets = vec![
//!     FileRecord::new("/a.txt", 100),
//!     FileRecord::new("/b.txt", 100),
//!     FileRecord::new("/c.txt", 200),
//! ]
//! .into_iter()
//! .collect();
//! assert_eq!(buckets.candidate_count(), 2);
//!
//! let mut grouper = DuplicateGrouper::new();
//! grouper.observe(FileRecord::new("/a.txt", 100), Some("ab12".to_string()));
//! grouper.observe(FileRecord::new("/b.txt", 100), Some("ab12".to_string()));
//! let sets = grouper.finish();
//! assert_eq!(sets.len(), 1);
//! assert_eq!(sets[0].duplicates.len(), 1);
//! ```

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use crate::scanner::{Digest, FileRecord};

/// Files keyed by exact byte size.
///
/// Records within a bucket keep insertion (traversal) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeBuckets {
    buckets: BTreeMap<u64, Vec<FileRecord>>,
}

impl SizeBuckets {
    /// Create an empty set of buckets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to the bucket for its size.
    pub fn insert(&mut self, record: FileRecord) {
        self.buckets.entry(record.size).or_default().push(record);
    }

    /// Records of exactly `size` bytes.
    #[must_use]
    pub fn get(&self, size: u64) -> Option<&[FileRecord]> {
        self.buckets.get(&size).map(Vec::as_slice)
    }

    /// Number of distinct sizes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Check if no file has been bucketed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total records across all buckets.
    #[must_use]
    pub fn total_files(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// All buckets in ascending size order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[FileRecord])> {
        self.buckets
            .iter()
            .map(|(size, files)| (*size, files.as_slice()))
    }

    /// Buckets holding two or more files, the only ones that can contain duplicates.
    pub fn candidates(&self) -> impl Iterator<Item = (u64, &[FileRecord])> {
        self.iter().filter(|(_, files)| files.len() > 1)
    }

    /// Number of files in candidate buckets.
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates().map(|(_, files)| files.len()).sum()
    }

    /// Statistics describing how much the size filter eliminated.
    #[must_use]
    pub fn grouping_stats(&self) -> GroupingStats {
        let mut stats = GroupingStats {
            unique_sizes: self.buckets.len(),
            ..Default::default()
        };
        for (size, files) in self.iter() {
            stats.total_files += files.len();
            stats.total_size += size * files.len() as u64;
            if files.len() > 1 {
                stats.candidate_files += files.len();
                stats.candidate_buckets += 1;
            } else {
                stats.eliminated_unique += 1;
            }
        }
        stats
    }
}

impl FromIterator<FileRecord> for SizeBuckets {
    fn from_iter<I: IntoIterator<Item = FileRecord>>(iter: I) -> Self {
        let mut buckets = Self::new();
        for record in iter {
            buckets.insert(record);
        }
        buckets
    }
}

/// Statistics from size bucketing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Total number of bucketed files
    pub total_files: usize,
    /// Total size of all bucketed files in bytes
    pub total_size: u64,
    /// Number of distinct file sizes
    pub unique_sizes: usize,
    /// Files in buckets of 2+ (will be fingerprinted)
    pub candidate_files: usize,
    /// Buckets with 2+ files
    pub candidate_buckets: usize,
    /// Files eliminated because no other file shares their size
    pub eliminated_unique: usize,
}

impl GroupingStats {
    /// Percentage of files eliminated by size alone.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            (self.eliminated_unique as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Files sharing one content digest.
///
/// `original` is the first record observed with this digest; it is kept for
/// reference but never appears in `duplicates`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateSet {
    /// Content digest shared by every file in the set
    pub digest: Digest,
    /// File size in bytes, taken from the owning size bucket
    pub size: u64,
    /// First file observed with this digest
    pub original: FileRecord,
    /// Every later file with this digest, in observation order
    pub duplicates: Vec<FileRecord>,
}

impl DuplicateSet {
    /// Number of files including the original.
    #[must_use]
    pub fn len(&self) -> usize {
        self.duplicates.len() + 1
    }

    /// Always false: a set exists only once it has a duplicate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of duplicate copies (excluding the original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    /// Bytes that removing the duplicates would free.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicates.len() as u64
    }

    /// Paths of the duplicates (excluding the original).
    #[must_use]
    pub fn duplicate_paths(&self) -> Vec<PathBuf> {
        self.duplicates.iter().map(|f| f.path.clone()).collect()
    }
}

/// What [`DuplicateGrouper::observe`] did with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// No digest: the file could not be read and was ignored.
    Skipped,
    /// First file with this digest, recorded as the original.
    Original,
    /// Digest seen before; the file joined that digest's set.
    Duplicate,
}

/// Folds fingerprint results into duplicate sets.
///
/// Not thread-safe by itself; the detector feeds it from a single consumer.
#[derive(Debug, Default)]
pub struct DuplicateGrouper {
    originals: HashMap<(u64, Digest), FileRecord>,
    duplicates: HashMap<(u64, Digest), Vec<FileRecord>>,
    skipped: usize,
}

impl DuplicateGrouper {
    /// Create an empty grouper.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one fingerprint result.
    pub fn observe(&mut self, record: FileRecord, digest: Option<Digest>) -> Observation {
        let Some(digest) = digest else {
            self.skipped += 1;
            return Observation::Skipped;
        };

        let key = (record.size, digest);
        if self.originals.contains_key(&key) {
            self.duplicates.entry(key).or_default().push(record);
            Observation::Duplicate
        } else {
            self.originals.insert(key, record);
            Observation::Original
        }
    }

    /// Number of results ignored for lack of a digest.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Number of distinct `(size, digest)` keys seen so far.
    #[must_use]
    pub fn distinct_digests(&self) -> usize {
        self.originals.len()
    }

    /// Build the duplicate sets, sorted largest files first.
    ///
    /// Digests that were seen only once produce no set.
    #[must_use]
    pub fn finish(mut self) -> Vec<DuplicateSet> {
        let mut sets: Vec<DuplicateSet> = self
            .duplicates
            .into_iter()
            .filter_map(|(key, duplicates)| {
                let original = self.originals.remove(&key)?;
                let (size, digest) = key;
                Some(DuplicateSet {
                    digest,
                    size,
                    original,
                    duplicates,
                })
            })
            .collect();
        sort_by_size_desc(&mut sets);
        sets
    }
}

/// Order sets by shared file size, largest first; ties by digest.
pub fn sort_by_size_desc(sets: &mut [DuplicateSet]) {
    sets.sort_by(|a, b| {
        Reverse(a.size)
            .cmp(&Reverse(b.size))
            .then_with(|| a.digest.cmp(&b.digest))
    });
}
