use crate::record::EventRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Bucket holding the working-set snapshot.
pub const WORKING_BUCKET: &str = "ackline_working";
/// Bucket holding the archive-tier snapshot.
pub const ARCHIVE_BUCKET: &str = "ackline_archive";

/// Current layout version of [`TierSnapshot`] documents.
pub const SNAPSHOT_FORMAT: u32 = 1;

/// Errors surfaced by snapshot sinks. All of them are non-fatal to the
/// engine: the working set stays authoritative and the write is not retried.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("bucket {bucket} rejected write: {reason}")]
    Write { bucket: String, reason: String },
    #[error("bucket {bucket} unreadable: {reason}")]
    Read { bucket: String, reason: String },
    #[error("bucket {bucket} holds a corrupt document: {source}")]
    Corrupt {
        bucket: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Contract implemented by persistence backends for the two named buckets.
pub trait SnapshotSink {
    fn write_bucket(&mut self, bucket: &str, payload: &[u8]) -> Result<(), SnapshotError>;

    /// Returns `Ok(None)` when the bucket has never been written.
    fn read_bucket(&self, bucket: &str) -> Result<Option<Vec<u8>>, SnapshotError>;
}

/// Self-describing persisted document for one retention tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSnapshot {
    pub format: u32,
    pub written_at_ms: u64,
    pub records: Vec<EventRecord>,
}

impl TierSnapshot {
    pub fn new(written_at_ms: u64, records: Vec<EventRecord>) -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            written_at_ms,
            records,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("tier snapshot serialization must succeed")
    }

    pub fn from_bytes(bucket: &str, payload: &[u8]) -> Result<Self, SnapshotError> {
        serde_json::from_slice(payload).map_err(|source| SnapshotError::Corrupt {
            bucket: bucket.to_string(),
            source,
        })
    }
}

/// Merges the current working set over prior archive content.
///
/// Records present in both tiers keep the working-set version (it carries the
/// newest status); archive-only records are history the working set already
/// evicted and are retained ahead of the live records. The result is trimmed
/// to the most recent `capacity` entries.
pub fn merge_archive(
    archived: Vec<EventRecord>,
    working: &[EventRecord],
    capacity: usize,
) -> Vec<EventRecord> {
    let live_tokens: HashSet<&str> = working
        .iter()
        .map(|record| record.correlation_token.as_str())
        .collect();
    let mut merged: Vec<EventRecord> = archived
        .into_iter()
        .filter(|record| !live_tokens.contains(record.correlation_token.as_str()))
        .collect();
    merged.extend(working.iter().cloned());
    let capacity = capacity.max(1);
    if merged.len() > capacity {
        merged.drain(..merged.len() - capacity);
    }
    merged
}

/// In-memory sink, the default for tests and embedded use.
#[derive(Debug, Default, Clone)]
pub struct MemorySnapshotSink {
    buckets: BTreeMap<String, Vec<u8>>,
}

impl MemorySnapshotSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bucket_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }
}

impl SnapshotSink for MemorySnapshotSink {
    fn write_bucket(&mut self, bucket: &str, payload: &[u8]) -> Result<(), SnapshotError> {
        self.buckets.insert(bucket.to_string(), payload.to_vec());
        Ok(())
    }

    fn read_bucket(&self, bucket: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        Ok(self.buckets.get(bucket).cloned())
    }
}

/// File-backed sink writing one `<bucket>.json` document per bucket.
#[derive(Debug, Clone)]
pub struct FileSnapshotSink {
    directory: PathBuf,
}

impl FileSnapshotSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn bucket_path(&self, bucket: &str) -> PathBuf {
        self.directory.join(format!("{bucket}.json"))
    }

    fn ensure_directory(&self) -> Result<(), SnapshotError> {
        fs::create_dir_all(&self.directory).map_err(|err| SnapshotError::Write {
            bucket: self.directory.display().to_string(),
            reason: err.to_string(),
        })
    }
}

impl SnapshotSink for FileSnapshotSink {
    fn write_bucket(&mut self, bucket: &str, payload: &[u8]) -> Result<(), SnapshotError> {
        self.ensure_directory()?;
        write_atomically(&self.bucket_path(bucket), payload).map_err(|err| {
            SnapshotError::Write {
                bucket: bucket.to_string(),
                reason: err.to_string(),
            }
        })
    }

    fn read_bucket(&self, bucket: &str) -> Result<Option<Vec<u8>>, SnapshotError> {
        match fs::read(self.bucket_path(bucket)) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(SnapshotError::Read {
                bucket: bucket.to_string(),
                reason: err.to_string(),
            }),
        }
    }
}

/// Write-then-rename so a crashed write never leaves a torn document.
fn write_atomically(path: &Path, payload: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload)?;
    fs::rename(&tmp, path)
}
