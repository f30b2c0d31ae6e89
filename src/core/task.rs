use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::TempPath;
use uuid::Uuid;

use super::errors::Result;

/// Hard ceiling on attachment size (4 GiB).
pub const MAX_FILE_SIZE: u64 = 4 * 1024 * 1024 * 1024;

pub fn exceeds_size_limit(size: u64) -> bool {
    size > MAX_FILE_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct TransferId(pub Uuid);

impl TransferId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One inbound file being relayed. Owns the local spool file; the file is
/// removed when the task goes away, whatever path the transfer took.
pub struct TransferTask {
    pub id: TransferId,
    pub file_name: String,
    pub total_size: u64,
    pub created_at: DateTime<Utc>,
    started_at: Instant,
    spool: TempPath,
}

impl TransferTask {
    /// Create the task and its unique spool file. Nothing is written yet.
    pub fn create(file_name: &str, total_size: u64) -> Result<Self> {
        let id = TransferId::new();
        let spool = tempfile::Builder::new()
            .prefix(&format!("gofile-relay-{id}-"))
            .tempfile()?
            .into_temp_path();

        Ok(Self {
            id,
            file_name: file_name.to_string(),
            total_size,
            created_at: Utc::now(),
            started_at: Instant::now(),
            spool,
        })
    }

    pub fn spool_path(&self) -> &Path {
        &self.spool
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Remove the spool file eagerly, surfacing the IO error instead of
    /// relying on the drop-time best effort.
    pub fn finish(self) -> Result<()> {
        self.spool.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn size_limit_is_four_gib() {
        assert!(!exceeds_size_limit(0));
        assert!(!exceeds_size_limit(MAX_FILE_SIZE));
        assert!(exceeds_size_limit(MAX_FILE_SIZE + 1));
        assert!(exceeds_size_limit(4_294_967_297));
    }

    #[test]
    fn transfer_ids_are_unique() {
        assert_ne!(TransferId::new(), TransferId::new());
    }

    #[test]
    fn spool_exists_until_finish() {
        let task = TransferTask::create("demo.bin", 42).unwrap();
        let path = PathBuf::from(task.spool_path());
        assert!(path.exists());

        task.finish().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn spool_is_removed_on_drop() {
        let path;
        {
            let task = TransferTask::create("demo.bin", 42).unwrap();
            path = PathBuf::from(task.spool_path());
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn concurrent_tasks_get_distinct_spools() {
        let a = TransferTask::create("same-name.bin", 1).unwrap();
        let b = TransferTask::create("same-name.bin", 1).unwrap();
        assert_ne!(a.spool_path(), b.spool_path());
    }
}
