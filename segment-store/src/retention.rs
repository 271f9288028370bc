//! Budget-driven eviction of oldest segments

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::usage::{directory_usage, oldest_segment_excluding, StoreError};

/// Default seconds between retention passes
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Retention settings for one camera directory
#[derive(Debug, Clone, Copy)]
pub struct RetentionPolicy {
    /// Byte ceiling for the directory
    pub max_bytes: u64,
    /// Time between enforcement passes
    pub poll_interval: Duration,
}

impl RetentionPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

/// Delete oldest segments until `dir` is at or under `max_bytes`.
///
/// Usage is re-measured after every deletion. A failed deletion is logged
/// and that file is skipped for the rest of the pass; a file that is
/// already gone just means the recorder or a previous pass won the race.
/// Returns the number of files deleted.
pub fn enforce_budget(dir: &Path, max_bytes: u64) -> Result<usize, StoreError> {
    let mut skipped: HashSet<PathBuf> = HashSet::new();
    let mut deleted = 0usize;

    loop {
        let used = directory_usage(dir)?;
        if used <= max_bytes {
            break;
        }

        let Some(oldest) = oldest_segment_excluding(dir, &skipped)? else {
            // Nothing left we are allowed to delete
            break;
        };

        match std::fs::remove_file(&oldest) {
            Ok(()) => {
                tracing::info!(
                    file = %oldest.display(),
                    used_bytes = used,
                    max_bytes,
                    "deleted oldest segment: storage budget exceeded"
                );
                deleted += 1;
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(file = %oldest.display(), "segment vanished before deletion");
            }
            Err(e) => {
                tracing::warn!(file = %oldest.display(), error = %e, "failed to delete segment");
                skipped.insert(oldest);
            }
        }
    }

    Ok(deleted)
}

/// Long-running retention task for one camera directory.
///
/// Runs an enforcement pass, sleeps `poll_interval`, repeats until the
/// token is cancelled. Errors from a pass (for example the directory
/// briefly missing) are logged and the loop keeps going; only
/// cancellation stops it.
pub async fn retention_loop(dir: PathBuf, policy: RetentionPolicy, cancel: CancellationToken) {
    loop {
        match enforce_budget(&dir, policy.max_bytes) {
            Ok(0) => {}
            Ok(n) => tracing::debug!(dir = %dir.display(), deleted = n, "retention pass done"),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "retention pass failed"),
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(policy.poll_interval) => {}
        }
    }
    tracing::debug!(dir = %dir.display(), "retention loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_segment(dir: &Path, name: &str, size: usize) {
        std::fs::write(dir.join(name), vec![0u8; size]).unwrap();
    }

    #[test]
    fn test_converges_under_budget() {
        let dir = tempdir().unwrap();
        write_segment(dir.path(), "cam_2024-12-01_15-00-00.mp4", 150);
        write_segment(dir.path(), "cam_2024-12-01_16-00-00.mp4", 150);
        write_segment(dir.path(), "cam_2024-12-01_17-00-00.mp4", 150);

        let deleted = enforce_budget(dir.path(), 300).unwrap();

        assert_eq!(deleted, 1);
        assert!(directory_usage(dir.path()).unwrap() <= 300);
        // The oldest file is the one that went
        assert!(!dir.path().join("cam_2024-12-01_15-00-00.mp4").exists());
        assert!(dir.path().join("cam_2024-12-01_17-00-00.mp4").exists());
    }

    #[test]
    fn test_zero_budget_clears_directory() {
        let dir = tempdir().unwrap();
        write_segment(dir.path(), "cam_2024-12-01_15-00-00.mp4", 1);
        write_segment(dir.path(), "cam_2024-12-01_16-00-00.mp4", 1);

        let deleted = enforce_budget(dir.path(), 0).unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(directory_usage(dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_under_budget_deletes_nothing() {
        let dir = tempdir().unwrap();
        write_segment(dir.path(), "cam_2024-12-01_15-00-00.mp4", 100);

        assert_eq!(enforce_budget(dir.path(), 1000).unwrap(), 0);
        assert!(dir.path().join("cam_2024-12-01_15-00-00.mp4").exists());
    }

    #[test]
    fn test_deletes_oldest_first() {
        let dir = tempdir().unwrap();
        write_segment(dir.path(), "cam_2024-12-01_17-00-00.mp4", 100);
        write_segment(dir.path(), "cam_2024-12-01_15-00-00.mp4", 100);
        write_segment(dir.path(), "cam_2024-12-01_16-00-00.mp4", 100);

        // Budget forces exactly one deletion
        enforce_budget(dir.path(), 250).unwrap();

        assert!(!dir.path().join("cam_2024-12-01_15-00-00.mp4").exists());
        assert!(dir.path().join("cam_2024-12-01_16-00-00.mp4").exists());
        assert!(dir.path().join("cam_2024-12-01_17-00-00.mp4").exists());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let dir = tempdir().unwrap();
        let gone = dir.path().join("never-created");
        assert!(enforce_budget(&gone, 0).is_err());
    }

    #[tokio::test]
    async fn test_retention_loop_evicts_and_stops() {
        let dir = tempdir().unwrap();
        write_segment(dir.path(), "cam_2024-12-01_15-00-00.mp4", 100);
        write_segment(dir.path(), "cam_2024-12-01_16-00-00.mp4", 100);

        let cancel = CancellationToken::new();
        let policy = RetentionPolicy::new(0).with_poll_interval(Duration::from_millis(20));
        let handle = tokio::spawn(retention_loop(
            dir.path().to_path_buf(),
            policy,
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(directory_usage(dir.path()).unwrap(), 0);

        cancel.cancel();
        handle.await.unwrap();
    }
}
