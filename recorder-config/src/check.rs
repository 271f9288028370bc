//! Save-directory precondition checks
//!
//! Run before any capture session starts; a failure here is fatal and
//! the process exits rather than recording into a broken target.

use std::path::Path;

use crate::error::ConfigError;

/// Verify the save directory exists, is a directory, and is writable.
///
/// Writability is checked with a probe file rather than permission bits,
/// so mount options like read-only filesystems are caught too.
pub fn check_save_dir(path: &Path) -> Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::SaveDirMissing(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(ConfigError::SaveDirNotDir(path.display().to_string()));
    }

    let probe = path.join(".camrec-write-probe");
    match std::fs::write(&probe, b"") {
        Ok(()) => {
            let _ = std::fs::remove_file(&probe);
            Ok(())
        }
        Err(_) => Err(ConfigError::SaveDirNotWritable(path.display().to_string())),
    }
}
