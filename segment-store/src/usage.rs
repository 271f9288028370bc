//! Storage accounting for a camera's segment directory

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};

/// File extension that marks a completed segment
pub const SEGMENT_EXT: &str = "mp4";

/// Filename timestamp format, e.g. `2024-12-01_15-30-00`
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const TIMESTAMP_LEN: usize = 19;

/// Parse the recording timestamp out of a segment filename like
/// `192.168.1.95_2024-12-01_15-30-00.mp4`.
///
/// Tolerates the `_fragmented` marker and a `-N` collision counter after
/// the timestamp. The identity prefix may itself contain underscores, so
/// the timestamp is taken from the tail of the stem, not split on `_`.
pub fn parse_segment_timestamp(filename: &str) -> Option<NaiveDateTime> {
    let stem = filename.strip_suffix(".mp4")?;

    // Plain names already end in the timestamp. Try that before touching
    // any suffix: the seconds field itself looks like a "-N" counter.
    if let Some(ts) = parse_timestamp_tail(stem) {
        return Some(ts);
    }

    // Strip "-N" collision counter, then the fragmented marker
    let stem = match stem.rsplit_once('-') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) => head,
        _ => stem,
    };
    let stem = stem.strip_suffix("_fragmented").unwrap_or(stem);

    parse_timestamp_tail(stem)
}

fn parse_timestamp_tail(stem: &str) -> Option<NaiveDateTime> {
    if stem.len() < TIMESTAMP_LEN {
        return None;
    }
    let ts = stem.get(stem.len() - TIMESTAMP_LEN..)?;
    NaiveDateTime::parse_from_str(ts, TIMESTAMP_FORMAT).ok()
}

/// Total bytes used by completed segment files in `dir`, non-recursive.
///
/// A file that disappears between listing and stat (the recorder and the
/// retention loop race by design) is treated as absent, not an error.
pub fn directory_usage(dir: &Path) -> Result<u64, StoreError> {
    let mut total = 0u64;

    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !is_segment(&path) {
            continue;
        }
        // Vanished mid-pass: skip
        let Ok(metadata) = std::fs::metadata(&path) else {
            continue;
        };
        total += metadata.len();
    }

    Ok(total)
}

/// Find the oldest segment file in `dir`, or `None` if there are none.
pub fn oldest_segment(dir: &Path) -> Result<Option<PathBuf>, StoreError> {
    oldest_segment_excluding(dir, &HashSet::new())
}

/// Like [`oldest_segment`] but skipping paths in `exclude`. The retention
/// loop uses this to move past a file whose deletion just failed instead
/// of retrying it in a tight loop.
///
/// Order is oldest-first by the timestamp embedded in the filename,
/// falling back to filesystem mtime for names that do not parse, with the
/// filename itself as the final tie-break. The order is a stable total
/// order, so repeated calls pick the same victim.
pub fn oldest_segment_excluding(
    dir: &Path,
    exclude: &HashSet<PathBuf>,
) -> Result<Option<PathBuf>, StoreError> {
    let mut oldest: Option<(NaiveDateTime, String, PathBuf)> = None;

    for entry in std::fs::read_dir(dir)? {
        let Ok(entry) = entry else { continue };
        let path = entry.path();
        if !is_segment(&path) || exclude.contains(&path) {
            continue;
        }

        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };

        let timestamp = match parse_segment_timestamp(&name) {
            Some(ts) => ts,
            None => {
                // Vanished mid-pass: skip
                let Ok(metadata) = std::fs::metadata(&path) else {
                    continue;
                };
                let Ok(modified) = metadata.modified() else {
                    continue;
                };
                DateTime::<Local>::from(modified).naive_local()
            }
        };

        let candidate = (timestamp, name, path);
        let replace = match &oldest {
            None => true,
            Some((ts, name, _)) => (&candidate.0, &candidate.1) < (ts, name),
        };
        if replace {
            oldest = Some(candidate);
        }
    }

    Ok(oldest.map(|(_, _, path)| path))
}

fn is_segment(path: &Path) -> bool {
    path.extension().map(|ext| ext == SEGMENT_EXT).unwrap_or(false)
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
