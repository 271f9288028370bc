//! Storage budget string parsing
//!
//! Deployment configs express the per-camera storage cap as "100M" or
//! "1G". Anything else falls back to the 10 GiB default rather than
//! failing startup.

const MIB: u64 = 1024 * 1024;
const GIB: u64 = 1024 * 1024 * 1024;

/// Default per-camera storage budget when the config value is missing
/// or unparseable (10 GiB).
pub const DEFAULT_STORAGE_BYTES: u64 = 10 * GIB;

/// Shrunken default budget in fast-iteration mode (20 MiB).
pub const FAST_MODE_STORAGE_BYTES: u64 = 20 * MIB;

/// Convert a max-storage string to bytes.
///
/// Accepts `<n>M` (MiB) and `<n>G` (GiB); any other form, including an
/// empty string or a bare number, yields [`DEFAULT_STORAGE_BYTES`].
pub fn parse_storage_bytes(max_storage: &str) -> u64 {
    let s = max_storage.trim();

    let parsed = if let Some(megs) = s.strip_suffix('M') {
        megs.parse::<u64>().ok().and_then(|n| n.checked_mul(MIB))
    } else if let Some(gigs) = s.strip_suffix('G') {
        gigs.parse::<u64>().ok().and_then(|n| n.checked_mul(GIB))
    } else {
        None
    };

    // Overflowing values are as unusable as unparseable ones
    parsed.unwrap_or(DEFAULT_STORAGE_BYTES)
}
