//! Configuration for the camrec recorder daemon
//!
//! Loads the TOML config file, parses human storage-budget strings
//! ("100M", "1G"), resolves default paths, and validates the save
//! directory before any recording starts.

pub mod budget;
pub mod check;
pub mod config;
pub mod error;
pub mod paths;

pub use budget::{parse_storage_bytes, DEFAULT_STORAGE_BYTES, FAST_MODE_STORAGE_BYTES};
pub use check::check_save_dir;
pub use config::{fast_mode, RecordsConfig};
pub use error::ConfigError;
pub use paths::{config_dir, default_config_path};

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1}TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1}GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}
