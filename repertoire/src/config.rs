//! Configuration for the repertoire CLI.
//!
//! Handles data directory configuration with the following precedence:
//! 1. REPERTOIRE_DATA_DIR environment variable
//! 2. ~/.local/share/repertoire (production default)
//! 3. ./data (fallback for development)

use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".local/share/repertoire";
const DEV_DATA_DIR: &str = "./data";

/// Get the directory holding the statistics database and output files.
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REPERTOIRE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(DEFAULT_DATA_DIR);
    }

    PathBuf::from(DEV_DATA_DIR)
}
