//! Storage location helpers.

use std::env;
use std::path::PathBuf;

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "skillscript";

/// Environment variable overriding the storage directory.
pub const STORAGE_DIR_ENV: &str = "SKILLSCRIPT_STORAGE_DIR";

/// Default directory for persistent state.
///
/// On Linux: `~/.local/share/skillscript`
/// On macOS: `~/Library/Application Support/skillscript`
/// On Windows: `%LOCALAPPDATA%\skillscript`
///
/// The directory is not created here.
pub fn default_storage_dir() -> PathBuf {
    if cfg!(target_os = "macos") {
        let home = env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        PathBuf::from(home)
            .join("Library")
            .join("Application Support")
            .join(APP_DIR_NAME)
    } else if cfg!(target_os = "windows") {
        let local_app_data = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("APPDATA").unwrap_or_else(|_| "C:\\tmp".to_string()));
        PathBuf::from(local_app_data).join(APP_DIR_NAME)
    } else {
        let base = env::var("XDG_DATA_HOME").map(PathBuf::from).unwrap_or_else(|_| {
            let home = env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
        base.join(APP_DIR_NAME)
    }
}
