use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use path_clean::PathClean;
use tempfile::NamedTempFile;

use crate::utils::{debug_if_enabled, CONFIG_FILE};

pub fn get_exe_path() -> PathBuf {
    let default_path = std::path::PathBuf::from("./");
    let current_exe = std::env::current_exe();
    match current_exe {
        Ok(exe) => {
            match fs::read_link(&exe) {
                Ok(f) => f.parent().map_or(default_path, std::path::Path::to_path_buf),
                Err(_) => exe.parent().map_or(default_path, std::path::Path::to_path_buf)
            }
        }
        Err(_) => default_path
    }
}

/// Prefers `config.yml` in the working directory, then next to the executable.
pub fn get_default_config_file_path() -> String {
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return CONFIG_FILE.to_string();
    }
    let beside_exe = get_exe_path().join(CONFIG_FILE);
    if beside_exe.exists() {
        beside_exe.to_string_lossy().to_string()
    } else {
        CONFIG_FILE.to_string()
    }
}

/// Resolves `file` against `base_dir` unless it is already absolute.
pub fn resolve_path(base_dir: &Path, file: &str) -> PathBuf {
    let path = PathBuf::from(file);
    if path.is_absolute() {
        path.clean()
    } else {
        base_dir.join(path).clean()
    }
}

pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Replaces `path` with `content` through a temp file in the same directory,
/// readers see either the old or the new content.
pub fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let dir = parent_dir(path);
    fs::create_dir_all(&dir)?;
    let mut tmp = NamedTempFile::new_in(&dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| err.error)?;
    debug_if_enabled!("written {}", path.display());
    Ok(())
}

/// `<stem>_backup_<YYYYmmdd_HHMMSS>.<ext>` inside `backup_dir`.
pub fn backup_file_path(original: &Path, backup_dir: &Path, timestamp: &DateTime<Utc>) -> PathBuf {
    let stem = original.file_stem().map_or_else(|| "playlist".to_string(), |s| s.to_string_lossy().to_string());
    let ext = original.extension().map_or_else(|| "m3u".to_string(), |s| s.to_string_lossy().to_string());
    backup_dir.join(format!("{stem}_backup_{}.{ext}", timestamp.format("%Y%m%d_%H%M%S")))
}
