// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Data directory resolution.

use std::path::{Path, PathBuf};

use smartprint_core::error::Result;

/// Overrides every other location when set.
pub const DATA_DIR_ENV: &str = "SMARTPRINT_DATA_DIR";

const APP_DIR: &str = "smartprint";

/// Return the application data directory, creating it if needed.
///
/// An explicit `override_dir` wins, then `$SMARTPRINT_DATA_DIR`, then
/// `$XDG_DATA_HOME/smartprint`, then `~/.local/share/smartprint`.
pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => resolve(
            std::env::var_os(DATA_DIR_ENV).map(PathBuf::from),
            std::env::var_os("XDG_DATA_HOME").map(PathBuf::from),
            std::env::var_os("HOME").map(PathBuf::from),
        ),
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Return a subdirectory inside `base` (e.g. "uploads"), creating it if needed.
pub fn data_subdir(base: &Path, name: &str) -> Result<PathBuf> {
    let dir = base.join(name);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn resolve(explicit: Option<PathBuf>, xdg: Option<PathBuf>, home: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = explicit.filter(|d| !d.as_os_str().is_empty()) {
        return dir;
    }
    if let Some(xdg) = xdg.filter(|d| !d.as_os_str().is_empty()) {
        return xdg.join(APP_DIR);
    }
    if let Some(home) = home {
        return home.join(".local").join("share").join(APP_DIR);
    }
    // Last resort
    std::env::temp_dir().join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directory_wins() {
        let dir = resolve(
            Some("/srv/smartprint".into()),
            Some("/xdg".into()),
            Some("/home/u".into()),
        );
        assert_eq!(dir, PathBuf::from("/srv/smartprint"));
    }

    #[test]
    fn xdg_then_home() {
        assert_eq!(
            resolve(None, Some("/xdg".into()), Some("/home/u".into())),
            PathBuf::from("/xdg/smartprint")
        );
        assert_eq!(
            resolve(None, Some("".into()), Some("/home/u".into())),
            PathBuf::from("/home/u/.local/share/smartprint")
        );
    }

    #[test]
    fn override_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("nested").join("data");
        let dir = data_dir(Some(&target)).unwrap();
        assert!(dir.is_dir());
        assert!(data_subdir(&dir, "uploads").unwrap().is_dir());
    }
}
