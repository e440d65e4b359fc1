//! Configuration and working-directory paths

use std::path::{Path, PathBuf};

/// Name used for the per-user configuration directory
const APP_NAME: &str = "simpl-tester";

/// Name of the config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "simpl-test.toml";

/// Get the per-user configuration directory path
///
/// Uses the directories crate for platform-appropriate locations:
/// - Linux: `~/.config/simpl-tester/`
/// - macOS: `~/Library/Application Support/simpl-tester/`
/// - Windows: `%APPDATA%\simpl-tester\`
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", APP_NAME).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the per-user configuration file
pub fn user_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

/// Find the configuration file to use for a run
///
/// An explicit path always wins. Otherwise the working directory's
/// `simpl-test.toml` is preferred over the per-user file.
pub fn find_config(explicit: Option<&Path>, workdir: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = workdir.join(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Some(local);
    }

    user_config_path().filter(|p| p.exists())
}

/// Resolve a configured path against the working directory
pub fn resolve(workdir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        workdir.join(path)
    }
}

/// Ensure the parent directory of a file exists
pub fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_config_wins() {
        let explicit = Path::new("/etc/custom.toml");
        let found = find_config(Some(explicit), Path::new("/nonexistent"));
        assert_eq!(found, Some(explicit.to_path_buf()));
    }

    #[test]
    fn test_local_config_is_found() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LOCAL_CONFIG_FILE), "").unwrap();
        let found = find_config(None, dir.path());
        assert_eq!(found, Some(dir.path().join(LOCAL_CONFIG_FILE)));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let workdir = Path::new("/work/tests");
        assert_eq!(resolve(workdir, Path::new("input")), workdir.join("input"));
        assert_eq!(resolve(workdir, Path::new("/abs/bin")), PathBuf::from("/abs/bin"));
    }

    #[test]
    fn test_ensure_parent_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a").join("b").join("out.txt");
        ensure_parent(&file).unwrap();
        assert!(dir.path().join("a").join("b").is_dir());
    }
}
