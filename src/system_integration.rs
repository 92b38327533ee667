use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use walkdir::WalkDir;

use crate::config::PanelConfig;
use crate::jobs::SafeRefCodec;

/// Host checks the panel needs while the user edits a job.
#[async_trait]
pub trait HostProbe: Send + Sync {
    /// Whether the storage-management feature behind safe references is installed.
    async fn storage_feature_installed(&self) -> bool;

    /// Whether `path` exists and is a directory.
    async fn is_directory(&self, path: &str) -> bool;

    /// Share names (directories directly under the share root), sorted.
    async fn list_shares(&self) -> Vec<String>;
}

pub struct LocalHost {
    storage_feature: String,
    share_dir: PathBuf,
}

impl LocalHost {
    pub fn new(storage_feature: impl Into<String>, share_dir: PathBuf) -> Self {
        Self {
            storage_feature: storage_feature.into(),
            share_dir,
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        let codec = SafeRefCodec::new(config.share_root.clone());
        Self::new(config.storage_feature.clone(), codec.root_dir())
    }
}

#[async_trait]
impl HostProbe for LocalHost {
    async fn storage_feature_installed(&self) -> bool {
        let found = std::env::var_os("PATH")
            .and_then(|paths| find_in_path(&self.storage_feature, &paths));
        tracing::debug!(feature = %self.storage_feature, found = ?found, "storage feature probe");
        found.is_some()
    }

    async fn is_directory(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }
        tokio::fs::metadata(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn list_shares(&self) -> Vec<String> {
        list_directories(&self.share_dir)
    }
}

/// Locate an executable named `program` in a `PATH`-style list.
pub fn find_in_path(program: &str, paths: &OsStr) -> Option<PathBuf> {
    if program.is_empty() || program.contains('/') {
        return None;
    }
    std::env::split_paths(paths)
        .map(|dir| dir.join(program))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Names of the directories directly inside `dir`. Symlinks are not followed.
pub fn list_directories(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_directories_skips_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("photos")).unwrap();
        fs::create_dir(temp.path().join("music")).unwrap();
        fs::create_dir_all(temp.path().join("music").join("nested")).unwrap();
        fs::write(temp.path().join("readme.txt"), "x").unwrap();

        assert_eq!(list_directories(temp.path()), vec!["music", "photos"]);
    }

    #[test]
    fn test_list_directories_missing_root() {
        let temp = TempDir::new().unwrap();
        assert!(list_directories(&temp.path().join("nope")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let bin = temp.path().join("xnas");
        fs::write(&bin, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&bin, fs::Permissions::from_mode(0o755)).unwrap();

        let not_exec = temp.path().join("plain");
        fs::write(&not_exec, "").unwrap();

        let paths = std::env::join_paths([PathBuf::from("/nonexistent"), temp.path().to_path_buf()]).unwrap();
        assert_eq!(find_in_path("xnas", &paths), Some(bin));
        assert!(find_in_path("plain", &paths).is_none());
        assert!(find_in_path("missing", &paths).is_none());
        assert!(find_in_path("", &paths).is_none());
    }

    #[tokio::test]
    async fn test_local_host_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("docs")).unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        let host = LocalHost::new("definitely-not-installed-feature", temp.path().to_path_buf());
        assert!(host.is_directory(temp.path().to_str().unwrap()).await);
        assert!(!host.is_directory(file.to_str().unwrap()).await);
        assert!(!host.is_directory("").await);
        assert_eq!(host.list_shares().await, vec!["docs"]);
        assert!(!host.storage_feature_installed().await);
    }
}
