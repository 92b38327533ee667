//! Safe references: a share under the share root addressed by its bare name
//! (`/shares/<name>` ⇔ `<name>`) instead of a raw filesystem path.

use std::path::PathBuf;

pub const DEFAULT_SHARE_ROOT: &str = "shares";

/// Prefix shown in the job table for share-backed endpoints.
pub const SAFE_LABEL_PREFIX: &str = "Xshare:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeRefCodec {
    root: String,
}

impl Default for SafeRefCodec {
    fn default() -> Self {
        Self::new(DEFAULT_SHARE_ROOT)
    }
}

impl SafeRefCodec {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// `/<root>`, the directory whose subdirectories are the shares.
    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(format!("/{}", self.root))
    }

    /// Share name for `/<root>/<name>` (one trailing `/` allowed), `""` for any other shape.
    pub fn to_safe_name(&self, path: &str) -> String {
        let path = path.strip_suffix('/').unwrap_or(path);
        let segments: Vec<&str> = path.split('/').collect();
        match segments.as_slice() {
            ["", root, name] if *root == self.root => name.to_string(),
            _ => String::new(),
        }
    }

    pub fn from_safe_name(&self, name: &str) -> String {
        format!("/{}/{}", self.root, name)
    }

    /// Both endpoints must be shares and the storage feature must be present.
    pub fn is_safe_eligible(&self, source: &str, destination: &str, storage_installed: bool) -> bool {
        storage_installed
            && !self.to_safe_name(source).is_empty()
            && !self.to_safe_name(destination).is_empty()
    }

    /// Table form of one endpoint.
    pub fn display_path(&self, path: &str, safe: bool) -> String {
        if safe {
            format!("{SAFE_LABEL_PREFIX}{}", self.to_safe_name(path))
        } else {
            path.to_string()
        }
    }
}
