//! Reading source files referenced by stack frames.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use stacky_constant::defaults::BINARY_SNIFF_BYTES;

/// Where frame sources come from.
#[async_trait]
pub trait SourceReader: Send + Sync {
    async fn read(&self, path: &str) -> io::Result<Vec<u8>>;

    /// How `path` appears in frame headers.
    fn display_path(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Reads from the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct FsSourceReader {
    workspace_root: Option<PathBuf>,
}

impl FsSourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show paths under `root` relative to it.
    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = Some(root.into());
        self
    }
}

#[async_trait]
impl SourceReader for FsSourceReader {
    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    fn display_path(&self, path: &str) -> String {
        let Some(root) = &self.workspace_root else {
            return path.to_string();
        };
        match Path::new(path).strip_prefix(root) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.to_string_lossy().into_owned(),
            _ => path.to_string(),
        }
    }
}

/// A NUL byte near the start means the file is not text.
pub fn is_binary(bytes: &[u8]) -> bool {
    bytes.iter().take(BINARY_SNIFF_BYTES).any(|b| *b == 0)
}
