use crate::core::interfaces::SourceReader;
use crate::utils::{BundleError, Result};
use std::path::Path;
use tokio::fs;

pub struct TokioFileSystemService;

#[async_trait::async_trait]
impl SourceReader for TokioFileSystemService {
    async fn read_source(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .map_err(|e| BundleError::io(path, e))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| BundleError::io(parent, e))?;
        }

        fs::write(path, content)
            .await
            .map_err(|e| BundleError::io(path, e))
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

#[cfg(test)]
pub use memory::MemoryFileSystem;
