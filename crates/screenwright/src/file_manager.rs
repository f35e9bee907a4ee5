use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::buffer::TextBuffer;

/// Tracks the screenplay file being edited.
#[derive(Debug, Default)]
pub struct FileManager {
    current_path: Option<PathBuf>,
    is_readonly: bool,
}

impl FileManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    pub fn is_readonly(&self) -> bool {
        self.is_readonly
    }

    pub fn has_file(&self) -> bool {
        self.current_path.is_some()
    }

    /// Reads a screenplay. A file that does not exist yet opens empty and is
    /// created on the first save.
    pub async fn open_file(&mut self, path: PathBuf) -> Result<String> {
        if !fs::try_exists(&path).await? {
            log::info!("New file: {}", path.display());
            self.current_path = Some(path);
            self.is_readonly = false;
            return Ok(String::new());
        }

        let metadata = fs::metadata(&path).await?;
        if !metadata.is_file() {
            anyhow::bail!("not a file: {}", path.display());
        }
        self.is_readonly = metadata.permissions().readonly();

        let content = fs::read_to_string(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::PermissionDenied => {
                anyhow::anyhow!("permission denied: {}", path.display())
            }
            std::io::ErrorKind::InvalidData => {
                anyhow::anyhow!("file is not valid UTF-8: {}", path.display())
            }
            _ => anyhow::anyhow!("failed to read {}: {}", path.display(), e),
        })?;
        if content.contains('\0') {
            anyhow::bail!("file looks binary: {}", path.display());
        }

        log::info!("Successfully opened file: {}", path.display());
        self.current_path = Some(path);
        Ok(content)
    }

    /// Writes the buffer to the current file and returns a status message.
    pub async fn save_file(&self, buffer: &mut TextBuffer) -> Result<String> {
        let Some(path) = self.current_path.as_ref() else {
            anyhow::bail!("no file name; start screenwright with a FILE argument");
        };
        if self.is_readonly {
            anyhow::bail!("file is read-only: {}", path.display());
        }

        let content = buffer.content();
        fs::write(path, content.as_bytes())
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::PermissionDenied => {
                    anyhow::anyhow!("no write permission: {}", path.display())
                }
                _ => anyhow::anyhow!("failed to write {}: {}", path.display(), e),
            })?;
        buffer.mark_saved();
        log::info!("Successfully saved file: {}", path.display());
        Ok(format!(
            "Wrote {} lines to {}",
            buffer.line_count(),
            path.display()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[tokio::test]
    async fn test_open_and_save_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "JOHN\nHi.\n").unwrap();

        let mut fm = FileManager::new();
        let content = fm.open_file(temp_file.path().to_path_buf()).await.unwrap();
        assert_eq!(content, "JOHN\nHi.\n");
        assert!(fm.has_file());

        let mut buffer = TextBuffer::from_text(&content);
        buffer.insert_char('!');
        fm.save_file(&mut buffer).await.unwrap();
        assert!(!buffer.is_modified());
        let saved = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(saved, "!JOHN\nHi.\n");
    }

    #[tokio::test]
    async fn test_missing_file_opens_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pilot.fountain");

        let mut fm = FileManager::new();
        assert_eq!(fm.open_file(path.clone()).await.unwrap(), "");
        assert_eq!(fm.current_path(), Some(path.as_path()));

        let mut buffer = TextBuffer::from_text("INT. LAB - NIGHT\n\n");
        fm.save_file(&mut buffer).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "INT. LAB - NIGHT\n\n");
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut fm = FileManager::new();
        assert!(fm.open_file(temp_dir.path().to_path_buf()).await.is_err());
        assert!(!fm.has_file());
    }

    #[tokio::test]
    async fn test_save_without_path_fails() {
        let fm = FileManager::new();
        let mut buffer = TextBuffer::from_text("Rain.");
        assert!(fm.save_file(&mut buffer).await.is_err());
    }
}
