use super::ArtifactExporter;
use crate::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::info;

/// Writes downloads into an output directory and clipboard text to stdout.
#[derive(Debug, Clone)]
pub struct DirectoryExporter {
    output_dir: PathBuf,
}

impl DirectoryExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    async fn target(&self, file_name: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.output_dir).await?;
        Ok(self.output_dir.join(sanitize_file_name(file_name)))
    }
}

// Titles come from the model and may contain path separators.
fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

#[async_trait]
impl ArtifactExporter for DirectoryExporter {
    async fn download_binary(&self, file_name: &str, data: &[u8]) -> Result<()> {
        let path = self.target(file_name).await?;
        tokio::fs::write(&path, data).await?;
        info!("Saved {}", path.display());
        Ok(())
    }

    async fn download_text(&self, file_name: &str, text: &str) -> Result<()> {
        let path = self.target(file_name).await?;
        tokio::fs::write(&path, text).await?;
        info!("Saved {}", path.display());
        Ok(())
    }

    async fn write_clipboard(&self, text: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(text.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(
            sanitize_file_name("Full_Script_AC/DC:_Live?.txt"),
            "Full_Script_AC_DC__Live_.txt"
        );
        assert_eq!(sanitize_file_name("1_RapScene.png"), "1_RapScene.png");
    }

    #[tokio::test]
    async fn test_writes_into_nested_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = DirectoryExporter::new(tmp.path().join("session").join("out"));

        exporter
            .download_binary("1_RapScene.png", &[1, 2, 3])
            .await
            .unwrap();
        exporter
            .download_text("Full_Script_Title.txt", "RAP SCRIPT AI - Title\n")
            .await
            .unwrap();

        let dir = exporter.output_dir();
        assert_eq!(std::fs::read(dir.join("1_RapScene.png")).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            std::fs::read_to_string(dir.join("Full_Script_Title.txt")).unwrap(),
            "RAP SCRIPT AI - Title\n"
        );
    }

    #[tokio::test]
    async fn test_title_cannot_escape_output_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let exporter = DirectoryExporter::new(tmp.path());
        exporter
            .download_text("Full_Script_../../etc.txt", "x")
            .await
            .unwrap();
        assert!(tmp.path().join("Full_Script_.._.._etc.txt").exists());
    }
}
