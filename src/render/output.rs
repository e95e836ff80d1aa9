//! Destination for the rendered config.
//!
//! A file target is replaced through a sibling temporary file and a rename,
//! so readers see either the previous config or the complete new one.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::AutoscaleResult;

/// Where the rendered config goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// `None` means standard output.
    pub fn from_path(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => OutputTarget::File(path),
            None => OutputTarget::Stdout,
        }
    }

    /// Write the complete config.
    pub async fn write(&self, contents: &str) -> AutoscaleResult<()> {
        match self {
            OutputTarget::Stdout => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(contents.as_bytes()).await?;
                stdout.flush().await?;
            }
            OutputTarget::File(path) => replace_file(path, contents).await?,
        }
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "haproxy.cfg".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}

async fn replace_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let staging = staging_path(path);

    if let Err(e) = write_staged(&staging, path, contents).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e);
    }

    tracing::info!(path = %path.display(), bytes = contents.len(), "Config written");
    Ok(())
}

async fn write_staged(staging: &Path, path: &Path, contents: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(staging).await?;
    file.write_all(contents.as_bytes()).await?;
    file.sync_all().await?;
    tokio::fs::rename(staging, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("haproxy.cfg");
        std::fs::write(&path, "old config").unwrap();

        OutputTarget::File(path.clone()).write("new config").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new config");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[tokio::test]
    async fn failed_write_leaves_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("haproxy.cfg");

        assert!(OutputTarget::File(path).write("config").await.is_err());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn no_path_means_stdout() {
        assert_eq!(OutputTarget::from_path(None), OutputTarget::Stdout);
    }
}
