//! File sink: one output file per line identifier, fully overwritten on
//! every pass.

use crate::Endpoint2FileError;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

#[derive(Clone, Debug)]
pub struct ReportSink {
    dir: PathBuf,
}

impl ReportSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the target directory when missing. Only the final path
    /// segment is created; a missing parent is a filesystem failure.
    async fn ensure_dir(&self) -> Result<(), Endpoint2FileError> {
        match tokio::fs::create_dir(&self.dir).await {
            Ok(()) => {
                tracing::info!(dir = %self.dir.display(), "created output directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(Endpoint2FileError::Filesystem {
                path: self.dir.display().to_string(),
                source: e,
            }),
        }
    }

    /// Write the full payload to `{dir}/{file_name}`, replacing any prior
    /// content. Binary overwrite, no atomic rename, no fsync.
    pub async fn write(
        &self,
        file_name: &str,
        body: &[u8],
    ) -> Result<PathBuf, Endpoint2FileError> {
        self.ensure_dir().await?;

        let path = self.dir.join(file_name);
        tracing::debug!(path = %path.display(), bytes = body.len(), "writing report");
        tracing::debug!(body = %String::from_utf8_lossy(body), "report payload");

        let fs_err = |e: std::io::Error| Endpoint2FileError::Filesystem {
            path: path.display().to_string(),
            source: e,
        };
        let mut file = tokio::fs::File::create(&path).await.map_err(&fs_err)?;
        file.write_all(body).await.map_err(&fs_err)?;

        tracing::debug!(path = %path.display(), "report written");
        Ok(path)
    }
}
