use std::path::{Path, PathBuf};

use bytes::Bytes;
use tokio::fs;

use crate::error::{Error, Result};
use crate::utils::time::unix_millis;

/// Public path under which stored uploads are served.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// A file received in a multipart body, not yet written to disk.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub data: Bytes,
}

/// `<millis>-<name>` where `name` is the last path component of `original`.
///
/// Uniqueness is only as good as the millisecond clock: the same name uploaded
/// twice within one millisecond yields the same result.
pub fn unique_name_at(millis: i64, original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("upload");
    format!("{}-{}", millis, base)
}

pub fn unique_name(original: &str) -> String {
    unique_name_at(unix_millis(), original)
}

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `create_dir_all` succeeds when the directory already exists, so
    /// concurrent callers may race here freely.
    pub async fn ensure_dir(&self) -> Result<()> {
        if fs::try_exists(&self.dir).await.unwrap_or(false) {
            return Ok(());
        }
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Writes the file and returns its public reference, e.g. `/uploads/1700000000000-photo.png`.
    pub async fn save(&self, file: &UploadedFile) -> Result<String> {
        if file.data.is_empty() {
            return Err(Error::BadRequest("Uploaded file is empty".into()));
        }
        self.ensure_dir().await?;

        let name = unique_name(&file.file_name);
        let path = self.dir.join(&name);
        fs::write(&path, &file.data).await.map_err(|e| {
            tracing::error!(path = %path.display(), "Failed to write upload: {}", e);
            Error::Io(e)
        })?;

        tracing::info!(file = %name, bytes = file.data.len(), "Stored upload");
        Ok(format!("{}/{}", PUBLIC_PREFIX, name))
    }

    /// Removes the file behind a reference returned by [`UploadStore::save`].
    ///
    /// Best effort: references outside `/uploads/` are ignored and a failed
    /// removal is only logged.
    pub async fn discard(&self, reference: &str) {
        let Some(name) = reference
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .and_then(|rest| Path::new(rest).file_name())
        else {
            tracing::warn!(reference = %reference, "Not an upload reference; nothing to discard");
            return;
        };

        let path = self.dir.join(name);
        match fs::remove_file(&path).await {
            Ok(()) => tracing::info!(path = %path.display(), "Discarded upload"),
            Err(e) => tracing::warn!(path = %path.display(), "Failed to discard upload: {}", e),
        }
    }
}
