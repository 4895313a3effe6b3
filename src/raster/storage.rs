use super::{OutputFormat, encode_bytes};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Directory of generated images, one file per successful request.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    format: OutputFormat,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// `<timestamp>-<token>.<ext>` inside the store directory.
    pub fn next_path(&self) -> PathBuf {
        self.dir
            .join(file_name(Utc::now(), Uuid::new_v4(), self.format))
    }

    /// Encodes `image` in the store's format and writes it under a fresh name.
    pub async fn save(&self, image: &DynamicImage) -> Result<PathBuf> {
        let bytes = encode_bytes(image, self.format)?;
        self.save_encoded(&bytes).await
    }

    /// Writes bytes that are already encoded in the store's format.
    pub async fn save_encoded(&self, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.next_path();
        write_file(&path, bytes).await?;
        info!("Saved generated image: {}", path.display());
        Ok(path)
    }

    /// Writes `image` to an explicit path, replacing any existing file.
    pub async fn save_to(&self, image: &DynamicImage, path: &Path) -> Result<()> {
        let bytes = encode_bytes(image, self.format)?;
        write_file(path, &bytes).await
    }
}

fn file_name(at: DateTime<Utc>, token: Uuid, format: OutputFormat) -> String {
    let token = token.simple().to_string();
    format!(
        "{}-{}.{}",
        at.format("%Y%m%dT%H%M%S_%6f"),
        &token[..8],
        format.extension()
    )
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(|e| {
            Error::persistence(format!("cannot create {}: {}", parent.display(), e))
        })?;
    }

    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| Error::persistence(format!("cannot write {}: {}", path.display(), e)))?;

    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
