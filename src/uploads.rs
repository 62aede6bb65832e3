use std::path::{Path, PathBuf};

use crate::error::{ArtLensError, Result};
use crate::models::ImageData;

/// An image written to the uploads directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUpload {
    pub file_name: String,
    pub path: PathBuf,
    pub url: String,
    pub mime_type: String,
}

pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str, max_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write `bytes` under a random name keeping the original extension.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<StoredUpload> {
        if bytes.is_empty() {
            return Err(ArtLensError::validation("file", "uploaded file is empty"));
        }
        if bytes.len() > self.max_bytes {
            return Err(ArtLensError::validation(
                "file",
                format!("uploaded file exceeds {} bytes", self.max_bytes),
            ));
        }

        let mime_type = image_mime_type(original_name)?;
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{}", e.to_lowercase()))
            .unwrap_or_default();
        let file_name = format!("{}{}", uuid::Uuid::new_v4(), extension);
        let path = self.dir.join(&file_name);

        tokio::fs::write(&path, bytes).await?;
        tracing::info!("Stored upload {} ({} bytes)", path.display(), bytes.len());

        Ok(StoredUpload {
            url: format!("{}/{}", self.url_prefix, file_name),
            file_name,
            path,
            mime_type,
        })
    }
}

/// MIME type for an image file name; no extension means JPEG.
pub fn image_mime_type(file_name: &str) -> Result<String> {
    if Path::new(file_name).extension().is_none() {
        return Ok("image/jpeg".to_string());
    }
    let mime = mime_guess::from_path(file_name).first_or_octet_stream();
    if mime.type_() == mime_guess::mime::IMAGE {
        Ok(mime.essence_str().to_string())
    } else {
        Err(ArtLensError::validation(
            "file",
            format!("'{file_name}' is not an image ({mime})"),
        ))
    }
}

impl StoredUpload {
    pub fn image_data(&self, bytes: Vec<u8>) -> ImageData {
        ImageData {
            mime_type: self.mime_type.clone(),
            bytes,
        }
    }
}
