//! Verification documents uploaded by professionals. Files live under
//! `<upload_dir>/documents` with random names and are only ever read back
//! for an admin.

use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{Error, Result};

const DOCUMENTS_SUBDIR: &str = "documents";
const ALLOWED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

#[derive(Clone)]
pub struct DocumentService {
    root: PathBuf,
    max_bytes: usize,
}

/// A stored document read back for download.
pub struct StoredDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub data: Vec<u8>,
}

impl DocumentService {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    /// Validates and writes an upload. Returns the path relative to the
    /// upload root, which is what gets stored on the user.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String> {
        let ext = check_upload(original_name, data, self.max_bytes)?;

        let dir = self.root.join(DOCUMENTS_SUBDIR);
        fs::create_dir_all(&dir).await?;

        let relative = format!("{}/{}.{}", DOCUMENTS_SUBDIR, uuid::Uuid::new_v4(), ext);
        fs::write(self.root.join(&relative), data).await.map_err(|e| {
            tracing::error!(error = %e, "failed to write verification document");
            Error::Io(e)
        })?;

        tracing::info!(path = %relative, size = data.len(), "verification document stored");
        Ok(relative)
    }

    pub async fn load(&self, relative: &str) -> Result<StoredDocument> {
        let path = self.resolve(relative)?;
        let data = match fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::NotFound("Document not found".into()))
            }
            Err(e) => return Err(e.into()),
        };
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(StoredDocument {
            content_type: content_type_for(&file_name),
            file_name,
            data,
        })
    }

    /// Best-effort removal of a document whose registration did not go through.
    pub async fn discard(&self, relative: &str) {
        let Ok(path) = self.resolve(relative) else {
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(error = %e, path = %relative, "could not remove orphaned document");
        }
    }

    /// Refuses anything that is not a plain file name inside the documents
    /// directory, so a tampered row cannot read outside the upload root.
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        let name = relative
            .strip_prefix(DOCUMENTS_SUBDIR)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains(['/', '\\']) && *name != "..")
            .ok_or_else(|| Error::NotFound("Document not found".into()))?;
        Ok(self.root.join(DOCUMENTS_SUBDIR).join(name))
    }
}

/// Checks extension, size and leading magic bytes; returns the normalized
/// extension.
pub fn check_upload(original_name: &str, data: &[u8], max_bytes: usize) -> Result<String> {
    if data.is_empty() {
        return Err(Error::Validation("Please attach your verification document.".into()));
    }
    if data.len() > max_bytes {
        return Err(Error::Validation(format!(
            "Document is too large (limit {} KB).",
            max_bytes / 1024
        )));
    }

    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::Validation(
            "Document must be a PDF, JPG or PNG file.".into(),
        ));
    }

    let content_ok = match ext.as_str() {
        "pdf" => data.starts_with(b"%PDF"),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        _ => false,
    };
    if !content_ok {
        return Err(Error::Validation(format!(
            "The uploaded file is not a valid .{} file.",
            ext
        )));
    }
    Ok(ext)
}

fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next() {
        Some("pdf") => "application/pdf",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
