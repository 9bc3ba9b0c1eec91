// src/core/fs_ops.rs
//! Local file handling for uploads and downloads

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::app_log;
use crate::error::{ApiError, ApiResult};

const RESUME_EXTENSIONS: &[&str] = &["pdf", "doc", "docx"];

/// A local file read into memory, ready to become a multipart part.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            app_log!(info, "Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn read_upload(path: &Path) -> ApiResult<UploadFile> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::validation(format!("not a file: {}", path.display())))?
            .to_string();

        let bytes = fs::read(path).await?;
        if bytes.is_empty() {
            return Err(ApiError::validation(format!("{} is empty", file_name)));
        }

        Ok(UploadFile {
            content_type: Self::content_type_for(&file_name),
            file_name,
            bytes,
        })
    }

    /// Resume uploads accept PDF and Word documents only
    pub async fn read_resume(path: &Path) -> ApiResult<UploadFile> {
        let file = Self::read_upload(path).await?;
        if !Self::is_resume_file(&file.file_name) {
            return Err(ApiError::validation(format!(
                "Unsupported resume format: {}. Allowed: {:?}",
                file.file_name, RESUME_EXTENSIONS
            )));
        }
        Ok(file)
    }

    pub async fn write_file_bytes(path: &Path, bytes: &[u8]) -> ApiResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(path, bytes).await?;
        app_log!(info, "Written file: {}", path.display());
        Ok(())
    }

    /// Destination for a downloaded remote object inside `dir`
    pub fn download_target(dir: &Path, remote_path: &str) -> PathBuf {
        let name = remote_path
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or("download");
        dir.join(name)
    }

    pub fn get_extension(file_name: &str) -> Option<String> {
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    pub fn is_resume_file(file_name: &str) -> bool {
        Self::get_extension(file_name)
            .map(|ext| RESUME_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
    }

    pub fn content_type_for(file_name: &str) -> &'static str {
        match Self::get_extension(file_name).as_deref() {
            Some("pdf") => "application/pdf",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Some("doc") => "application/msword",
            Some("txt") => "text/plain",
            Some("md") => "text/markdown",
            Some("png") => "image/png",
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("zip") => "application/zip",
            _ => "application/octet-stream",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for() {
        assert_eq!(FsOps::content_type_for("cv.PDF"), "application/pdf");
        assert_eq!(
            FsOps::content_type_for("cv.docx"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(FsOps::content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_is_resume_file() {
        assert!(FsOps::is_resume_file("A.pdf"));
        assert!(FsOps::is_resume_file("resume.DOC"));
        assert!(!FsOps::is_resume_file("notes.txt"));
        assert!(!FsOps::is_resume_file("noext"));
    }

    #[test]
    fn test_download_target_uses_last_segment() {
        let dir = Path::new("/tmp/dl");
        assert_eq!(
            FsOps::download_target(dir, "jd/2024/backend.pdf"),
            PathBuf::from("/tmp/dl/backend.pdf")
        );
        assert_eq!(FsOps::download_target(dir, "folder/"), PathBuf::from("/tmp/dl/folder"));
    }

    #[tokio::test]
    async fn test_read_resume_rejects_wrong_format_and_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        tokio::fs::write(&txt, b"hello").await.unwrap();
        assert!(matches!(
            FsOps::read_resume(&txt).await,
            Err(ApiError::Validation(_))
        ));

        let empty = dir.path().join("A.pdf");
        tokio::fs::write(&empty, b"").await.unwrap();
        assert!(matches!(
            FsOps::read_resume(&empty).await,
            Err(ApiError::Validation(_))
        ));

        tokio::fs::write(&empty, b"%PDF-1.4").await.unwrap();
        let file = FsOps::read_resume(&empty).await.unwrap();
        assert_eq!(file.file_name, "A.pdf");
        assert_eq!(file.content_type, "application/pdf");
    }
}
