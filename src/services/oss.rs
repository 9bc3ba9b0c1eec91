// src/services/oss.rs
//! Object-storage browser backed by the `/oss` endpoints

use reqwest::multipart::{Form, Part};
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::app_log;
use crate::core::{ApiClient, FsOps};
use crate::error::{require_non_empty, ApiError, ApiResult};
use crate::store::LibraryStore;
use crate::types::oss::{CreateFolderRequest, OssFile, OssListing, PathsRequest, RenameRequest};
use crate::types::response::ActionResponse;

const BATCH_ARCHIVE_NAME: &str = "files.zip";

#[derive(Debug, Clone)]
pub struct OssService {
    client: ApiClient,
}

impl OssService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, path: &str) -> ApiResult<Vec<OssFile>> {
        let listing: OssListing = self
            .client
            .get_query("/oss/files", &[("path", path)])
            .await?;
        app_log!(debug, "Listed {} entries under '{}'", listing.files.len(), path);
        Ok(listing.files)
    }

    /// List the library's current folder into the store
    pub async fn refresh(&self, library: &mut LibraryStore) -> ApiResult<usize> {
        let files = self.list(library.current_path()).await?;
        let count = files.len();
        library.set_files(files);
        Ok(count)
    }

    pub async fn upload(&self, local: &Path, remote_dir: &str) -> ApiResult<()> {
        let file = FsOps::read_upload(local).await?;
        app_log!(info, "Uploading {} to '{}'", file.file_name, remote_dir);
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(file.content_type)?;
        let form = Form::new()
            .part("file", part)
            .text("path", remote_dir.to_string());
        let response: ActionResponse = self.client.post_multipart("/oss/upload", form).await?;
        response.check()?;
        Ok(())
    }

    pub async fn create_folder(&self, path: &str, folder_name: &str) -> ApiResult<()> {
        require_non_empty("folder name", folder_name)?;
        let response: ActionResponse = self
            .client
            .post_json("/oss/create-folder", &CreateFolderRequest { path, folder_name })
            .await?;
        response.check()?;
        Ok(())
    }

    pub async fn rename(&self, old_path: &str, new_name: &str) -> ApiResult<()> {
        require_non_empty("new name", new_name)?;
        let response: ActionResponse = self
            .client
            .put_json("/oss/rename", &RenameRequest { old_path, new_name })
            .await?;
        response.check()?;
        Ok(())
    }

    pub async fn delete(&self, paths: &[String]) -> ApiResult<()> {
        if paths.is_empty() {
            return Err(ApiError::validation("no files selected"));
        }
        let response: ActionResponse = self
            .client
            .delete_json("/oss/delete", &PathsRequest { paths })
            .await?;
        response.check()?;
        app_log!(info, "Deleted {} objects", paths.len());
        Ok(())
    }

    /// Save one object into `dir`, returning the written path
    pub async fn download(&self, remote_path: &str, dir: &Path) -> ApiResult<PathBuf> {
        require_non_empty("path", remote_path)?;
        let bytes = self
            .client
            .get_bytes("/oss/download", &[("path", remote_path)])
            .await?;
        let target = FsOps::download_target(dir, remote_path);
        FsOps::write_file_bytes(&target, &bytes).await?;
        app_log!(info, "Downloaded {} to {}", remote_path, target.display());
        Ok(target)
    }

    /// Several objects as one zip archive
    pub async fn download_batch(&self, paths: &[String], dir: &Path) -> ApiResult<PathBuf> {
        if paths.is_empty() {
            return Err(ApiError::validation("no files selected"));
        }
        let bytes = self
            .client
            .post_json_bytes("/oss/download-batch", &json!({ "paths": paths }))
            .await?;
        let target = dir.join(BATCH_ARCHIVE_NAME);
        FsOps::write_file_bytes(&target, &bytes).await?;
        app_log!(info, "Downloaded {} objects to {}", paths.len(), target.display());
        Ok(target)
    }
}
