// src/types/oss.rs
use serde::{Deserialize, Serialize};

/// Entry of the object-storage browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OssFile {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, alias = "last_modified")]
    pub last_modified: Option<String>,
    #[serde(default, alias = "is_directory")]
    pub is_directory: bool,
    pub path: String,
    #[serde(default, rename = "type")]
    pub file_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OssListing {
    #[serde(default)]
    pub files: Vec<OssFile>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateFolderRequest<'a> {
    pub path: &'a str,
    pub folder_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameRequest<'a> {
    pub old_path: &'a str,
    pub new_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PathsRequest<'a> {
    pub paths: &'a [String],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_camel_and_snake_case() {
        let listing: OssListing = serde_json::from_str(
            r#"{"files":[
                {"name":"jd","path":"jd/","isDirectory":true},
                {"name":"a.pdf","path":"jd/a.pdf","size":12,"last_modified":"2024-05-01","type":"pdf"}
            ]}"#,
        )
        .unwrap();
        assert!(listing.files[0].is_directory);
        assert_eq!(listing.files[1].size, 12);
        assert_eq!(listing.files[1].last_modified.as_deref(), Some("2024-05-01"));
        assert_eq!(listing.files[1].file_type.as_deref(), Some("pdf"));
    }
}
