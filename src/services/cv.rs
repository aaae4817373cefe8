use std::fs;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use url::Url;

use crate::api::{CvFile, Envelope};
use crate::client::{ApiClient, RequestOptions};
use crate::config::{UploadConfig, MIME_DOC, MIME_DOCX, MIME_PDF};
use crate::error::{ClientError, ClientResult};
use crate::services::resource::record_path;
use crate::validation::check_upload;

/// A document picked for upload
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, typing it by extension.
    ///
    /// Type and on-disk size are checked against `limits` before any byte
    /// is read.
    pub fn from_path(path: impl AsRef<Path>, limits: &UploadConfig) -> ClientResult<Self> {
        let path = path.as_ref();
        let unreadable = |e: std::io::Error| {
            ClientError::field("file", format!("cannot read {}: {}", path.display(), e))
        };
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| ClientError::field("file", format!("'{}' is not a file", path.display())))?
            .to_string();
        let content_type = content_type_for(&filename).to_string();

        let size = fs::metadata(path).map_err(unreadable)?.len();
        check_upload(&content_type, size, limits)?;
        let bytes = fs::read(path).map_err(unreadable)?;

        Ok(Self {
            content_type,
            filename,
            bytes,
        })
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

pub fn content_type_for(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => MIME_PDF,
        "doc" => MIME_DOC,
        "docx" => MIME_DOCX,
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// CV files: list, multipart upload, delete. There is no update.
#[derive(Clone)]
pub struct CvService {
    client: ApiClient,
    limits: UploadConfig,
}

impl CvService {
    pub fn new(client: ApiClient, limits: UploadConfig) -> Self {
        Self { client, limits }
    }

    pub fn limits(&self) -> &UploadConfig {
        &self.limits
    }

    pub async fn get_all(&self) -> ClientResult<Envelope<Vec<CvFile>>> {
        self.client.get(CvFile::PATH).await
    }

    /// Type and size are checked before anything is sent
    pub async fn upload(&self, file: UploadFile) -> ClientResult<Envelope<CvFile>> {
        check_upload(&file.content_type, file.size(), &self.limits)?;

        tracing::debug!(
            "Uploading {} ({} bytes, {})",
            file.filename,
            file.size(),
            file.content_type
        );

        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|_| ClientError::UnsupportedFile {
                content_type: file.content_type.clone(),
            })?;
        let form = Form::new().part("file", part);

        self.client
            .post_multipart(CvFile::PATH, form, RequestOptions::default())
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<Envelope<()>> {
        self.client.delete(&record_path(CvFile::PATH, id)).await
    }

    /// Stored files are served from the API origin, outside the `/api` prefix
    pub fn download_url(&self, record: &CvFile) -> ClientResult<Url> {
        let mut origin = self.client.base_url().clone();
        origin.set_path("/");
        origin.set_query(None);
        origin.set_fragment(None);

        let relative = record.file_path.replace('\\', "/");
        Ok(origin.join(relative.trim_start_matches('/'))?)
    }
}
