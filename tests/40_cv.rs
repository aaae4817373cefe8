mod common;

use std::io::Write;

use anyhow::Result;
use portfolio_admin::api::{format_file_size, CvFile};
use portfolio_admin::config::{MIME_DOCX, MIME_PDF};
use portfolio_admin::services::{CvService, UploadFile};
use portfolio_admin::ClientError;
use serde_json::json;

use common::MockApi;

const MIB: usize = 1024 * 1024;

fn service(mock: &MockApi) -> Result<CvService> {
    let config = mock.config();
    let store = common::logged_in_store();
    Ok(CvService::new(common::client(&config, &store)?, config.upload))
}

#[tokio::test]
async fn plain_text_is_rejected_before_sending() -> Result<()> {
    let mock = MockApi::start().await?;
    let cv = service(&mock)?;

    let err = cv
        .upload(UploadFile::new("notes.txt", "text/plain", b"hello".to_vec()))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::UnsupportedFile { .. }), "got {:?}", err);
    assert!(mock.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn oversized_file_is_rejected_before_sending() -> Result<()> {
    let mock = MockApi::start().await?;
    let cv = service(&mock)?;

    let err = cv
        .upload(UploadFile::new("cv.pdf", MIME_PDF, vec![0u8; 10 * MIB + 1]))
        .await
        .unwrap_err();

    match err {
        ClientError::FileTooLarge { size, limit } => {
            assert_eq!(size, (10 * MIB + 1) as u64);
            assert_eq!(limit, (10 * MIB) as u64);
        }
        other => panic!("expected FileTooLarge, got {:?}", other),
    }
    assert!(mock.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn oversized_file_on_disk_is_never_read() -> Result<()> {
    let mock = MockApi::start().await?;
    let cv = service(&mock)?;

    let file = tempfile::Builder::new().suffix(".pdf").tempfile()?;
    file.as_file().set_len((10 * MIB + 1) as u64)?;

    let err = UploadFile::from_path(file.path(), cv.limits()).unwrap_err();

    match err {
        ClientError::FileTooLarge { size, limit } => {
            assert_eq!(size, (10 * MIB + 1) as u64);
            assert_eq!(limit, (10 * MIB) as u64);
        }
        other => panic!("expected FileTooLarge, got {:?}", other),
    }
    assert!(mock.requests().is_empty());
    Ok(())
}

#[test]
fn file_sizes_read_for_humans() {
    assert_eq!(format_file_size(512), "512 Bytes");
    assert_eq!(format_file_size(1536), "1.5 KB");
}

#[tokio::test]
async fn pdf_is_forwarded_as_multipart() -> Result<()> {
    let mock = MockApi::start().await?;
    let cv = service(&mock)?;

    let envelope = cv
        .upload(UploadFile::new("resume.pdf", MIME_PDF, vec![b'%'; 5 * MIB]))
        .await?;

    assert!(envelope.success);
    assert_eq!(envelope.file_path.as_deref(), Some("uploads/cv/resume.pdf"));

    let request = mock.last_request().unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "admin/cv");
    assert_eq!(request.authorization.as_deref(), Some("Bearer test-token"));
    let content_type = request.content_type.unwrap_or_default();
    assert!(
        content_type.starts_with("multipart/form-data; boundary="),
        "unexpected content type {}",
        content_type
    );
    let body = String::from_utf8_lossy(&request.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("Content-Type: application/pdf"));
    assert!(request.body.len() > 5 * MIB);
    Ok(())
}

#[tokio::test]
async fn word_documents_are_accepted() -> Result<()> {
    let mock = MockApi::start().await?;
    let cv = service(&mock)?;

    let mut file = tempfile::Builder::new().suffix(".docx").tempfile()?;
    file.write_all(b"PK\x03\x04 docx bytes")?;

    let upload = UploadFile::from_path(file.path(), cv.limits())?;
    assert_eq!(upload.content_type, MIME_DOCX);

    cv.upload(upload).await?;
    let listed = cv.get_all().await?.into_data("load")?;
    assert_eq!(listed.len(), 1);
    assert!(listed[0].filename.ends_with(".docx"));
    Ok(())
}

#[tokio::test]
async fn delete_targets_the_document() -> Result<()> {
    let mock = MockApi::start().await?;
    let id = mock.seed("cv", json!({
        "filename": "cv.pdf",
        "file_path": "uploads/cv/cv.pdf",
        "size": 2048,
    }));
    let cv = service(&mock)?;

    cv.delete(&id).await?;

    assert_eq!(mock.requests_to("DELETE", &format!("admin/cv/{}", id)).len(), 1);
    assert!(mock.records("cv").is_empty());
    Ok(())
}

#[tokio::test]
async fn download_url_uses_the_configured_origin() -> Result<()> {
    let mock = MockApi::start().await?;
    let cv = service(&mock)?;
    let record = CvFile {
        id: "1".into(),
        filename: "cv.pdf".into(),
        file_path: "uploads\\cv\\cv.pdf".into(),
        size: None,
        created_at: None,
    };

    let url = cv.download_url(&record)?;

    assert_eq!(
        url.as_str(),
        format!("http://127.0.0.1:{}/uploads/cv/cv.pdf", mock.port)
    );
    assert!(mock.requests().is_empty());
    Ok(())
}
