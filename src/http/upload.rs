use crate::http::error::{AppError, AppResult};
use axum::extract::Multipart;
use log::debug;
use std::path::Path;
use tempfile::NamedTempFile;

const PDF_FIELD: &str = "pdf_file";
const CONCEPT_FIELD: &str = "concept";

/// A PDF received in a multipart form, materialized as a temp file.
///
/// The file is deleted when this value is dropped, which covers every exit
/// from a handler including errors and cancelled requests.
#[derive(Debug)]
pub struct UploadedPdf {
    file: NamedTempFile,
    concept: Option<String>,
}

impl UploadedPdf {
    /// Read the `pdf_file` and optional `concept` fields from `multipart`
    pub async fn from_multipart(
        mut multipart: Multipart,
        upload_dir: Option<&Path>,
    ) -> AppResult<Self> {
        let mut pdf_bytes = None;
        let mut concept = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some(PDF_FIELD) => pdf_bytes = Some(field.bytes().await?),
                Some(CONCEPT_FIELD) => concept = Some(field.text().await?),
                _ => {}
            }
        }

        let bytes = pdf_bytes
            .ok_or_else(|| AppError::BadRequest(format!("missing `{}` field", PDF_FIELD)))?;
        Self::from_bytes(&bytes, concept, upload_dir).await
    }

    pub async fn from_bytes(
        bytes: &[u8],
        concept: Option<String>,
        upload_dir: Option<&Path>,
    ) -> AppResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload-").suffix(".pdf");
        let file = match upload_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(AppError::Upload)?;

        tokio::fs::write(file.path(), bytes)
            .await
            .map_err(AppError::Upload)?;
        debug!("Stored {} byte upload at {}", bytes.len(), file.path().display());

        Ok(UploadedPdf { file, concept })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// The `concept` form field, required by the per-concept endpoints
    pub fn concept(&self) -> AppResult<&str> {
        self.concept
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("missing `{}` field", CONCEPT_FIELD)))
    }
}
