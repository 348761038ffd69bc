use crate::error::LoadError;
use log::{debug, info, warn};
use mime_guess::from_path;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Text of a single PDF page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Identifier of the document this page belongs to (its file name)
    pub document_id: String,
    /// Zero-based page number
    pub page_index: usize,
    /// Whitespace-normalized page text
    pub text: String,
}

/// Loads page text from a PDF on disk.
///
/// Every call to [`DocumentLoader::load`] re-reads the file from scratch, so a
/// loader can be reused after the underlying file changes.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    path: PathBuf,
}

impl DocumentLoader {
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        DocumentLoader {
            path: file_path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and extract one [`PageText`] per page, in page order
    pub async fn load(&self) -> Result<Vec<PageText>, LoadError> {
        let path = self.path.clone();
        let document_id = document_id_for(&path);

        // Reject files whose extension says they are something else
        if let Some(mime) = from_path(&path).first() {
            let mime_type = mime.to_string();
            debug!("Detected MIME type: {}", mime_type);
            if !mime_type.starts_with("application/pdf") {
                return Err(LoadError::NotPdf { path, mime_type });
            }
        }

        let bytes = read_file(&path).await?;
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(LoadError::InvalidPdf {
                path,
                reason: "missing %PDF- header".to_string(),
            });
        }

        info!("Processing PDF document: {}", path.display());
        let extracted = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes).map_err(|e| e.to_string())
        })
        .await;

        let raw_pages = match extracted {
            Ok(Ok(pages)) => pages,
            Ok(Err(reason)) => return Err(LoadError::InvalidPdf { path, reason }),
            Err(e) => {
                return Err(LoadError::InvalidPdf {
                    path,
                    reason: format!("text extraction aborted: {}", e),
                })
            }
        };

        let pages: Vec<PageText> = raw_pages
            .iter()
            .enumerate()
            .map(|(page_index, raw)| PageText {
                document_id: document_id.clone(),
                page_index,
                text: normalize_whitespace(raw),
            })
            .collect();

        if pages.iter().all(|p| p.text.is_empty()) {
            warn!("Extracted PDF content is empty or contains only whitespace");
        }
        debug!("Loaded {} pages from {}", pages.len(), path.display());

        Ok(pages)
    }
}

pub(crate) async fn read_file(path: &Path) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            LoadError::NotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn document_id_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Normalize whitespace in text (remove multiple consecutive spaces, newlines, etc.)
pub fn normalize_whitespace(text: &str) -> String {
    let result = text.replace('\r', "");

    // Replace multiple consecutive newlines with double newlines (paragraph separator)
    let mut prev_char = ' ';
    let mut newline_count = 0;
    let mut normalized = String::with_capacity(result.len());

    for c in result.chars() {
        if c == '\n' {
            newline_count += 1;
        } else {
            if newline_count > 0 {
                // Add at most two newlines (paragraph break)
                if newline_count >= 2 {
                    normalized.push_str("\n\n");
                } else {
                    normalized.push('\n');
                }
                newline_count = 0;
            }

            // Don't add consecutive spaces
            if !(c == ' ' && prev_char == ' ') {
                normalized.push(c);
            }

            prev_char = c;
        }
    }

    normalized.trim().to_string()
}
