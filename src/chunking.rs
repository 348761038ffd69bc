use crate::document::PageText;
use crate::error::SegmentError;

/// Window size used by the pipeline, in characters
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Characters shared between consecutive windows
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

/// Represents a text chunk with metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The actual text content of this chunk
    pub text: String,
    /// Unique identifier for the document this chunk belongs to
    pub document_id: String,
    /// Page the chunk was cut from
    pub page_index: usize,
    /// Starting position of this chunk within its page, in characters
    pub start_position: usize,
}

impl TextChunk {
    /// Position one past the last character of this chunk within its page
    pub fn end_position(&self) -> usize {
        self.start_position + self.text.chars().count()
    }
}

/// Splits pages into overlapping fixed-size character windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSegmenter {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextSegmenter {
    fn default() -> Self {
        TextSegmenter {
            chunk_size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextSegmenter {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, SegmentError> {
        if chunk_size == 0 {
            return Err(SegmentError::ZeroChunkSize);
        }
        // A window that does not advance would never terminate
        if overlap >= chunk_size {
            return Err(SegmentError::OverlapTooLarge {
                chunk_size,
                overlap,
            });
        }
        Ok(TextSegmenter {
            chunk_size,
            overlap,
        })
    }

    /// Split every page in order; blank pages contribute nothing
    pub fn split_pages(&self, pages: &[PageText]) -> Vec<TextChunk> {
        pages
            .iter()
            .flat_map(|page| self.split_text(&page.text, &page.document_id, page.page_index))
            .collect()
    }

    /// Slide a `chunk_size` window over `text`, stepping by `chunk_size - overlap`.
    ///
    /// The final window is cut short at the end of the text, so no trailing
    /// content is lost and a text shorter than one window yields one chunk.
    pub fn split_text(&self, text: &str, document_id: &str, page_index: usize) -> Vec<TextChunk> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        // Byte offset of every char boundary, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;
        let step = self.chunk_size - self.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.chunk_size).min(char_count);
            chunks.push(TextChunk {
                text: text[boundaries[start]..boundaries[end]].to_string(),
                document_id: document_id.to_string(),
                page_index,
                start_position: start,
            });
            if end == char_count {
                break;
            }
            start += step;
        }

        chunks
    }
}
