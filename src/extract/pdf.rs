use std::io::Cursor;

use lopdf::Document;
use tracing::{info, warn};

/// Extracts text from a PDF given its raw bytes.
///
/// Pages are walked in order and concatenated with a newline separator. A
/// page that yields no text contributes nothing; only a document that fails
/// to load at all maps to `None`.
pub fn extract_text_from_pdf(bytes: &[u8]) -> Option<String> {
    let doc = match Document::load_from(Cursor::new(bytes)) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("failed to load PDF: {}", e);
            return None;
        }
    };

    let mut text = String::new();
    for (page_num, _) in doc.get_pages() {
        match doc.extract_text(&[page_num]) {
            Ok(content) => {
                text.push_str(&content);
                text.push('\n');
            }
            Err(e) => {
                warn!("skipping page {}: {}", page_num, e);
            }
        }
    }

    info!("PDF extraction produced {} characters", text.len());
    Some(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_yield_none() {
        assert!(extract_text_from_pdf(b"definitely not a pdf").is_none());
    }

    #[test]
    fn empty_input_yields_none() {
        assert!(extract_text_from_pdf(b"").is_none());
    }
}
