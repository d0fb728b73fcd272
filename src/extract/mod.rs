pub mod ocr;
pub mod pdf;

pub use ocr::{OcrEngine, TesseractOcr, set_tesseract_path};

use std::io::Cursor;

use anyhow::anyhow;
use image::{DynamicImage, ImageFormat};
use tracing::{info, warn};

/// Extracts plain text from an uploaded file based on its extension.
///
/// Returns `None` for unsupported extensions and for any decode/OCR/PDF
/// failure; the orchestrator treats `None` and empty text as the dedicated
/// "no text found" condition. No failure escapes this boundary.
pub async fn extract_text(bytes: &[u8], extension: &str, ocr: &dyn OcrEngine) -> Option<String> {
    match extension {
        "pdf" => pdf::extract_text_from_pdf(bytes),
        "png" | "jpg" | "jpeg" => extract_text_from_image(bytes, ocr).await,
        other => {
            warn!("unsupported file extension: {}", other);
            None
        }
    }
}

async fn extract_text_from_image(bytes: &[u8], ocr: &dyn OcrEngine) -> Option<String> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(image) => image,
        Err(e) => {
            warn!("image decode failed: {}", e);
            return None;
        }
    };

    let png = match encode_png(&decoded) {
        Ok(png) => png,
        Err(e) => {
            warn!("image re-encode failed: {}", e);
            return None;
        }
    };

    match ocr.recognize(&png).await {
        Ok(text) => {
            info!("OCR extracted {} characters", text.len());
            Some(text.trim().to_string())
        }
        Err(e) => {
            warn!("OCR extraction failed: {}", e);
            None
        }
    }
}

/// Normalize any supported input image to PNG before handing it to OCR.
fn encode_png(image: &DynamicImage) -> anyhow::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| anyhow!("failed to encode image: {}", e))?;
    Ok(buffer)
}
