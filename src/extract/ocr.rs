use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::info;

const DEFAULT_TESSERACT_PATH: &str = "/usr/bin/tesseract";

/// Bounds a single OCR subprocess run; the child is killed on expiry.
const OCR_TIMEOUT: Duration = Duration::from_secs(60);

static TESSERACT_CMD: OnceLock<PathBuf> = OnceLock::new();

/// Sets the Tesseract executable path for the whole process.
///
/// Takes effect only on the first call; repeated calls are no-ops, so startup
/// code may invoke this unconditionally.
pub fn set_tesseract_path(path: impl Into<PathBuf>) {
    let _ = TESSERACT_CMD.set(path.into());
}

fn tesseract_path() -> &'static Path {
    TESSERACT_CMD.get_or_init(|| PathBuf::from(DEFAULT_TESSERACT_PATH))
}

/// OCR collaborator: PNG bytes in, recognized text out.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, image_png: &[u8]) -> anyhow::Result<String>;
}

/// Runs the Tesseract executable in stdin/stdout mode.
pub struct TesseractOcr;

#[async_trait]
impl OcrEngine for TesseractOcr {
    async fn recognize(&self, image_png: &[u8]) -> anyhow::Result<String> {
        let mut child = Command::new(tesseract_path())
            .args(["stdin", "stdout"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| anyhow!("failed to spawn tesseract: {}", e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("tesseract stdin unavailable"))?;
        stdin.write_all(image_png).await?;
        drop(stdin);

        let output = timeout(OCR_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| anyhow!("tesseract timed out after {:?}", OCR_TIMEOUT))??;

        if !output.status.success() {
            return Err(anyhow!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("tesseract recognized {} characters", text.len());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_configuration_is_idempotent() {
        set_tesseract_path("/opt/first/tesseract");
        set_tesseract_path("/opt/second/tesseract");
        assert_eq!(tesseract_path(), Path::new("/opt/first/tesseract"));
    }
}
