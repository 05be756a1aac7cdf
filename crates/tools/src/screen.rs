//! Screen capture and OCR. Capture uses grim; text extraction shells out to
//! tesseract and degrades gracefully when it is not installed.

use crate::record;
use crate::shell::{run_checked, run_output};
use crate::traits::ActionHandler;
use async_trait::async_trait;
use std::path::PathBuf;
use veda_core::DispatchOutcome;
use veda_memory::SharedActivityLog;

pub struct TakeScreenshot {
    pub dir: PathBuf,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for TakeScreenshot {
    fn name(&self) -> &str {
        "take_screenshot"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let outcome = match self.capture().await {
            Ok(path) => DispatchOutcome::ok(format!("Screenshot saved to {}.", path.display())),
            Err(e) => DispatchOutcome::fail(format!("Screenshot failed: {e}")),
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

impl TakeScreenshot {
    async fn capture(&self) -> Result<PathBuf, String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| e.to_string())?;
        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let path = self.dir.join(format!("screenshot-{stamp}.png"));
        run_checked("grim", &[&path.to_string_lossy()]).await?;
        Ok(path)
    }
}

pub struct ReadScreen {
    pub dir: PathBuf,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for ReadScreen {
    fn name(&self) -> &str {
        "read_screen"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let outcome = match self.capture_and_ocr().await {
            Ok(text) if text.trim().is_empty() => {
                DispatchOutcome::ok("I couldn't make out any text on the screen.")
            }
            Ok(text) => {
                let mut text = text.trim().to_string();
                if text.len() > 400 {
                    text.truncate(400);
                    text.push_str("...");
                }
                DispatchOutcome::ok(format!("The screen says: {text}"))
            }
            Err(e) => DispatchOutcome::fail(format!("I couldn't read the screen: {e}")),
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

impl ReadScreen {
    async fn capture_and_ocr(&self) -> Result<String, String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| e.to_string())?;
        let shot = self.dir.join("ocr-capture.png");
        run_checked("grim", &[&shot.to_string_lossy()]).await?;
        let text = run_output("tesseract", &[&shot.to_string_lossy(), "stdout"]).await?;
        let _ = tokio::fs::remove_file(&shot).await;
        Ok(text)
    }
}

pub struct FindElement {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for FindElement {
    fn name(&self) -> &str {
        "find_element"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let outcome =
            DispatchOutcome::fail("I can't locate on-screen elements: no vision backend is configured.");
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}
