use thiserror::Error;

use crate::error::HarnessError;

/// Failure of the screenshots run.
///
/// Carries the URL of the page in view when it happened, if any, so the
/// caller can try a diagnostic screenshot before giving up.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ScreenshotsError {
    message: String,
    page: Option<String>,
}

impl ScreenshotsError {
    pub fn new(message: impl Into<String>) -> Self {
        ScreenshotsError {
            message: message.into(),
            page: None,
        }
    }

    pub fn on_page(message: impl Into<String>, page: impl Into<String>) -> Self {
        ScreenshotsError {
            message: message.into(),
            page: Some(page.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }
}

impl From<HarnessError> for ScreenshotsError {
    fn from(e: HarnessError) -> Self {
        ScreenshotsError::new(e.to_string())
    }
}

impl From<reqwest::Error> for ScreenshotsError {
    fn from(e: reqwest::Error) -> Self {
        ScreenshotsError::new(format!("Fixture API request failed: {}", e))
    }
}
