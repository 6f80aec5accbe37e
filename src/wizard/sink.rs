use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::browser::Browser;
use crate::error::Result;

/// Destination for human-readable diagnostics.
pub trait OutputSink {
    fn writeln(&mut self, line: &str);
}

/// Writes to stdout.
#[derive(Debug, Default)]
pub struct ConsoleOutput;

impl OutputSink for ConsoleOutput {
    fn writeln(&mut self, line: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
    }
}

/// Collects lines in memory.
impl OutputSink for Vec<String> {
    fn writeln(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Destination for debug screenshots.
pub trait ScreenshotSink {
    /// Capture the page in view under `tag`, grouped by the running dataset.
    fn take_screenshots(&mut self, browser: &mut dyn Browser, tag: &str, dataset: &str) -> Result<PathBuf>;
}

/// Saves screenshots as `<root>/<dataset>/<tag>.png`.
#[derive(Debug, Clone)]
pub struct DirectoryScreenshots {
    root: PathBuf,
}

impl DirectoryScreenshots {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryScreenshots { root: root.into() }
    }

    pub fn path_for(&self, tag: &str, dataset: &str) -> PathBuf {
        let dir = if dataset.is_empty() {
            self.root.clone()
        } else {
            self.root.join(dataset)
        };
        dir.join(format!("{}.png", tag))
    }
}

impl ScreenshotSink for DirectoryScreenshots {
    fn take_screenshots(&mut self, browser: &mut dyn Browser, tag: &str, dataset: &str) -> Result<PathBuf> {
        let path = self.path_for(tag, dataset);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        browser.screenshot(&path)?;
        Ok(path)
    }
}
