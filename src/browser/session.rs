use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::browser::{Browser, ElementHandle, FormSubmission, Method};
use crate::error::{HarnessError, Result};
use crate::form::model::FormData;

/// Default location of the Node.js browser server script.
pub const DEFAULT_SERVER_SCRIPT: &str = "node/browser_server.js";

/// Request sent to the browser server over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Evaluate {
        cmd: &'static str,
        script: String,
    },
    QueryElements {
        cmd: &'static str,
        xpath: String,
    },
    CurrentUrl {
        cmd: &'static str,
    },
    Fill {
        cmd: &'static str,
        button: String,
        fields: FormData,
    },
    Submit {
        cmd: &'static str,
        button: String,
        method: Method,
    },
    Screenshot {
        cmd: &'static str,
        path: String,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn evaluate(script: &str) -> Self {
        BrowserRequest::Evaluate {
            cmd: "evaluate",
            script: script.to_string(),
        }
    }

    pub fn query_elements(xpath: &str) -> Self {
        BrowserRequest::QueryElements {
            cmd: "query_elements",
            xpath: xpath.to_string(),
        }
    }

    pub fn current_url() -> Self {
        BrowserRequest::CurrentUrl { cmd: "current_url" }
    }

    pub fn fill(submission: &FormSubmission) -> Self {
        BrowserRequest::Fill {
            cmd: "fill",
            button: submission.button_id.clone(),
            fields: submission.fields.clone(),
        }
    }

    pub fn submit(submission: &FormSubmission) -> Self {
        BrowserRequest::Submit {
            cmd: "submit",
            button: submission.button_id.clone(),
            method: submission.method,
        }
    }

    pub fn screenshot(path: &str) -> Self {
        BrowserRequest::Screenshot {
            cmd: "screenshot",
            path: path.to_string(),
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response received from the browser server over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub elements: Option<Vec<ElementHandle>>,
}

/// A persistent browser session backed by a Node.js browser server.
///
/// The server keeps one Chromium page open for the whole run. Commands are
/// sent as NDJSON over stdin and answered one line each on stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    script: String,
    closed: bool,
}

impl BrowserSession {
    /// Launch a new browser session by spawning the server script.
    pub fn launch(script: &str) -> Result<Self> {
        debug!(script, "launching browser server");
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| HarnessError::SubprocessSpawn {
                script: script.to_string(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            HarnessError::SessionIO(format!("Failed to capture stdin of {}", script))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            HarnessError::SessionIO(format!("Failed to capture stdout of {}", script))
        })?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| HarnessError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| HarnessError::JsonParse {
                context: "browser server ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(HarnessError::SessionProtocol {
                command: "launch".into(),
                error: format!("Did not receive ready signal from {}", script),
            });
        }

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            script: script.to_string(),
            closed: false,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse> {
        let json = serde_json::to_string(request).map_err(|e| HarnessError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            HarnessError::SessionIO(format!("Failed to write to {} stdin: {}", self.script, e))
        })?;

        self.stdin.flush().map_err(|e| {
            HarnessError::SessionIO(format!("Failed to flush {} stdin: {}", self.script, e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            HarnessError::SessionIO(format!("Failed to read from {} stdout: {}", self.script, e))
        })?;

        if line.trim().is_empty() {
            return Err(HarnessError::SessionIO(format!(
                "Empty response from {} (process may have died)",
                self.script
            )));
        }

        serde_json::from_str(line.trim()).map_err(|e| HarnessError::JsonParse {
            context: "browser server response".into(),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(&mut self, request: &BrowserRequest, command_name: &str) -> Result<BrowserResponse> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(HarnessError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Quit the browser session.
    pub fn quit(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Best-effort: the process may already be gone
        if let Err(e) = self.send(&BrowserRequest::quit()) {
            warn!(error = %e, "browser server did not acknowledge quit");
        }
        let _ = self.child.wait();
        Ok(())
    }
}

impl Browser for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(url, "navigate");
        self.send_ok(&BrowserRequest::navigate(url), "navigate")?;
        Ok(())
    }

    fn evaluate(&mut self, script: &str) -> Result<Value> {
        let response = self.send_ok(&BrowserRequest::evaluate(script), "evaluate")?;
        Ok(response.value.unwrap_or(Value::Null))
    }

    fn find_elements(&mut self, xpath: &str) -> Result<Vec<ElementHandle>> {
        let response = self.send_ok(&BrowserRequest::query_elements(xpath), "query_elements")?;
        Ok(response.elements.unwrap_or_default())
    }

    fn current_url(&mut self) -> Result<String> {
        let response = self.send_ok(&BrowserRequest::current_url(), "current_url")?;
        response.url.ok_or_else(|| HarnessError::SessionProtocol {
            command: "current_url".into(),
            error: "No URL in current_url response".into(),
        })
    }

    fn fill_form(&mut self, submission: &FormSubmission) -> Result<()> {
        self.send_ok(&BrowserRequest::fill(submission), "fill")?;
        Ok(())
    }

    fn submit_form(&mut self, submission: &FormSubmission) -> Result<()> {
        debug!(button = %submission.button_id, "submit");
        self.send_ok(&BrowserRequest::submit(submission), "submit")?;
        Ok(())
    }

    fn screenshot(&mut self, path: &Path) -> Result<()> {
        let request = BrowserRequest::screenshot(&path.to_string_lossy());
        self.send_ok(&request, "screenshot")?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}
