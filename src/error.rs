use thiserror::Error;

/// Result alias used across the harness.
pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    /// Node.js browser server failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the browser server failed
    #[error("Browser session I/O error: {0}")]
    SessionIO(String),

    /// Browser server answered a command with ok=false
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// No element matched a locator
    #[error("Element '{element}' not found: {context}")]
    ElementNotFound { element: String, context: String },

    /// The submit control of a form action could not be resolved.
    /// Always a test-authoring bug, never a validation failure.
    #[error("Unable to fetch button with ID #{control_id}")]
    ControlNotFound { control_id: String },

    #[error("{location}: {message}")]
    AssertionFailed { location: String, message: String },

    /// Expected and actual validation error fields differ
    #[error(
        "{location}: Missing/excess validation errors on these fields (missing: [{}], excess: [{}])",
        .missing.join(", "),
        .excess.join(", ")
    )]
    ErrorMismatch {
        location: String,
        missing: Vec<String>,
        excess: Vec<String>,
    },

    #[error("{location}: Error message appears to be un-translated: \"{message}\"")]
    UntranslatedMessage { location: String, message: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HarnessError {
    /// Whether this failure is an assertion about page state rather than
    /// a broken session or harness misconfiguration.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            HarnessError::AssertionFailed { .. }
                | HarnessError::ErrorMismatch { .. }
                | HarnessError::UntranslatedMessage { .. }
        )
    }

    /// `Action[i]` or `Action[i]/Form[j]` carried by an assertion failure.
    pub fn location(&self) -> Option<&str> {
        match self {
            HarnessError::AssertionFailed { location, .. }
            | HarnessError::ErrorMismatch { location, .. }
            | HarnessError::UntranslatedMessage { location, .. } => Some(location),
            _ => None,
        }
    }
}
