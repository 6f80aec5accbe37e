use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::form::model::{ActionOptions, FormTestCase, PathMatcher, WizardAction};

/// A wizard journey: the pages of a multi-step flow, each with the form
/// submissions to try on it. Deserialized from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WizardSpec {
    /// Human-readable name for this journey
    pub name: String,

    /// URL to navigate to before the first action
    pub start_url: String,

    /// Dataset name used to group screenshots (defaults to `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// Values for `{name}` placeholders in expected paths
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub variables: HashMap<String, String>,

    /// Ordered wizard steps
    pub actions: Vec<ActionSpec>,
}

impl WizardSpec {
    pub fn dataset_name(&self) -> &str {
        self.dataset.as_deref().unwrap_or(&self.name)
    }
}

/// A single wizard step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionSpec {
    /// Exercise the page's form with each test case in turn
    Form {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path_pattern: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        submit_button: Option<String>,
        #[serde(default)]
        options: ActionOptions,
        #[serde(default)]
        test_cases: Vec<FormTestCase>,
    },

    /// Only check the current page path
    Path {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        path_pattern: Option<String>,
    },

    /// Load a URL
    Navigate { url: String },
}

impl ActionSpec {
    /// The wizard action of a `form` step.
    pub fn to_wizard_action(&self) -> Result<Option<WizardAction>> {
        match self {
            ActionSpec::Form {
                path,
                path_pattern,
                submit_button,
                options,
                ..
            } => {
                let matcher = path_matcher(path, path_pattern)?;
                Ok(Some(
                    WizardAction::new(matcher, submit_button.as_deref()).with_options(options.clone()),
                ))
            }
            _ => Ok(None),
        }
    }
}

/// Exactly one of `path` / `path_pattern` must be given.
pub fn path_matcher(path: &Option<String>, path_pattern: &Option<String>) -> Result<PathMatcher> {
    match (path, path_pattern) {
        (Some(literal), None) => Ok(PathMatcher::Literal(literal.clone())),
        (None, Some(pattern)) => Ok(PathMatcher::Pattern(pattern.clone())),
        (Some(_), Some(_)) => Err(HarnessError::Config(
            "action has both 'path' and 'path_pattern'".into(),
        )),
        (None, None) => Err(HarnessError::Config(
            "action needs either 'path' or 'path_pattern'".into(),
        )),
    }
}

/// Result of running a complete wizard spec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WizardResult {
    /// Name of the spec that was run
    pub spec_name: String,

    /// Whether every action passed
    pub passed: bool,

    /// Number of actions started, including a failing one
    pub actions_run: usize,

    /// Zero-based index of the action that failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_action: Option<usize>,

    /// `Action[i]` or `Action[i]/Form[j]` where the failure happened
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_location: Option<String>,

    /// Failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
