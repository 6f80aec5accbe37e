use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{HarnessError, Result};

// ============================================================================
// Field values and ordered form data
// ============================================================================

/// Value submitted for one field: a scalar, or a list for multi-valued
/// controls (multi-selects, checkbox groups).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// Debug rendering: scalars quoted, sequences bracketed and comma-joined.
    pub fn display_quoted(&self) -> String {
        match self {
            FieldValue::Single(v) => format!("\"{}\"", v),
            FieldValue::Multiple(vs) => {
                let quoted: Vec<String> = vs.iter().map(|v| format!("\"{}\"", v)).collect();
                format!("[{}]", quoted.join(", "))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Single(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Single(value)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(values: Vec<&str>) -> Self {
        FieldValue::Multiple(values.into_iter().map(String::from).collect())
    }
}

/// Field name to value mapping that keeps insertion order.
///
/// Fill order matters on wizard pages where one control reveals another,
/// so this serializes as a map but never reorders its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData(Vec<(String, FieldValue)>);

impl FormData {
    pub fn new() -> Self {
        FormData(Vec::new())
    }

    /// Set a field, replacing an earlier value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for FormData {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FormData {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct FormDataVisitor;

        impl<'de> Visitor<'de> for FormDataVisitor {
            type Value = FormData;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to string or list values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<FormData, A::Error> {
                let mut data = FormData::new();
                while let Some((k, v)) = access.next_entry::<String, FieldValue>()? {
                    data.insert(k, v);
                }
                Ok(data)
            }
        }

        deserializer.deserialize_map(FormDataVisitor)
    }
}

// ============================================================================
// Expected path
// ============================================================================

/// How a wizard step's page path is recognised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathMatcher {
    /// Path must equal this string.
    Literal(String),
    /// Path must match this regular expression.
    Pattern(String),
}

impl PathMatcher {
    pub fn as_str(&self) -> &str {
        match self {
            PathMatcher::Literal(s) | PathMatcher::Pattern(s) => s,
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, PathMatcher::Pattern(_))
    }

    /// Substitute `{name}` placeholders from run variables.
    pub fn resolve(&self, variables: &HashMap<String, String>) -> PathMatcher {
        let resolved = substitute(self.as_str(), variables);
        match self {
            PathMatcher::Literal(_) => PathMatcher::Literal(resolved),
            PathMatcher::Pattern(_) => PathMatcher::Pattern(resolved),
        }
    }

    pub fn matches(&self, path: &str) -> Result<bool> {
        match self {
            PathMatcher::Literal(expected) => Ok(expected == path),
            PathMatcher::Pattern(pattern) => {
                let re = Regex::new(pattern).map_err(|e| {
                    HarnessError::Config(format!("invalid path pattern '{}': {}", pattern, e))
                })?;
                Ok(re.is_match(path))
            }
        }
    }
}

/// Replace `{name}` with the value of `name`; unknown placeholders stay as written.
pub fn substitute(template: &str, variables: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let known = after
            .find('}')
            .and_then(|close| variables.get(&after[..close]).map(|value| (close, value)));
        match known {
            Some((close, value)) => {
                // inserted values are never scanned again
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

// ============================================================================
// Wizard actions and test cases
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOptions {
    /// Skip the post-submit path change check for every test case of the action.
    #[serde(default)]
    pub skip_page_url_change_check: bool,
}

/// One page of a multi-step form flow.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardAction {
    expected_path: PathMatcher,
    submit_button_id: Option<String>,
    options: ActionOptions,
}

impl WizardAction {
    pub fn new(expected_path: PathMatcher, submit_button_id: Option<&str>) -> Self {
        WizardAction {
            expected_path,
            submit_button_id: submit_button_id.map(String::from),
            options: ActionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ActionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn expected_path(&self) -> &PathMatcher {
        &self.expected_path
    }

    /// `None` for read-only steps that have no form to submit.
    pub fn submit_button_id(&self) -> Option<&str> {
        self.submit_button_id.as_deref()
    }

    pub fn options(&self) -> &ActionOptions {
        &self.options
    }
}

/// Per test case overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseOptions {
    /// Submit with this control instead of the action's default.
    #[serde(default)]
    pub submit_button: Option<String>,
    #[serde(default)]
    pub skip_page_url_change_check: bool,
}

/// One attempt at submitting a wizard form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormTestCase {
    #[serde(default)]
    pub data: FormData,
    /// Field identifiers expected to carry a validation error, in report order.
    #[serde(default)]
    pub expected_errors: Vec<String>,
    #[serde(flatten)]
    pub options: TestCaseOptions,
}

impl FormTestCase {
    pub fn new(data: FormData) -> Self {
        FormTestCase {
            data,
            ..Default::default()
        }
    }

    pub fn expecting_errors(mut self, ids: &[&str]) -> Self {
        self.expected_errors = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_submit_button(mut self, id: &str) -> Self {
        self.options.submit_button = Some(id.to_string());
        self
    }

    pub fn skip_page_url_change_check(mut self) -> Self {
        self.options.skip_page_url_change_check = true;
        self
    }
}
