use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{HarnessError, Result};
use crate::form::model::FormData;

pub mod session;

/// Blocking browser capability consumed by the form exercise loop.
///
/// Every call runs against the single page currently loaded in the
/// session. Timeouts and retries belong to the implementation.
pub trait Browser {
    /// Load a URL and wait for the page to settle.
    fn navigate(&mut self, url: &str) -> Result<()>;

    /// Evaluate a script in the page and return its JSON-serializable result.
    fn evaluate(&mut self, script: &str) -> Result<Value>;

    /// All elements matching an XPath expression, in document order.
    fn find_elements(&mut self, xpath: &str) -> Result<Vec<ElementHandle>>;

    /// Full URL of the page in view.
    fn current_url(&mut self) -> Result<String>;

    /// Apply field values to the form owning the submission's button.
    fn fill_form(&mut self, submission: &FormSubmission) -> Result<()>;

    /// Submit the form owning the submission's button and wait for the response page.
    fn submit_form(&mut self, submission: &FormSubmission) -> Result<()>;

    /// Save a PNG of the current viewport.
    fn screenshot(&mut self, path: &Path) -> Result<()>;

    /// First element matching an XPath expression.
    fn find_element(&mut self, xpath: &str) -> Result<ElementHandle> {
        self.find_elements(xpath)?
            .into_iter()
            .next()
            .ok_or_else(|| HarnessError::ElementNotFound {
                element: xpath.to_string(),
                context: "no element matches this XPath".into(),
            })
    }

    /// Path component of the current URL.
    fn current_path(&mut self) -> Result<String> {
        let current = self.current_url()?;
        match url::Url::parse(&current) {
            Ok(parsed) => Ok(parsed.path().to_string()),
            // Already a bare path
            Err(_) => Ok(current),
        }
    }
}

/// A located element, with its attributes and visible text read eagerly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementHandle {
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub text: String,
}

impl ElementHandle {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

/// Everything needed to fill and submit one form: the button that submits
/// it, the field values to apply, and the HTTP method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSubmission {
    pub button_id: String,
    pub fields: FormData,
    pub method: Method,
}

impl FormSubmission {
    /// Build a submission from a located submit control.
    ///
    /// The control is addressed by its `id`, falling back to `name`, then to
    /// the identifier used to locate it.
    pub fn new(button: &ElementHandle, locator: &str, fields: FormData, method: Method) -> Self {
        let button_id = button
            .attribute("id")
            .or_else(|| button.attribute("name"))
            .unwrap_or(locator)
            .to_string();
        FormSubmission {
            button_id,
            fields,
            method,
        }
    }
}

/// XPath for a submit control identified by id, name, value or label text.
pub fn submit_control_xpath(control_id: &str) -> String {
    let literal = xpath_literal(control_id);
    format!(
        "//button[@id={l} or @name={l} or @value={l} or normalize-space(.)={l}] | \
         //input[(@type='submit' or @type='button' or @type='image') and (@id={l} or @name={l} or @value={l})]",
        l = literal
    )
}

/// Quote a string for use inside an XPath expression.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}
