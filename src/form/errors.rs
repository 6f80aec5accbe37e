use crate::browser::Browser;
use crate::error::Result;

/// XPath of the links inside the rendered error summary.
pub const ERROR_SUMMARY_XPATH: &str =
    "//ul[contains(concat(' ',normalize-space(@class),' '),' govuk-error-summary__list ')]/li/a";

/// Validation errors on a page: field identifier (the link's `href`) to message.
///
/// Keeps DOM order. A repeated identifier replaces the earlier message in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSet(Vec<(String, String)>);

impl ErrorSet {
    pub fn new() -> Self {
        ErrorSet(Vec::new())
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        let message = message.into();
        match self.0.iter_mut().find(|(k, _)| *k == field) {
            Some(entry) => entry.1 = message,
            None => self.0.push((field, message)),
        }
    }

    pub fn with(mut self, field: &str, message: &str) -> Self {
        self.insert(field, message);
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|(k, _)| k == field)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == field).map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Scrape the error summary. Empty when no validation errors are shown.
pub fn extract(browser: &mut dyn Browser) -> Result<ErrorSet> {
    let mut errors = ErrorSet::new();
    for node in browser.find_elements(ERROR_SUMMARY_XPATH)? {
        let href = node.attribute("href").unwrap_or_default().to_string();
        errors.insert(href, node.text().trim());
    }
    Ok(errors)
}
