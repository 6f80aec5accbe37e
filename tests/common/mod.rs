#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use nts_harness::browser::{Browser, ElementHandle, FormSubmission};
use nts_harness::error::{HarnessError, Result};
use nts_harness::form::errors::ERROR_SUMMARY_XPATH;
use nts_harness::form::model::FieldValue;
use nts_harness::form::snapshot::{capture_script, SNAPSHOT_ATTRIBUTE};
use nts_harness::wizard::sink::ScreenshotSink;

pub const HOST: &str = "https://nts.test";

/// Decides what a submission does: the path of the response page and the
/// errors it displays.
pub type SubmitHandler = Box<dyn FnMut(&[(String, String)]) -> (String, Vec<(String, String)>)>;

/// A single-form page simulated in memory.
///
/// Multi-selects reproduce the automation defect: filling one only ever
/// adds selections, so stale options stay selected unless cleared first.
pub struct FakeBrowser {
    pub calls: Vec<String>,
    pub path: String,
    pub form: Vec<(String, String)>,
    pub buttons: Vec<ElementHandle>,
    pub multi_selects: Vec<String>,
    pub errors: Vec<(String, String)>,
    pub submitted: Vec<Vec<(String, String)>>,
    pub screenshots: Vec<PathBuf>,
    pub fail_screenshots: bool,
    /// Filling a field the form does not have fails, as a real page would.
    pub strict_fields: bool,
    pub elements: BTreeMap<String, Vec<ElementHandle>>,
    on_submit: SubmitHandler,
}

impl FakeBrowser {
    pub fn new(path: &str) -> Self {
        FakeBrowser {
            calls: Vec::new(),
            path: path.to_string(),
            form: Vec::new(),
            buttons: Vec::new(),
            multi_selects: Vec::new(),
            errors: Vec::new(),
            submitted: Vec::new(),
            screenshots: Vec::new(),
            fail_screenshots: false,
            strict_fields: false,
            elements: BTreeMap::new(),
            on_submit: Box::new(|_| ("/".to_string(), Vec::new())),
        }
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.form.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_button(mut self, id: &str) -> Self {
        self.buttons.push(element("button", &[("id", id), ("type", "submit")], "Continue"));
        self
    }

    pub fn with_multi_select(mut self, name: &str, selected: &[&str]) -> Self {
        self.multi_selects.push(name.to_string());
        for value in selected {
            self.form.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn on_submit(
        mut self,
        handler: impl FnMut(&[(String, String)]) -> (String, Vec<(String, String)>) + 'static,
    ) -> Self {
        self.on_submit = Box::new(handler);
        self
    }

    pub fn with_strict_fields(mut self) -> Self {
        self.strict_fields = true;
        self
    }

    pub fn with_elements(mut self, xpath: &str, elements: Vec<ElementHandle>) -> Self {
        self.elements.insert(xpath.to_string(), elements);
        self
    }

    pub fn field(&self, name: &str) -> Vec<&str> {
        self.form
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    fn set_field(&mut self, name: &str, value: &FieldValue) {
        match value {
            FieldValue::Single(v) => {
                self.form.retain(|(k, _)| k != name);
                self.form.push((name.to_string(), v.clone()));
            }
            FieldValue::Multiple(vs) => {
                let is_multi_select = self.multi_selects.iter().any(|m| m == name);
                if !is_multi_select {
                    self.form.retain(|(k, _)| k != name);
                }
                for v in vs {
                    if !self.field(name).contains(&v.as_str()) {
                        self.form.push((name.to_string(), v.clone()));
                    }
                }
            }
        }
    }

    fn restore(&mut self, script: &str) {
        let start = script.find("const entries = ").map(|i| i + "const entries = ".len());
        let Some(start) = start else { return };
        let end = script[start..].find(";\n").map(|i| i + start).unwrap_or(script.len());
        let entries: Vec<(String, String)> = serde_json::from_str(&script[start..end]).unwrap();
        if script.contains("e.value = ''") {
            // hidden token inputs survive a clear
            self.form.retain(|(name, _)| name.contains("_token"));
            self.form.extend(entries);
        } else {
            for (k, v) in entries {
                self.form.retain(|(name, _)| *name != k);
                self.form.push((k, v));
            }
        }
    }
}

pub fn element(tag: &str, attributes: &[(&str, &str)], text: &str) -> ElementHandle {
    ElementHandle {
        tag: tag.to_string(),
        attributes: attributes
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        text: text.to_string(),
    }
}

impl Browser for FakeBrowser {
    fn navigate(&mut self, url: &str) -> Result<()> {
        self.calls.push(format!("navigate {}", url));
        self.path = url.strip_prefix(HOST).unwrap_or(url).to_string();
        Ok(())
    }

    fn evaluate(&mut self, script: &str) -> Result<Value> {
        self.calls.push("evaluate".to_string());
        if script == capture_script() {
            return Ok(Value::Null);
        }
        if script.contains("const entries = ") {
            self.restore(script);
            return Ok(Value::Null);
        }
        if script.contains("map(s => s.name)") {
            return Ok(json!(self.multi_selects));
        }
        if let Some(rest) = script.strip_prefix("Array.from(document.getElementsByName(") {
            let end = rest.find(')').unwrap();
            let name: String = serde_json::from_str(&rest[..end]).unwrap();
            self.calls.push(format!("clear {}", name));
            self.form.retain(|(k, _)| *k != name);
        }
        Ok(Value::Null)
    }

    fn find_elements(&mut self, xpath: &str) -> Result<Vec<ElementHandle>> {
        self.calls.push(format!("find {}", xpath));
        if xpath == "/html" {
            let snapshot = serde_json::to_string(&self.form).unwrap();
            return Ok(vec![element("html", &[(SNAPSHOT_ATTRIBUTE, &snapshot)], "")]);
        }
        if xpath == ERROR_SUMMARY_XPATH {
            return Ok(self
                .errors
                .iter()
                .map(|(href, msg)| element("a", &[("href", href)], msg))
                .collect());
        }
        if let Some(found) = self.elements.get(xpath) {
            return Ok(found.clone());
        }
        Ok(self
            .buttons
            .iter()
            .filter(|b| {
                b.attribute("id")
                    .is_some_and(|id| xpath.contains(&format!("@id='{}'", id)))
            })
            .cloned()
            .collect())
    }

    fn current_url(&mut self) -> Result<String> {
        self.calls.push("current_url".to_string());
        Ok(format!("{}{}", HOST, self.path))
    }

    fn fill_form(&mut self, submission: &FormSubmission) -> Result<()> {
        self.calls.push(format!("fill {}", submission.button_id));
        for (name, value) in submission.fields.iter() {
            let known = self.form.iter().any(|(k, _)| k == name)
                || self.multi_selects.iter().any(|m| m == name);
            if self.strict_fields && !known {
                return Err(HarnessError::ElementNotFound {
                    element: name.to_string(),
                    context: "no form control with this name".into(),
                });
            }
            self.set_field(name, value);
        }
        Ok(())
    }

    fn submit_form(&mut self, submission: &FormSubmission) -> Result<()> {
        self.calls.push(format!("submit {}", submission.button_id));
        self.submitted.push(self.form.clone());
        let (path, errors) = (self.on_submit)(&self.form);
        self.path = path;
        self.errors = errors;
        Ok(())
    }

    fn screenshot(&mut self, path: &Path) -> Result<()> {
        self.calls.push(format!("screenshot {}", path.display()));
        if self.fail_screenshots {
            return Err(HarnessError::SessionProtocol {
                command: "screenshot".into(),
                error: "disk full".into(),
            });
        }
        self.screenshots.push(path.to_path_buf());
        Ok(())
    }
}

/// Records screenshot tags without touching the browser.
#[derive(Default)]
pub struct RecordingScreenshots {
    pub taken: Vec<(String, String)>,
    pub fail: bool,
}

impl RecordingScreenshots {
    pub fn tags(&self) -> Vec<&str> {
        self.taken.iter().map(|(tag, _)| tag.as_str()).collect()
    }
}

impl ScreenshotSink for RecordingScreenshots {
    fn take_screenshots(&mut self, _browser: &mut dyn Browser, tag: &str, dataset: &str) -> Result<PathBuf> {
        if self.fail {
            return Err(HarnessError::Io(std::io::Error::other("read-only file system")));
        }
        self.taken.push((tag.to_string(), dataset.to_string()));
        Ok(PathBuf::from(format!("{}/{}.png", dataset, tag)))
    }
}

/// Field value of a submitted form state.
pub fn value_of<'a>(state: &'a [(String, String)], name: &str) -> Option<&'a str> {
    state.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}
