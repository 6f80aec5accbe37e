//! Capture and restore of a live form's field values.
//!
//! State crosses the automation boundary as JSON: capture asks the page to
//! serialize its form into a transient attribute on `<html>`, then reads the
//! attribute back; restore embeds the snapshot as a literal in a script.

use serde::{Deserialize, Serialize};

use crate::browser::Browser;
use crate::error::{HarnessError, Result};

/// Attribute on the document root used to carry the serialized form.
pub const SNAPSHOT_ATTRIBUTE: &str = "data-test-formdata";

/// Fields whose name contains this marker are never captured.
pub const TOKEN_MARKER: &str = "_token";

/// Ordered `(name, value)` pairs of a form, excluding anti-forgery tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot(pub Vec<(String, String)>);

impl FormSnapshot {
    pub fn entries(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Script that serializes the first form on the page onto the root element.
pub fn capture_script() -> String {
    format!(
        "document.getElementsByTagName('html')[0].setAttribute('{attr}', \
         JSON.stringify(Array.from(new FormData(document.querySelector('form')))\
         .filter(x => !x[0].includes('{token}'))));",
        attr = SNAPSHOT_ATTRIBUTE,
        token = TOKEN_MARKER
    )
}

/// Read every current field value of the page's form, in document order.
pub fn capture(browser: &mut dyn Browser) -> Result<FormSnapshot> {
    browser.evaluate(&capture_script())?;
    let root = browser.find_element("/html")?;
    let raw = root
        .attribute(SNAPSHOT_ATTRIBUTE)
        .ok_or_else(|| HarnessError::ElementNotFound {
            element: SNAPSHOT_ATTRIBUTE.into(),
            context: "form snapshot attribute missing from <html>".into(),
        })?;

    let pairs: Vec<(String, String)> =
        serde_json::from_str(raw).map_err(|e| HarnessError::JsonParse {
            context: "form snapshot".into(),
            source: e,
        })?;

    Ok(FormSnapshot(
        pairs
            .into_iter()
            .filter(|(name, _)| !name.contains(TOKEN_MARKER))
            .collect(),
    ))
}

const CLEAR_SCRIPT: &str = "document.querySelectorAll('input[type=text],textarea').forEach(e => e.value = '');
document.querySelectorAll('input[type=checkbox],input[type=radio]').forEach(e => e.checked = false);
document.querySelectorAll('select[multiple] option').forEach(o => o.selected = false);
";

// Checkboxes and radios sharing a name are told apart by value; a missing
// control is skipped.
const APPLY_SCRIPT: &str = "entries.forEach(([name, value]) => {
  const all = Array.from(document.getElementsByName(name));
  const elem = all[0];
  if (!elem) { return; }
  const type = elem.getAttribute('type');
  if (['checkbox', 'radio'].includes(type)) {
    const match = all.find(e => e.value === value) || elem;
    match.checked = true;
  } else if (elem.tagName === 'SELECT' && elem.multiple) {
    Array.from(elem.options).filter(o => o.value === value).forEach(o => o.selected = true);
  } else {
    elem.value = value;
  }
});";

/// Script that restores a snapshot, optionally clearing the form first.
pub fn restore_script(snapshot: &FormSnapshot, clear_first: bool) -> Result<String> {
    let json = serde_json::to_string(&snapshot.0).map_err(|e| HarnessError::JsonSerialize {
        context: "form snapshot".into(),
        source: e,
    })?;

    let mut script = String::new();
    if clear_first {
        script.push_str(CLEAR_SCRIPT);
    }
    script.push_str(&format!("const entries = {};\n", json));
    script.push_str(APPLY_SCRIPT);
    // Wrapped so repeated restores never redeclare `entries`
    Ok(format!("(() => {{\n{}\n}})();", script))
}

pub fn restore(browser: &mut dyn Browser, snapshot: &FormSnapshot, clear_first: bool) -> Result<()> {
    browser.evaluate(&restore_script(snapshot, clear_first)?)?;
    Ok(())
}
