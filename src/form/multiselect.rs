//! Workaround for multi-select submission.
//!
//! Applying a payload that mentions a multi-select through the automation
//! client leaves every option selected, not just the requested ones. The
//! selections of each mentioned multi-select are cleared in the page first,
//! so the payload entry only has to add the intended subset.

use serde_json::Value;
use tracing::debug;

use crate::browser::{Browser, ElementHandle};
use crate::error::{HarnessError, Result};
use crate::form::model::FormData;

/// Script returning the names of the multi-selects in the form owning `button`.
pub fn multi_select_names_script(button: &ElementHandle) -> String {
    let locator = match (button.attribute("id"), button.attribute("name")) {
        (Some(id), _) => format!("document.getElementById({})", js_string(id)),
        (None, Some(name)) => format!("document.getElementsByName({})[0]", js_string(name)),
        (None, None) => "null".to_string(),
    };
    format!(
        "(() => {{ const b = {}; const f = (b && b.form) || document.querySelector('form'); \
         return f ? Array.from(f.querySelectorAll('select[multiple]')).map(s => s.name) : []; }})()",
        locator
    )
}

/// Script deselecting every option of the named select.
pub fn clear_selections_script(name: &str) -> String {
    format!(
        "Array.from(document.getElementsByName({})).forEach(s => Array.from(s.options || []).forEach(o => o.selected = false));",
        js_string(name)
    )
}

/// Clear each multi-select mentioned in `data`, then hand the payload back unchanged.
///
/// A payload key matches a control named either `key` or `key[]`.
pub fn patch(button: &ElementHandle, data: FormData, browser: &mut dyn Browser) -> Result<FormData> {
    let names = match browser.evaluate(&multi_select_names_script(button))? {
        Value::Array(values) => values
            .into_iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect::<Vec<_>>(),
        Value::Null => Vec::new(),
        other => {
            return Err(HarnessError::SessionProtocol {
                command: "evaluate".into(),
                error: format!("expected a list of multi-select names, got {}", other),
            });
        }
    };

    for name in names {
        let mentioned = data.contains_key(&name)
            || name
                .strip_suffix("[]")
                .is_some_and(|base| data.contains_key(base));
        if mentioned {
            debug!(select = %name, "clearing multi-select before fill");
            browser.evaluate(&clear_selections_script(&name))?;
        }
    }

    Ok(data)
}

fn js_string(value: &str) -> String {
    // JSON string literals are valid JavaScript string literals
    Value::String(value.to_string()).to_string()
}
