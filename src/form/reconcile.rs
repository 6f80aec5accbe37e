use std::sync::LazyLock;

use regex::Regex;

use crate::error::{HarnessError, Result};
use crate::form::errors::ErrorSet;

/// A message shaped like a dotted translation key, e.g. `wizard.name.not_blank`.
static UNTRANSLATED_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+(\.[\w-]+)+$").expect("valid regex"));

pub fn looks_untranslated(message: &str) -> bool {
    UNTRANSLATED_KEY.is_match(message)
}

/// Expected field identifiers absent from `actual`, and actual ones not expected.
///
/// The two lists are disjoint by construction.
pub fn error_diff(expected: &[String], actual: &ErrorSet) -> (Vec<String>, Vec<String>) {
    let missing = expected
        .iter()
        .filter(|id| !actual.contains(id))
        .cloned()
        .collect();
    let excess = actual
        .fields()
        .filter(|field| !expected.iter().any(|id| id == field))
        .map(String::from)
        .collect();
    (missing, excess)
}

/// Assert the displayed errors are exactly the expected ones.
///
/// Every message is checked for the untranslated-key shape first, whether
/// or not its field was expected to error. A mismatch reports both the
/// missing and the excess lists.
pub fn reconcile(expected: &[String], actual: &ErrorSet, location: &str) -> Result<()> {
    for (_, message) in actual.iter() {
        if looks_untranslated(message) {
            return Err(HarnessError::UntranslatedMessage {
                location: location.to_string(),
                message: message.to_string(),
            });
        }
    }

    let (missing, excess) = error_diff(expected, actual);
    if missing != excess {
        return Err(HarnessError::ErrorMismatch {
            location: location.to_string(),
            missing,
            excess,
        });
    }
    Ok(())
}
