use crate::browser::Browser;
use crate::error::{HarnessError, Result};
use crate::form::model::PathMatcher;

/// Fail unless the current page path matches.
pub fn assert_path_matches(
    browser: &mut dyn Browser,
    expected: &PathMatcher,
    location: &str,
    message: &str,
) -> Result<()> {
    let path = browser.current_path()?;
    if expected.matches(&path)? {
        return Ok(());
    }
    Err(HarnessError::AssertionFailed {
        location: location.to_string(),
        message: format!(
            "{} (expected path {} '{}', actual '{}')",
            message,
            describe(expected),
            expected.as_str(),
            path
        ),
    })
}

/// Fail if the current page path still matches.
pub fn assert_path_not_matches(
    browser: &mut dyn Browser,
    expected: &PathMatcher,
    location: &str,
    message: &str,
) -> Result<()> {
    let path = browser.current_path()?;
    if !expected.matches(&path)? {
        return Ok(());
    }
    Err(HarnessError::AssertionFailed {
        location: location.to_string(),
        message: format!(
            "{} (path '{}' still {} '{}')",
            message,
            path,
            describe(expected),
            expected.as_str()
        ),
    })
}

fn describe(matcher: &PathMatcher) -> &'static str {
    if matcher.is_regex() { "matching" } else { "equal to" }
}
