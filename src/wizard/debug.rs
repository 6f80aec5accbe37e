use tracing::{debug, warn};

use crate::form::model::{FormData, PathMatcher};
use crate::wizard::context::RunContext;

/// Lifecycle points of a test case where a screenshot may be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePoint {
    PreFill,
    PostFill,
    PostSubmit,
}

impl CapturePoint {
    pub fn tag(self) -> &'static str {
        match self {
            CapturePoint::PreFill => "pre-fill",
            CapturePoint::PostFill => "post-fill",
            CapturePoint::PostSubmit => "post-sub",
        }
    }

    /// Lowest verbosity at which this point is captured.
    pub fn min_level(self) -> u8 {
        match self {
            CapturePoint::PostFill => 3,
            CapturePoint::PreFill => 4,
            CapturePoint::PostSubmit => 5,
        }
    }
}

/// Maps a verbosity level to the diagnostics it enables.
///
/// - 1: action header and expected path
/// - 2: submitted data and expected errors per test case
/// - 3: `post-fill` screenshots
/// - 4: `pre-fill` screenshots
/// - 5: `post-sub` screenshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugPolicy {
    level: u8,
}

impl DebugPolicy {
    pub const MAX_LEVEL: u8 = 5;

    pub fn new(level: u8) -> Self {
        DebugPolicy {
            level: level.min(Self::MAX_LEVEL),
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn prints_header(&self) -> bool {
        self.level >= 1
    }

    pub fn prints_form_data(&self) -> bool {
        self.level >= 2
    }

    pub fn captures(&self, point: CapturePoint) -> bool {
        self.level >= point.min_level()
    }
}

/// Letter of a test case: `b` for the first, `a` being the action itself.
pub fn test_case_letter(test_case_index: usize) -> char {
    char::from_u32(u32::from(b'b') + test_case_index as u32).unwrap_or('?')
}

/// `{1-based action}{letter}-{stage}`, e.g. `1b-pre-fill`.
pub fn screenshot_name(action_index: usize, test_case_index: usize, point: CapturePoint) -> String {
    format!(
        "{}{}-{}",
        action_index + 1,
        test_case_letter(test_case_index),
        point.tag()
    )
}

/// Strip control characters and `<>:"/\|?*` so a dataset name can be a directory.
pub fn sanitize_dataset_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_ascii_control() && !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect()
}

/// Render submitted data as `field="value", multi=["a", "b"]`.
pub fn format_form_data(data: &FormData) -> String {
    if data.is_empty() {
        return "None".to_string();
    }
    data.iter()
        .map(|(field, value)| format!("{}={}", field, value.display_quoted()))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_expected_errors(ids: &[String]) -> String {
    if ids.is_empty() {
        "None".to_string()
    } else {
        ids.join(", ")
    }
}

// ============================================================================
// Capture points
// ============================================================================

pub fn action_header(ctx: &mut RunContext<'_>) {
    if ctx.policy().prints_header() {
        let line = format!("Action #{}", ctx.action_index + 1);
        ctx.output.writeln(&line);
    }
}

pub fn expected_path(ctx: &mut RunContext<'_>, path: &PathMatcher) {
    if ctx.policy().prints_header() {
        let kind = if path.is_regex() { "regex" } else { "literal" };
        let line = format!("  a. Expected path     : {} ({})", path.as_str(), kind);
        ctx.output.writeln(&line);
    }
}

pub fn pre_fill(ctx: &mut RunContext<'_>, test_case_index: usize, data: &FormData, expected_errors: &[String]) {
    let policy = ctx.policy();
    if policy.prints_form_data() {
        let letter = test_case_letter(test_case_index);
        let data_line = format!("  {}. Submit form data  : {}", letter, format_form_data(data));
        let errors_line = format!("     Expected errors   : {}", format_expected_errors(expected_errors));
        ctx.output.writeln(&data_line);
        ctx.output.writeln(&errors_line);
        ctx.output.writeln("");
    }
    capture(ctx, test_case_index, CapturePoint::PreFill);
}

pub fn post_fill(ctx: &mut RunContext<'_>, test_case_index: usize) {
    capture(ctx, test_case_index, CapturePoint::PostFill);
}

pub fn post_submit(ctx: &mut RunContext<'_>, test_case_index: usize) {
    capture(ctx, test_case_index, CapturePoint::PostSubmit);
}

fn capture(ctx: &mut RunContext<'_>, test_case_index: usize, point: CapturePoint) {
    if ctx.policy().captures(point) {
        let name = screenshot_name(ctx.action_index, test_case_index, point);
        take_debug_screenshot(ctx, &name);
    }
}

/// Take a screenshot; a failure is reported and swallowed.
pub fn take_debug_screenshot(ctx: &mut RunContext<'_>, name: &str) {
    let dataset = sanitize_dataset_name(&ctx.dataset_name);
    match ctx.screenshots.take_screenshots(&mut *ctx.browser, name, &dataset) {
        Ok(path) => debug!(path = %path.display(), "debug screenshot"),
        Err(e) => {
            warn!(screenshot = name, error = %e, "debug screenshot failed");
            let line = format!("Failed to take screenshot {}: {}", name, e);
            ctx.output.writeln(&line);
        }
    }
}
