use crate::error::{HarnessError, Result};
use crate::report::report_model::SuiteReport;
use crate::spec::spec_model::WizardResult;

/// Render a suite report for the terminal.
///
/// ```text
/// === Wizard specs: 2 wizards ===
///
/// ✓ Diary day 1: 6 actions passed
/// ✗ Onboarding: failed at Action[1]/Form[0] after 2 actions
///     Action 2 failed: Action[1]/Form[0]: Missing/excess validation errors ...
///
/// === 1 passed, 1 failed, 8 actions run ===
/// ```
pub fn format_console_report(report: &SuiteReport) -> String {
    let mut out = format!("=== {}: {} wizards ===\n\n", report.suite_name, report.wizards);

    for result in &report.results {
        out.push_str(&wizard_line(result));
        if let Some(ref error) = result.error {
            out.push_str(&format!("    {}\n", error));
        }
    }

    out.push_str(&format!(
        "\n=== {} passed, {} failed, {} actions run",
        report.passed, report.failed, report.actions_run
    ));
    if let Some(ms) = report.duration_ms {
        out.push_str(&format!(" in {:.1}s", ms as f64 / 1000.0));
    }
    out.push_str(" ===\n");
    out
}

fn wizard_line(result: &WizardResult) -> String {
    if result.passed {
        return format!("\u{2713} {}: {} actions passed\n", result.spec_name, result.actions_run);
    }
    match result.failure_location {
        Some(ref location) => format!(
            "\u{2717} {}: failed at {} after {} actions\n",
            result.spec_name, location, result.actions_run
        ),
        None => format!("\u{2717} {}: failed before the first action\n", result.spec_name),
    }
}

pub fn format_json_report(report: &SuiteReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| HarnessError::JsonSerialize {
        context: "SuiteReport".into(),
        source: e,
    })
}
