use serde::{Deserialize, Serialize};

use crate::spec::spec_model::WizardResult;

/// Outcome of one `run` invocation over a set of wizard specs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub suite_name: String,

    /// Number of wizards run
    pub wizards: usize,

    pub passed: usize,
    pub failed: usize,

    /// Actions started across every wizard, failing ones included
    pub actions_run: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,

    pub results: Vec<WizardResult>,
}

impl SuiteReport {
    pub fn from_results(suite_name: &str, results: Vec<WizardResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        SuiteReport {
            suite_name: suite_name.to_string(),
            wizards: results.len(),
            passed,
            failed: results.len() - passed,
            actions_run: results.iter().map(|r| r.actions_run).sum(),
            duration_ms: None,
            results,
        }
    }

    pub fn with_duration(mut self, duration_ms: u128) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    /// Failed wizards, in run order.
    pub fn failures(&self) -> impl Iterator<Item = &WizardResult> {
        self.results.iter().filter(|r| !r.passed)
    }
}
