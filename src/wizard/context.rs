use std::collections::HashMap;

use crate::browser::Browser;
use crate::wizard::debug::DebugPolicy;
use crate::wizard::sink::{OutputSink, ScreenshotSink};

/// Run-scoped state shared by every step of an exercise.
///
/// The runner owns `action_index`; nothing below it writes to the context.
pub struct RunContext<'a> {
    pub browser: &'a mut dyn Browser,
    pub output: &'a mut dyn OutputSink,
    pub screenshots: &'a mut dyn ScreenshotSink,

    /// Index of the action being exercised (0-based)
    pub action_index: usize,

    /// Debug verbosity, 0 to 5
    pub verbosity: u8,

    /// Name of the running dataset, used to group screenshots
    pub dataset_name: String,

    /// Values substituted into `{name}` placeholders of expected paths
    pub variables: HashMap<String, String>,
}

impl<'a> RunContext<'a> {
    pub fn new(
        browser: &'a mut dyn Browser,
        output: &'a mut dyn OutputSink,
        screenshots: &'a mut dyn ScreenshotSink,
    ) -> Self {
        RunContext {
            browser,
            output,
            screenshots,
            action_index: 0,
            verbosity: 0,
            dataset_name: String::new(),
            variables: HashMap::new(),
        }
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity.min(DebugPolicy::MAX_LEVEL);
        self
    }

    pub fn with_dataset(mut self, name: &str) -> Self {
        self.dataset_name = name.to_string();
        self
    }

    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables = variables;
        self
    }

    pub fn policy(&self) -> DebugPolicy {
        DebugPolicy::new(self.verbosity)
    }

    /// `Action[i]`, used to prefix action-level assertion failures.
    pub fn action_location(&self) -> String {
        format!("Action[{}]", self.action_index)
    }

    /// `Action[i]/Form[j]`, used to prefix test case assertion failures.
    pub fn form_location(&self, test_case_index: usize) -> String {
        format!("Action[{}]/Form[{}]", self.action_index, test_case_index)
    }
}
