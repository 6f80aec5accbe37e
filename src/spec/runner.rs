use tracing::{info, warn};

use crate::error::Result;
use crate::form::model::{substitute, PathMatcher};
use crate::spec::spec_model::{path_matcher, ActionSpec, WizardResult, WizardSpec};
use crate::wizard::assert::assert_path_matches;
use crate::wizard::context::RunContext;
use crate::wizard::debug;
use crate::wizard::exercise::exercise;

/// Executes a WizardSpec action by action.
pub struct WizardRunner;

impl WizardRunner {
    /// Run a complete spec.
    ///
    /// The first failing action ends the run. A failure screenshot named
    /// `<action>-failure` is attempted before the result is returned.
    /// Action numbers in messages are 1-based; `failed_action` stays an index.
    pub fn run(spec: &WizardSpec, ctx: &mut RunContext<'_>, base_url: Option<&str>) -> WizardResult {
        ctx.dataset_name = spec.dataset_name().to_string();
        ctx.variables = spec.variables.clone();
        ctx.action_index = 0;

        info!(spec = %spec.name, actions = spec.actions.len(), "running wizard spec");

        let start_url = resolve_url(base_url, &substitute(&spec.start_url, &ctx.variables));
        if let Err(e) = ctx.browser.navigate(&start_url) {
            return WizardResult {
                spec_name: spec.name.clone(),
                passed: false,
                actions_run: 0,
                failed_action: None,
                failure_location: None,
                error: Some(format!("Failed to navigate to start_url: {}", e)),
            };
        }

        for (i, action) in spec.actions.iter().enumerate() {
            ctx.action_index = i;

            if let Err(e) = Self::execute_action(action, ctx, base_url) {
                warn!(action = i, error = %e, "wizard action failed");
                let name = format!("{}-failure", i + 1);
                debug::take_debug_screenshot(ctx, &name);
                let location = e
                    .location()
                    .map(str::to_string)
                    .unwrap_or_else(|| ctx.action_location());
                return WizardResult {
                    spec_name: spec.name.clone(),
                    passed: false,
                    actions_run: i + 1,
                    failed_action: Some(i),
                    failure_location: Some(location),
                    error: Some(format!("Action {} failed: {}", i + 1, e)),
                };
            }
        }

        WizardResult {
            spec_name: spec.name.clone(),
            passed: true,
            actions_run: spec.actions.len(),
            failed_action: None,
            failure_location: None,
            error: None,
        }
    }

    fn execute_action(action: &ActionSpec, ctx: &mut RunContext<'_>, base_url: Option<&str>) -> Result<()> {
        match action {
            ActionSpec::Form { test_cases, .. } => match action.to_wizard_action()? {
                Some(wizard_action) => exercise(ctx, &wizard_action, test_cases),
                None => Ok(()),
            },

            ActionSpec::Path { path, path_pattern } => {
                let matcher: PathMatcher = path_matcher(path, path_pattern)?.resolve(&ctx.variables);
                debug::action_header(ctx);
                debug::expected_path(ctx, &matcher);
                let location = ctx.action_location();
                assert_path_matches(&mut *ctx.browser, &matcher, &location, "Unexpected page path")
            }

            ActionSpec::Navigate { url } => {
                let target = resolve_url(base_url, &substitute(url, &ctx.variables));
                ctx.browser.navigate(&target)
            }
        }
    }
}

/// Join a relative URL onto the configured base; absolute URLs pass through.
pub fn resolve_url(base_url: Option<&str>, target: &str) -> String {
    if url::Url::parse(target).is_ok() {
        return target.to_string();
    }
    match base_url.and_then(|b| url::Url::parse(b).ok()) {
        Some(base) => base
            .join(target)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| target.to_string()),
        None => target.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_urls_join_base() {
        assert_eq!(
            resolve_url(Some("https://nts.example.com"), "/travel-diary/dashboard"),
            "https://nts.example.com/travel-diary/dashboard"
        );
        assert_eq!(
            resolve_url(Some("https://nts.example.com"), "http://other.test/x"),
            "http://other.test/x"
        );
        assert_eq!(resolve_url(None, "/login"), "/login");
    }
}
