use tracing::{debug, info};

use crate::browser::{submit_control_xpath, FormSubmission, Method};
use crate::error::{HarnessError, Result};
use crate::form::errors;
use crate::form::model::{FormData, FormTestCase, WizardAction};
use crate::form::multiselect;
use crate::form::reconcile::reconcile;
use crate::form::snapshot;
use crate::wizard::assert::{assert_path_matches, assert_path_not_matches};
use crate::wizard::context::RunContext;
use crate::wizard::debug;

/// Drive every test case of a form action, in order.
///
/// The form state captured before the first test case is restored (after a
/// full clear) before each later one; the first runs against whatever the
/// page arrived with. Any failure aborts the remaining test cases.
///
/// An action without a submit control is a read-only step: nothing touches
/// the browser.
pub fn exercise(ctx: &mut RunContext<'_>, action: &WizardAction, test_cases: &[FormTestCase]) -> Result<()> {
    debug::action_header(ctx);

    let Some(default_button) = action.submit_button_id() else {
        debug!(action = ctx.action_index, "no submit control, skipping form exercise");
        return Ok(());
    };

    let expected_path = action.expected_path().resolve(&ctx.variables);
    debug::expected_path(ctx, &expected_path);

    let action_location = ctx.action_location();
    assert_path_matches(&mut *ctx.browser, &expected_path, &action_location, "Unexpected page path")?;
    let clean_state = snapshot::capture(&mut *ctx.browser)?;

    for (idx, test_case) in test_cases.iter().enumerate() {
        let location = ctx.form_location(idx);
        let button_id = test_case
            .options
            .submit_button
            .as_deref()
            .unwrap_or(default_button);

        info!(%location, button = button_id, "exercising form");

        if idx > 0 {
            snapshot::restore(&mut *ctx.browser, &clean_state, true)?;
        }

        debug::pre_fill(ctx, idx, &test_case.data, &test_case.expected_errors);

        fill_and_submit(ctx, idx, button_id, &test_case.data)?;

        let actual = errors::extract(&mut *ctx.browser)?;
        reconcile(&test_case.expected_errors, &actual, &location)?;

        let skip_path_check = test_case.options.skip_page_url_change_check
            || action.options().skip_page_url_change_check;
        if !skip_path_check {
            if test_case.expected_errors.is_empty() {
                assert_path_not_matches(
                    &mut *ctx.browser,
                    &expected_path,
                    &location,
                    "Page path did not change when expected",
                )?;
            } else {
                assert_path_matches(
                    &mut *ctx.browser,
                    &expected_path,
                    &location,
                    "Page path changed unexpectedly",
                )?;
            }
        }
    }

    Ok(())
}

/// Locate the submit control, fill the form and submit it, with debug
/// captures between the steps.
///
/// Only a failed lookup of the submit control becomes `ControlNotFound`;
/// fill and submit errors pass through as they are.
fn fill_and_submit(ctx: &mut RunContext<'_>, idx: usize, button_id: &str, data: &FormData) -> Result<()> {
    let button = ctx
        .browser
        .find_element(&submit_control_xpath(button_id))
        .map_err(|e| match e {
            HarnessError::ElementNotFound { .. } => HarnessError::ControlNotFound {
                control_id: button_id.to_string(),
            },
            other => other,
        })?;
    let data = multiselect::patch(&button, data.clone(), &mut *ctx.browser)?;
    let submission = FormSubmission::new(&button, button_id, data, Method::Post);

    ctx.browser.fill_form(&submission)?;
    debug::post_fill(ctx, idx);

    ctx.browser.submit_form(&submission)?;
    debug::post_submit(ctx, idx);
    Ok(())
}
