mod common;

use common::{value_of, FakeBrowser, RecordingScreenshots, HOST};
use nts_harness::form::model::{FieldValue, PathMatcher};
use nts_harness::spec::runner::{resolve_url, WizardRunner};
use nts_harness::spec::spec_model::{ActionSpec, WizardSpec};
use nts_harness::wizard::context::RunContext;

const JOURNEY_YAML: &str = r##"
name: Add a journey
start_url: '/travel-diary/day-{day}/journey/add'
variables:
  day: "2"
actions:
  - kind: form
    path: '/travel-diary/day-{day}/journey/add'
    submit_button: continue
    test_cases:
      - data:
          purpose: ""
        expected_errors: ["#purpose"]
      - data:
          purpose: Shopping
          modes: [walk, bus]
  - kind: path
    path_pattern: '^/travel-diary/day-{day}/journey/\d+$'
  - kind: navigate
    url: /travel-diary/dashboard
  - kind: form
    path: /travel-diary/dashboard
"##;

fn journey_page() -> FakeBrowser {
    FakeBrowser::new("/")
        .with_field("purpose", "")
        .with_multi_select("modes", &[])
        .with_button("continue")
        .on_submit(|form| {
            if value_of(form, "purpose").unwrap_or("").is_empty() {
                (
                    "/travel-diary/day-2/journey/add".to_string(),
                    vec![("#purpose".to_string(), "Enter the journey purpose".to_string())],
                )
            } else {
                ("/travel-diary/day-2/journey/17".to_string(), Vec::new())
            }
        })
}

// =========================================================================
// Spec parsing
// =========================================================================

#[test]
fn parses_wizard_yaml() {
    let spec: WizardSpec = serde_yaml::from_str(JOURNEY_YAML).unwrap();

    assert_eq!(spec.name, "Add a journey");
    assert_eq!(spec.dataset_name(), "Add a journey");
    assert_eq!(spec.variables.get("day").map(String::as_str), Some("2"));
    assert_eq!(spec.actions.len(), 4);

    match &spec.actions[0] {
        ActionSpec::Form { test_cases, .. } => {
            assert_eq!(test_cases.len(), 2);
            assert_eq!(test_cases[0].expected_errors, vec!["#purpose".to_string()]);
            assert_eq!(
                test_cases[1].data.get("modes"),
                Some(&FieldValue::Multiple(vec!["walk".into(), "bus".into()]))
            );
        }
        other => panic!("Expected form action, got {:?}", other),
    }
    assert!(matches!(&spec.actions[2], ActionSpec::Navigate { url } if url == "/travel-diary/dashboard"));
}

#[test]
fn form_action_converts_to_wizard_action() {
    let spec: WizardSpec = serde_yaml::from_str(JOURNEY_YAML).unwrap();

    let action = spec.actions[0].to_wizard_action().unwrap().unwrap();
    assert_eq!(action.submit_button_id(), Some("continue"));
    assert_eq!(
        action.expected_path(),
        &PathMatcher::Literal("/travel-diary/day-{day}/journey/add".into())
    );

    let read_only = spec.actions[3].to_wizard_action().unwrap().unwrap();
    assert_eq!(read_only.submit_button_id(), None);

    assert!(spec.actions[1].to_wizard_action().unwrap().is_none());
}

#[test]
fn test_case_options_are_flattened() {
    let yaml = r##"
data: { name: Alice }
submit_button: save-draft
skip_page_url_change_check: true
"##;
    let case: nts_harness::form::model::FormTestCase = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(case.options.submit_button.as_deref(), Some("save-draft"));
    assert!(case.options.skip_page_url_change_check);
    assert!(case.expected_errors.is_empty());
}

#[test]
fn path_and_pattern_are_exclusive() {
    let both = r##"
kind: form
path: /a
path_pattern: ^/a$
"##;
    let action: ActionSpec = serde_yaml::from_str(both).unwrap();
    assert!(action.to_wizard_action().is_err());

    let neither: ActionSpec = serde_yaml::from_str("kind: form\nsubmit_button: go\n").unwrap();
    assert!(neither.to_wizard_action().is_err());
}

#[test]
fn unknown_action_kind_is_rejected() {
    let result: Result<ActionSpec, _> = serde_yaml::from_str("kind: click\nselector: '#go'\n");
    assert!(result.is_err());
}

// =========================================================================
// Runner
// =========================================================================

#[test]
fn runs_a_full_journey() {
    let spec: WizardSpec = serde_yaml::from_str(JOURNEY_YAML).unwrap();
    let mut browser = journey_page();
    let mut output: Vec<String> = Vec::new();
    let mut shots = RecordingScreenshots::default();

    let mut ctx = RunContext::new(&mut browser, &mut output, &mut shots);
    let result = WizardRunner::run(&spec, &mut ctx, Some(HOST));

    assert!(result.passed, "journey failed: {:?}", result.error);
    assert_eq!(result.actions_run, 4);
    assert_eq!(result.failed_action, None);

    assert_eq!(browser.calls[0], format!("navigate {}/travel-diary/day-2/journey/add", HOST));
    assert!(browser
        .calls
        .contains(&format!("navigate {}/travel-diary/dashboard", HOST)));
    assert_eq!(browser.submitted.len(), 2);
    assert!(shots.taken.is_empty());
}

#[test]
fn failing_action_stops_the_run_with_a_screenshot() {
    let yaml = r##"
name: Broken journey
dataset: broken/run
start_url: /wizard/step-1
actions:
  - kind: path
    path: /wizard/step-1
  - kind: path
    path: /wizard/step-9
  - kind: navigate
    url: /never
"##;
    let spec: WizardSpec = serde_yaml::from_str(yaml).unwrap();
    let mut browser = FakeBrowser::new("/");
    let mut output: Vec<String> = Vec::new();
    let mut shots = RecordingScreenshots::default();

    let mut ctx = RunContext::new(&mut browser, &mut output, &mut shots);
    let result = WizardRunner::run(&spec, &mut ctx, Some(HOST));

    assert!(!result.passed);
    assert_eq!(result.actions_run, 2);
    assert_eq!(result.failed_action, Some(1));
    assert_eq!(result.failure_location.as_deref(), Some("Action[1]"));
    let error = result.error.unwrap();
    assert!(error.starts_with("Action 2 failed: Action[1]: Unexpected page path"), "{}", error);

    // dataset names are sanitized into a single directory component
    assert_eq!(shots.taken, vec![("2-failure".to_string(), "brokenrun".to_string())]);
    assert!(!browser.calls.iter().any(|c| c.ends_with("/never")));
}

#[test]
fn failure_without_assertion_location_falls_back_to_the_action() {
    let yaml = r##"
name: Missing button
start_url: /wizard/step-1
actions:
  - kind: form
    path: /wizard/step-1
    submit_button: no-such-button
    test_cases:
      - data:
          name: Alice
"##;
    let spec: WizardSpec = serde_yaml::from_str(yaml).unwrap();
    let mut browser = FakeBrowser::new("/").with_field("name", "");
    let mut output: Vec<String> = Vec::new();
    let mut shots = RecordingScreenshots::default();

    let mut ctx = RunContext::new(&mut browser, &mut output, &mut shots);
    let result = WizardRunner::run(&spec, &mut ctx, Some(HOST));

    assert_eq!(result.failed_action, Some(0));
    assert_eq!(result.failure_location.as_deref(), Some("Action[0]"));
    assert_eq!(
        result.error.as_deref(),
        Some("Action 1 failed: Unable to fetch button with ID #no-such-button")
    );
}

#[test]
fn failure_screenshot_problems_do_not_mask_the_failure() {
    let yaml = r##"
name: Broken journey
start_url: /wizard/step-1
actions:
  - kind: path
    path: /elsewhere
"##;
    let spec: WizardSpec = serde_yaml::from_str(yaml).unwrap();
    let mut browser = FakeBrowser::new("/");
    let mut output: Vec<String> = Vec::new();
    let mut shots = RecordingScreenshots {
        fail: true,
        ..Default::default()
    };

    let mut ctx = RunContext::new(&mut browser, &mut output, &mut shots);
    let result = WizardRunner::run(&spec, &mut ctx, Some(HOST));

    assert_eq!(result.failed_action, Some(0));
    assert!(output.iter().any(|l| l.starts_with("Failed to take screenshot 1-failure")));
}

#[test]
fn runner_resets_action_index_between_specs() {
    let yaml = r##"
name: One step
start_url: /wizard/step-1
actions:
  - kind: path
    path: /wizard/step-1
"##;
    let spec: WizardSpec = serde_yaml::from_str(yaml).unwrap();
    let mut browser = FakeBrowser::new("/");
    let mut output: Vec<String> = Vec::new();
    let mut shots = RecordingScreenshots::default();

    let mut ctx = RunContext::new(&mut browser, &mut output, &mut shots).with_verbosity(1);
    ctx.action_index = 7;
    let result = WizardRunner::run(&spec, &mut ctx, Some(HOST));

    assert!(result.passed);
    assert_eq!(
        output,
        vec!["Action #1", "  a. Expected path     : /wizard/step-1 (literal)"]
    );
}

#[test]
fn absolute_start_url_ignores_base() {
    assert_eq!(
        resolve_url(Some(HOST), "https://other.test/login"),
        "https://other.test/login"
    );
}
