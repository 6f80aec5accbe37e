use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::{submit_control_xpath, Browser, FormSubmission, Method};
use crate::error::HarnessError;
use crate::form::model::{substitute, FieldValue, FormData};
use crate::form::multiselect;
use crate::screenshots::error::ScreenshotsError;
use crate::screenshots::{FlowEnv, ScreenshotFlows};

/// Scripted journeys for the screenshots command, loaded from YAML.
///
/// Steps share one variable map. `retrieve_onboarding_codes` must capture
/// `passcode1` and `passcode2`, and `onboarding` must capture
/// `user_identifier`; `diary` sees `user_identifier` and `password`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenshotPlan {
    #[serde(default)]
    pub retrieve_onboarding_codes: Vec<PlanStep>,
    #[serde(default)]
    pub onboarding: Vec<PlanStep>,
    #[serde(default)]
    pub diary: Vec<PlanStep>,
    #[serde(default)]
    pub interviewer_login: Vec<PlanStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanStep {
    /// Load a path on the frontend host
    Navigate { path: String },

    /// Fill the button's form with `data` and submit it. Multi-selects named
    /// in `data` are cleared first so only the listed options stay selected.
    Submit {
        button: String,
        #[serde(default)]
        data: FormData,
    },

    /// Store an element's text (or an attribute of it) in a variable
    Capture {
        xpath: String,
        variable: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribute: Option<String>,
    },

    /// Save `<persona dir>/<name>.png`
    Screenshot { name: String },
}

impl ScreenshotPlan {
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }
}

/// Runs a [`ScreenshotPlan`] against the browser.
pub struct PlanScreenshotter {
    plan: ScreenshotPlan,
    variables: HashMap<String, String>,
}

impl PlanScreenshotter {
    pub fn new(plan: ScreenshotPlan) -> Self {
        PlanScreenshotter {
            plan,
            variables: HashMap::new(),
        }
    }

    pub fn variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    fn run_steps(
        &mut self,
        steps: &[PlanStep],
        browser: &mut dyn Browser,
        env: &FlowEnv,
        persona: &str,
    ) -> Result<(), ScreenshotsError> {
        for step in steps {
            debug!(persona, ?step, "screenshot plan step");
            if let Err(e) = self.run_step(step, browser, env, persona) {
                // The page in view is worth a diagnostic screenshot
                let page = browser.current_url().unwrap_or_default();
                return Err(ScreenshotsError::on_page(e.to_string(), page));
            }
        }
        Ok(())
    }

    fn run_step(
        &mut self,
        step: &PlanStep,
        browser: &mut dyn Browser,
        env: &FlowEnv,
        persona: &str,
    ) -> Result<(), HarnessError> {
        match step {
            PlanStep::Navigate { path } => {
                let url = format!("{}{}", env.hostname, substitute(path, &self.variables));
                browser.navigate(&url)
            }

            PlanStep::Submit { button, data } => {
                let button_id = substitute(button, &self.variables);
                let element = browser
                    .find_element(&submit_control_xpath(&button_id))
                    .map_err(|e| match e {
                        HarnessError::ElementNotFound { .. } => HarnessError::ControlNotFound {
                            control_id: button_id.clone(),
                        },
                        other => other,
                    })?;
                let fields = multiselect::patch(&element, self.resolve_data(data), browser)?;
                let submission = FormSubmission::new(&element, &button_id, fields, Method::Post);
                browser.fill_form(&submission)?;
                browser.submit_form(&submission)
            }

            PlanStep::Capture {
                xpath,
                variable,
                attribute,
            } => {
                let element = browser.find_element(xpath)?;
                let value = match attribute {
                    Some(name) => element.attribute(name).unwrap_or_default().to_string(),
                    None => element.text().trim().to_string(),
                };
                self.variables.insert(variable.clone(), value);
                Ok(())
            }

            PlanStep::Screenshot { name } => {
                let dir = env.persona_dir(persona);
                fs::create_dir_all(&dir)?;
                browser.screenshot(&dir.join(format!("{}.png", name)))
            }
        }
    }

    fn resolve_data(&self, data: &FormData) -> FormData {
        let mut resolved = FormData::new();
        for (name, value) in data.iter() {
            let value = match value {
                FieldValue::Single(v) => FieldValue::Single(substitute(v, &self.variables)),
                FieldValue::Multiple(vs) => {
                    FieldValue::Multiple(vs.iter().map(|v| substitute(v, &self.variables)).collect())
                }
            };
            resolved.insert(name, value);
        }
        resolved
    }

    fn require(&self, variable: &str, flow: &str) -> Result<String, ScreenshotsError> {
        self.variables.get(variable).cloned().ok_or_else(|| {
            ScreenshotsError::new(format!("{} flow did not capture '{}'", flow, variable))
        })
    }
}

impl ScreenshotFlows for PlanScreenshotter {
    fn retrieve_onboarding_codes(
        &mut self,
        browser: &mut dyn Browser,
        env: &FlowEnv,
    ) -> Result<(String, String), ScreenshotsError> {
        let steps = self.plan.retrieve_onboarding_codes.clone();
        self.run_steps(&steps, browser, env, "interviewer")?;
        Ok((
            self.require("passcode1", "interviewer")?,
            self.require("passcode2", "interviewer")?,
        ))
    }

    fn onboarding_flow(
        &mut self,
        browser: &mut dyn Browser,
        env: &FlowEnv,
        passcode1: &str,
        passcode2: &str,
    ) -> Result<String, ScreenshotsError> {
        self.variables.insert("passcode1".into(), passcode1.into());
        self.variables.insert("passcode2".into(), passcode2.into());
        let steps = self.plan.onboarding.clone();
        self.run_steps(&steps, browser, env, "onboarding")?;
        self.require("user_identifier", "onboarding")
    }

    fn diary_flow(
        &mut self,
        browser: &mut dyn Browser,
        env: &FlowEnv,
        user_identifier: &str,
        password: &str,
    ) -> Result<(), ScreenshotsError> {
        self.variables.insert("user_identifier".into(), user_identifier.into());
        self.variables.insert("password".into(), password.into());
        let steps = self.plan.diary.clone();
        self.run_steps(&steps, browser, env, "diary-keeper")
    }

    fn login_and_onboarding_codes_flow(
        &mut self,
        browser: &mut dyn Browser,
        env: &FlowEnv,
    ) -> Result<(), ScreenshotsError> {
        let steps = self.plan.interviewer_login.clone();
        self.run_steps(&steps, browser, env, "interviewer")
    }
}
