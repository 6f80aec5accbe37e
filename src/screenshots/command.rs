use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::browser::Browser;
use crate::screenshots::error::ScreenshotsError;
use crate::screenshots::{FixtureManager, FlowEnv, ScreenshotFlows, UserStore};
use crate::wizard::sink::OutputSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Success,
    Failure,
}

impl CommandStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            CommandStatus::Success => 0,
            CommandStatus::Failure => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScreenshotsSettings {
    /// Parent of the timestamped run directories
    pub screenshots_path: PathBuf,
    pub frontend_hostname: String,
    /// Password given to the onboarded diary user
    pub diary_password: String,
}

/// Generates the product screenshots: seeds fixtures, then walks the
/// interviewer, onboarding and diary journeys in one browser.
pub struct ScreenshotsCommand<'a> {
    fixtures: &'a mut dyn FixtureManager,
    users: &'a mut dyn UserStore,
    settings: ScreenshotsSettings,
}

impl<'a> ScreenshotsCommand<'a> {
    pub fn new(
        fixtures: &'a mut dyn FixtureManager,
        users: &'a mut dyn UserStore,
        settings: ScreenshotsSettings,
    ) -> Self {
        ScreenshotsCommand {
            fixtures,
            users,
            settings,
        }
    }

    /// `<screenshots_path>/screenshots-<YYYYmmdd-HHMMSS>`
    pub fn output_dir(&self, started: NaiveDateTime) -> PathBuf {
        self.settings
            .screenshots_path
            .join(format!("screenshots-{}", started.format("%Y%m%d-%H%M%S")))
    }

    pub fn execute(
        &mut self,
        browser: &mut dyn Browser,
        flows: &mut dyn ScreenshotFlows,
        output: &mut dyn OutputSink,
    ) -> CommandStatus {
        self.execute_at(browser, flows, output, chrono::Local::now().naive_local())
    }

    /// Run with a fixed start time, which names the output directory.
    pub fn execute_at(
        &mut self,
        browser: &mut dyn Browser,
        flows: &mut dyn ScreenshotFlows,
        output: &mut dyn OutputSink,
        started: NaiveDateTime,
    ) -> CommandStatus {
        let env = FlowEnv {
            output_dir: self.output_dir(started),
            hostname: format!("https://{}", self.settings.frontend_hostname),
        };
        info!(output_dir = %env.output_dir.display(), "generating screenshots");

        match self.run_flows(browser, flows, &env) {
            Ok(()) => CommandStatus::Success,
            Err(e) => {
                error!(error = %e, "screenshots run failed");
                output.writeln(&format!("[ERROR] {}", e.message()));

                if e.page().is_some() {
                    let path = env.output_dir.join("error.png");
                    let saved = fs::create_dir_all(&env.output_dir)
                        .map_err(|io| io.to_string())
                        .and_then(|_| browser.screenshot(&path).map_err(|s| s.to_string()));
                    if let Err(cause) = saved {
                        output.writeln("[ERROR] Failed to write error screenshot");
                        output.writeln(&format!("[ERROR] {}", cause));
                    }
                }

                CommandStatus::Failure
            }
        }
    }

    fn run_flows(
        &mut self,
        browser: &mut dyn Browser,
        flows: &mut dyn ScreenshotFlows,
        env: &FlowEnv,
    ) -> Result<(), ScreenshotsError> {
        self.fixtures.delete_existing_interviewer()?;
        self.fixtures.create_interviewer()?;

        let (passcode1, passcode2) = flows.retrieve_onboarding_codes(browser, env)?;

        let user_identifier = flows.onboarding_flow(browser, env, &passcode1, &passcode2)?;
        let password = self.settings.diary_password.clone();
        self.set_user_password(&user_identifier, &password)?;

        flows.diary_flow(browser, env, &user_identifier, &password)?;
        flows.login_and_onboarding_codes_flow(browser, env)?;
        Ok(())
    }

    pub fn set_user_password(&mut self, user_identifier: &str, password: &str) -> Result<(), ScreenshotsError> {
        let user = self
            .users
            .find_user(user_identifier)?
            .ok_or_else(|| ScreenshotsError::new("Unable to retrieve diary user"))?;
        self.users.set_plain_password(&user, password)
    }
}
