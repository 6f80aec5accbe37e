use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::browser::Browser;

pub mod command;
pub mod error;
pub mod fixtures;
pub mod plan;

use error::ScreenshotsError;

/// Where a screenshots run writes, and which site it visits.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEnv {
    /// Timestamped directory of this run
    pub output_dir: PathBuf,
    /// `https://<frontend hostname>`
    pub hostname: String,
}

impl FlowEnv {
    pub fn persona_dir(&self, persona: &str) -> PathBuf {
        self.output_dir.join(persona)
    }
}

/// Seeds the accounts the screenshot journeys log in with.
pub trait FixtureManager {
    fn delete_existing_interviewer(&mut self) -> Result<(), ScreenshotsError>;
    fn create_interviewer(&mut self) -> Result<(), ScreenshotsError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
}

/// Account lookups and password changes; hashing is the store's concern.
pub trait UserStore {
    fn find_user(&mut self, username: &str) -> Result<Option<UserRecord>, ScreenshotsError>;
    fn set_plain_password(&mut self, user: &UserRecord, password: &str) -> Result<(), ScreenshotsError>;
}

/// The product journeys that produce screenshots.
pub trait ScreenshotFlows {
    /// Log in as the interviewer and read two onboarding passcodes.
    fn retrieve_onboarding_codes(
        &mut self,
        browser: &mut dyn Browser,
        env: &FlowEnv,
    ) -> Result<(String, String), ScreenshotsError>;

    /// Onboard a diary keeper with the passcodes; returns the new user identifier.
    fn onboarding_flow(
        &mut self,
        browser: &mut dyn Browser,
        env: &FlowEnv,
        passcode1: &str,
        passcode2: &str,
    ) -> Result<String, ScreenshotsError>;

    fn diary_flow(
        &mut self,
        browser: &mut dyn Browser,
        env: &FlowEnv,
        user_identifier: &str,
        password: &str,
    ) -> Result<(), ScreenshotsError>;

    fn login_and_onboarding_codes_flow(
        &mut self,
        browser: &mut dyn Browser,
        env: &FlowEnv,
    ) -> Result<(), ScreenshotsError>;
}
