use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::screenshots::error::ScreenshotsError;
use crate::screenshots::{FixtureManager, UserRecord, UserStore};

/// HTTP client for the application's fixture admin API.
///
/// - `DELETE /fixtures/interviewer`, `POST /fixtures/interviewer`
/// - `GET /users/{username}` (404 when absent)
/// - `PUT /users/{id}/password` with `{"plain_password": ...}`
pub struct FixtureApi {
    client: Client,
    base_url: String,
}

impl FixtureApi {
    pub fn new(base_url: &str) -> Self {
        FixtureApi {
            client: Client::new(),
            base_url: base_url.to_string(),
        }
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ScreenshotsError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ScreenshotsError::new(format!("Invalid fixture API URL '{}': {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ScreenshotsError::new(format!("Fixture API URL '{}' cannot have a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl FixtureManager for FixtureApi {
    fn delete_existing_interviewer(&mut self) -> Result<(), ScreenshotsError> {
        let response = self.client.delete(self.endpoint(&["fixtures", "interviewer"])?).send()?;
        // Nothing to delete is fine
        if response.status() != StatusCode::NOT_FOUND {
            response.error_for_status()?;
        }
        Ok(())
    }

    fn create_interviewer(&mut self) -> Result<(), ScreenshotsError> {
        self.client
            .post(self.endpoint(&["fixtures", "interviewer"])?)
            .send()?
            .error_for_status()?;
        debug!("interviewer fixture created");
        Ok(())
    }
}

impl UserStore for FixtureApi {
    fn find_user(&mut self, username: &str) -> Result<Option<UserRecord>, ScreenshotsError> {
        let response = self.client.get(self.endpoint(&["users", username])?).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(response.error_for_status()?.json()?))
    }

    fn set_plain_password(&mut self, user: &UserRecord, password: &str) -> Result<(), ScreenshotsError> {
        self.client
            .put(self.endpoint(&["users", user.id.as_str(), "password"])?)
            .json(&json!({ "plain_password": password }))
            .send()?
            .error_for_status()?;
        Ok(())
    }
}
