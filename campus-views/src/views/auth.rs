//! Login and first-run admin registration

use super::{fetch, notify_success, write_failed};
use crate::error::{ViewError, ViewResult};
use crate::forms::schemas;
use crate::navigation::Navigation;
use campus_api::{endpoints, ApiClient, Notice};
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub struct LoginView {
    api: ApiClient,
    pub form: LoginForm,
}

impl LoginView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            form: LoginForm::default(),
        }
    }

    /// Authenticate and return the landing view for the new role
    pub async fn submit(&mut self) -> ViewResult<Navigation> {
        schemas::login()
            .validate(&self.form)
            .map_err(ViewError::Invalid)?;

        if let Err(error) = self.api.authenticate(endpoints::LOGIN, &self.form).await {
            return Err(write_failed(
                &self.api,
                error,
                &["non_field_errors"],
                "Login failed. Check your credentials.",
            ));
        }

        let session = self.api.session().load().await?;
        info!(username = ?session.username, role = ?session.role, "Logged in");
        notify_success(&self.api, "Login successful");
        Ok(Navigation::home_for(session.role))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct AdminStatus {
    #[serde(default)]
    admin_exists: bool,
}

pub struct AdminRegisterView {
    api: ApiClient,
    pub form: AdminForm,
}

impl AdminRegisterView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            form: AdminForm::default(),
        }
    }

    /// Returns `Some(Login)` when an admin already exists
    pub async fn mount(&mut self) -> ViewResult<Option<Navigation>> {
        match fetch::<AdminStatus>(&self.api, endpoints::ADMIN_EXISTS).await {
            Ok(status) if status.admin_exists => Ok(Some(Navigation::Login)),
            Ok(_) => Ok(None),
            Err(error) => Err(write_failed(
                &self.api,
                error,
                &[],
                "Failed to check admin status",
            )),
        }
    }

    pub async fn submit(&mut self) -> ViewResult<Navigation> {
        schemas::admin_register()
            .validate(&self.form)
            .map_err(ViewError::Invalid)?;

        match self.api.post_json(endpoints::ADMIN_REGISTER, &self.form).await {
            Ok(_) => {
                notify_success(&self.api, "Admin registered successfully");
                Ok(Navigation::Login)
            }
            Err(error) if error.status() == Some(403) => {
                error.log();
                self.api
                    .notifier()
                    .notify(Notice::error("Admin already exists!"));
                Err(ViewError::Api(error))
            }
            Err(error) => Err(write_failed(&self.api, error, &[], "Something went wrong!")),
        }
    }
}
