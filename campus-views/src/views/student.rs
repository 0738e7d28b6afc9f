use super::{fetch, load_failed, notify_success, write_failed, Resource};
use crate::error::{ViewError, ViewResult};
use crate::forms::schemas;
use crate::navigation::Navigation;
use campus_api::{endpoints, ApiClient, ApiRequest, MultipartPayload};
use campus_core::{BatchSummary, EntityId, Student};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

impl Resource for Student {
    const LABEL: &'static str = "student";
    const COLLECTION: &'static str = endpoints::STUDENTS;
    const LIST: Navigation = Navigation::StudentList;
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this student?";
    const DELETED: &'static str = "Student deleted";
    const DELETE_FAILED: &'static str = "Failed to delete student.";

    fn detail_path(id: EntityId) -> String {
        endpoints::student(id)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub roll_no: String,
    pub date_of_birth: String,
    pub phone_number: String,
    pub address: String,
    pub gender: String,
    pub date_of_admission: String,
    pub batch: Option<EntityId>,
    #[serde(skip)]
    pub image: Option<PathBuf>,
}

impl StudentRegistration {
    pub async fn to_payload(&self) -> ViewResult<MultipartPayload> {
        let payload = MultipartPayload::new()
            .nested("fk_user", "username", &self.username)
            .nested("fk_user", "email", &self.email)
            .nested("fk_user", "password", &self.password)
            .text("full_name", &self.full_name)
            .text("roll_no", &self.roll_no)
            .text("date_of_birth", &self.date_of_birth)
            .text("phone_number", &self.phone_number)
            .text("address", &self.address)
            .text("gender", &self.gender)
            .text("date_of_admission", &self.date_of_admission)
            .optional_text("batch", self.batch.map(|id| id.to_string()));

        match &self.image {
            Some(path) => Ok(payload.file_from_path("image", path).await?),
            None => Ok(payload),
        }
    }
}

pub struct StudentRegisterView {
    api: ApiClient,
    pub form: StudentRegistration,
    pub batches: Vec<BatchSummary>,
}

impl StudentRegisterView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            form: StudentRegistration::default(),
            batches: Vec::new(),
        }
    }

    pub async fn mount(&mut self) -> ViewResult<()> {
        self.batches = fetch(&self.api, endpoints::BATCHES)
            .await
            .map_err(|e| load_failed("student_register", e))?;
        Ok(())
    }

    pub async fn submit(&mut self) -> ViewResult<Navigation> {
        schemas::student_register()
            .validate(&self.form)
            .map_err(ViewError::Invalid)?;

        let payload = self.form.to_payload().await?;
        let request = ApiRequest::post(endpoints::STUDENT_REGISTER).multipart(payload);
        if let Err(error) = self.api.send(request).await {
            return Err(write_failed(&self.api, error, &[], "Registration failed"));
        }

        notify_success(&self.api, "Student registered successfully!");
        Ok(Navigation::StudentList)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_is_omitted_when_unset() {
        let form = StudentRegistration {
            username: "kid".to_string(),
            roll_no: "R-7".to_string(),
            ..StudentRegistration::default()
        };
        let payload = form.to_payload().await.unwrap();
        assert!(payload.values("batch").is_empty());
        assert_eq!(payload.values("fk_user.username"), vec!["kid"]);

        let payload = StudentRegistration {
            batch: Some(2),
            ..form
        }
        .to_payload()
        .await
        .unwrap();
        assert_eq!(payload.values("batch"), vec!["2"]);
    }
}
