//! Teacher list with filters, registration and edit forms
//!
//! Registration nests the user account under `fk_user.*`; the edit form
//! sends the same account fields as flat keys. Both repeat `subjects` once
//! per selected subject and attach `image` only when a file was chosen.

use super::{fetch, load_failed, notify_success, write_failed, ListView, Resource};
use crate::error::{ViewError, ViewResult};
use crate::forms::schemas;
use crate::navigation::Navigation;
use campus_api::{endpoints, ApiClient, ApiRequest, MultipartPayload};
use campus_core::{EntityId, Subject, Teacher};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

impl Resource for Teacher {
    const LABEL: &'static str = "teacher";
    const COLLECTION: &'static str = endpoints::TEACHERS;
    const LIST: Navigation = Navigation::TeacherList;
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this teacher?";
    const DELETED: &'static str = "Teacher deleted";
    const DELETE_FAILED: &'static str = "Failed to delete teacher.";

    fn detail_path(id: EntityId) -> String {
        endpoints::teacher(id)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherFilters {
    pub subject: Option<EntityId>,
    pub gender: Option<String>,
    pub search: Option<String>,
}

/// Teacher list plus the subjects offered as a filter
pub struct TeacherListView {
    api: ApiClient,
    pub filters: TeacherFilters,
    pub teachers: ListView<Teacher>,
    pub subjects: Vec<Subject>,
}

impl TeacherListView {
    pub fn new(api: ApiClient, filters: TeacherFilters) -> Self {
        let teachers = ListView::new(api.clone())
            .filter(
                "subject",
                filters.subject.map(|id| id.to_string()).unwrap_or_default(),
            )
            .filter("gender", filters.gender.clone().unwrap_or_default())
            .filter("search", filters.search.clone().unwrap_or_default());

        Self {
            api,
            filters,
            teachers,
            subjects: Vec::new(),
        }
    }

    pub async fn mount(&mut self) -> ViewResult<()> {
        let (subjects, teachers) = tokio::join!(
            fetch::<Vec<Subject>>(&self.api, endpoints::SUBJECTS),
            self.teachers.mount(),
        );

        match subjects {
            Ok(subjects) => self.subjects = subjects,
            Err(error) => return Err(load_failed("teacher_subjects", error)),
        }
        teachers
    }

    pub async fn delete(&mut self, id: EntityId) -> ViewResult<()> {
        self.teachers.delete(id).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeacherRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: String,
    pub qualifications: String,
    pub years_of_experience: String,
    pub gender: String,
    pub date_of_birth: String,
    pub address: String,
    pub subjects: Vec<EntityId>,
    #[serde(skip)]
    pub image: Option<PathBuf>,
}

impl TeacherRegistration {
    pub async fn to_payload(&self) -> ViewResult<MultipartPayload> {
        let payload = MultipartPayload::new()
            .nested("fk_user", "username", &self.username)
            .nested("fk_user", "email", &self.email)
            .nested("fk_user", "password", &self.password)
            .text("full_name", &self.full_name)
            .text("phone_number", &self.phone_number)
            .text("qualifications", &self.qualifications)
            .text("years_of_experience", &self.years_of_experience)
            .text("gender", &self.gender)
            .text("date_of_birth", &self.date_of_birth)
            .text("address", &self.address);
        let payload = attach_image(payload, self.image.as_ref()).await?;
        Ok(payload.repeated("subjects", self.subjects.iter()))
    }
}

async fn attach_image(
    payload: MultipartPayload,
    image: Option<&PathBuf>,
) -> ViewResult<MultipartPayload> {
    match image {
        Some(path) => Ok(payload.file_from_path("image", path).await?),
        None => Ok(payload),
    }
}

pub struct TeacherRegisterView {
    api: ApiClient,
    pub form: TeacherRegistration,
    pub subjects: Vec<Subject>,
}

impl TeacherRegisterView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            form: TeacherRegistration::default(),
            subjects: Vec::new(),
        }
    }

    pub async fn mount(&mut self) -> ViewResult<()> {
        self.subjects = fetch(&self.api, endpoints::SUBJECTS)
            .await
            .map_err(|e| load_failed("teacher_register", e))?;
        Ok(())
    }

    pub async fn submit(&mut self) -> ViewResult<Navigation> {
        schemas::teacher_register()
            .validate(&self.form)
            .map_err(ViewError::Invalid)?;

        let payload = self.form.to_payload().await?;
        let request = ApiRequest::post(endpoints::TEACHER_REGISTER).multipart(payload);
        if let Err(error) = self.api.send(request).await {
            return Err(write_failed(
                &self.api,
                error,
                &["fk_user.username", "subjects"],
                "Registration failed. Check console for details.",
            ));
        }

        notify_success(&self.api, "Teacher registered successfully!");
        Ok(Navigation::TeacherList)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeacherUpdate {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub qualifications: String,
    pub years_of_experience: String,
    pub gender: String,
    pub date_of_birth: String,
    pub address: String,
    pub subjects: Vec<EntityId>,
    #[serde(skip)]
    pub image: Option<PathBuf>,
}

impl From<&Teacher> for TeacherUpdate {
    fn from(teacher: &Teacher) -> Self {
        Self {
            username: teacher.username.clone(),
            email: teacher.email.clone(),
            full_name: teacher.full_name.clone(),
            phone_number: teacher.phone_number.clone(),
            qualifications: teacher.qualifications.clone(),
            years_of_experience: teacher.years_of_experience.clone(),
            gender: teacher.gender.clone(),
            date_of_birth: teacher.date_of_birth.clone(),
            address: teacher.address.clone(),
            subjects: teacher.subjects.clone(),
            image: None,
        }
    }
}

impl TeacherUpdate {
    pub async fn to_payload(&self) -> ViewResult<MultipartPayload> {
        let payload = MultipartPayload::new()
            .text("username", &self.username)
            .text("email", &self.email)
            .text("full_name", &self.full_name)
            .text("phone_number", &self.phone_number)
            .text("qualifications", &self.qualifications)
            .text("years_of_experience", &self.years_of_experience)
            .text("gender", &self.gender)
            .text("date_of_birth", &self.date_of_birth)
            .text("address", &self.address);
        let payload = attach_image(payload, self.image.as_ref()).await?;
        Ok(payload.repeated("subjects", self.subjects.iter()))
    }
}

pub struct TeacherEditView {
    api: ApiClient,
    id: EntityId,
    pub form: TeacherUpdate,
    pub subjects: Vec<Subject>,
    pub loaded: bool,
}

impl TeacherEditView {
    pub fn new(api: ApiClient, id: EntityId) -> Self {
        Self {
            api,
            id,
            form: TeacherUpdate::default(),
            subjects: Vec::new(),
            loaded: false,
        }
    }

    /// Teacher and subjects are fetched together; the form is populated only
    /// when both succeed
    pub async fn mount(&mut self) -> ViewResult<()> {
        let teacher_path = endpoints::teacher(self.id);
        let (teacher, subjects) = tokio::try_join!(
            fetch::<Teacher>(&self.api, &teacher_path),
            fetch::<Vec<Subject>>(&self.api, endpoints::SUBJECTS),
        )
        .map_err(|e| load_failed("teacher_edit", e))?;

        self.form = TeacherUpdate::from(&teacher);
        self.subjects = subjects;
        self.loaded = true;
        Ok(())
    }

    pub async fn submit(&mut self) -> ViewResult<Navigation> {
        schemas::teacher_edit()
            .validate(&self.form)
            .map_err(ViewError::Invalid)?;

        let payload = self.form.to_payload().await?;
        let request = ApiRequest::put(endpoints::teacher(self.id)).multipart(payload);
        if let Err(error) = self.api.send(request).await {
            return Err(write_failed(&self.api, error, &[], "Something went wrong"));
        }

        notify_success(&self.api, "Teacher updated successfully!");
        Ok(Navigation::TeacherDetail(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registration_payload_nests_account_fields() {
        let form = TeacherRegistration {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret".to_string(),
            full_name: "Ada Lovelace".to_string(),
            subjects: vec![3, 5],
            ..TeacherRegistration::default()
        };

        let payload = form.to_payload().await.unwrap();
        assert_eq!(payload.values("fk_user.username"), vec!["ada"]);
        assert_eq!(payload.values("fk_user.password"), vec!["secret"]);
        assert_eq!(payload.values("subjects"), vec!["3", "5"]);
        assert!(payload.values("username").is_empty());
        assert!(!payload.has_file("image"));
    }

    #[tokio::test]
    async fn test_update_payload_uses_flat_keys() {
        let teacher = Teacher {
            id: 4,
            username: "grace".to_string(),
            email: "grace@example.com".to_string(),
            subjects: vec![1],
            ..Teacher::default()
        };

        let payload = TeacherUpdate::from(&teacher).to_payload().await.unwrap();
        assert_eq!(payload.values("username"), vec!["grace"]);
        assert!(payload.values("fk_user.username").is_empty());
        assert!(payload.values("password").is_empty());
        assert_eq!(payload.values("subjects"), vec!["1"]);
    }
}
