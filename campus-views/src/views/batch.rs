//! Batches: list, create/edit form and the detail view with teacher and
//! student assignment

use super::{
    delete_resource, fetch, load_failed, notify_success, write_failed, FormMode, Resource,
};
use crate::error::{ViewError, ViewResult};
use crate::forms::{schemas, FormErrors};
use crate::navigation::Navigation;
use campus_api::{endpoints, ApiClient, ApiRequest, Notice};
use campus_core::{Batch, Course, EntityId, TeacherSummary};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

impl Resource for Batch {
    const LABEL: &'static str = "batch";
    const COLLECTION: &'static str = endpoints::BATCHES;
    const LIST: Navigation = Navigation::BatchList;
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this batch?";
    const DELETED: &'static str = "Batch deleted successfully.";
    const DELETE_FAILED: &'static str = "Failed to delete batch.";

    fn detail_path(id: EntityId) -> String {
        endpoints::batch(id)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

const BATCH_ERROR_FIELDS: &[&str] = &["batch_name", "batch_code"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchForm {
    pub batch_name: String,
    pub batch_code: String,
    pub fk_course: Option<EntityId>,
    pub start_date: String,
    pub end_date: String,
}

impl From<&Batch> for BatchForm {
    fn from(batch: &Batch) -> Self {
        Self {
            batch_name: batch.batch_name.clone(),
            batch_code: batch.batch_code.clone(),
            fk_course: batch.fk_course,
            start_date: batch.start_date.clone(),
            end_date: batch.end_date.clone(),
        }
    }
}

pub struct BatchEditor {
    api: ApiClient,
    mode: FormMode,
    pub form: BatchForm,
    pub courses: Vec<Course>,
}

impl BatchEditor {
    pub fn create(api: ApiClient) -> Self {
        Self::new(api, FormMode::Create)
    }

    pub fn edit(api: ApiClient, id: EntityId) -> Self {
        Self::new(api, FormMode::Edit(id))
    }

    fn new(api: ApiClient, mode: FormMode) -> Self {
        Self {
            api,
            mode,
            form: BatchForm::default(),
            courses: Vec::new(),
        }
    }

    pub async fn mount(&mut self) -> ViewResult<()> {
        if let FormMode::Edit(id) = self.mode {
            let batch: Batch = fetch(&self.api, &endpoints::batch(id))
                .await
                .map_err(|e| load_failed("batch_edit", e))?;
            self.form = BatchForm::from(&batch);
        }

        self.courses = fetch(&self.api, endpoints::COURSES)
            .await
            .map_err(|e| load_failed("batch_form", e))?;
        Ok(())
    }

    pub async fn submit(&mut self) -> ViewResult<Navigation> {
        schemas::batch()
            .validate(&self.form)
            .map_err(ViewError::Invalid)?;

        match self.mode {
            FormMode::Create => {
                if let Err(error) = self.api.post_json(endpoints::BATCHES, &self.form).await {
                    return Err(write_failed(
                        &self.api,
                        error,
                        BATCH_ERROR_FIELDS,
                        "Batch creation failed. Please try again.",
                    ));
                }
                notify_success(&self.api, "Batch created successfully!");
                Ok(Navigation::BatchList)
            }
            FormMode::Edit(id) => {
                if let Err(error) = self.api.put_json(&endpoints::batch(id), &self.form).await {
                    return Err(write_failed(
                        &self.api,
                        error,
                        BATCH_ERROR_FIELDS,
                        "Update failed. Please try again.",
                    ));
                }
                notify_success(&self.api, "Batch updated successfully!");
                Ok(Navigation::BatchDetail(id))
            }
        }
    }
}

/// Batch with its roster and the teachers that may still be assigned
pub struct BatchDetailView {
    api: ApiClient,
    id: EntityId,
    pub batch: Batch,
    pub eligible_teachers: Vec<TeacherSummary>,
    pub selected_teacher: Option<EntityId>,
}

impl BatchDetailView {
    pub fn new(api: ApiClient, id: EntityId) -> Self {
        Self {
            api,
            id,
            batch: Batch::default(),
            eligible_teachers: Vec::new(),
            selected_teacher: None,
        }
    }

    /// Fetch the batch and its eligible teachers concurrently; each read that
    /// fails leaves its part of the view at its default
    pub async fn mount(&mut self) -> ViewResult<()> {
        let batch_path = endpoints::batch(self.id);
        let teachers_path = endpoints::filtered_teachers_to_batch(self.id);
        let (batch, teachers) = tokio::join!(
            fetch::<Batch>(&self.api, &batch_path),
            fetch::<Vec<TeacherSummary>>(&self.api, &teachers_path),
        );

        let mut failure = None;
        match batch {
            Ok(batch) => self.batch = batch,
            Err(error) => failure = Some(load_failed("batch_detail", error)),
        }
        match teachers {
            Ok(teachers) => self.eligible_teachers = teachers,
            Err(error) => {
                let error = load_failed("batch_teachers", error);
                failure = failure.or(Some(error));
            }
        }

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn refresh_batch(&mut self) -> ViewResult<()> {
        self.batch = fetch(&self.api, &endpoints::batch(self.id))
            .await
            .map_err(|e| load_failed("batch_detail", e))?;
        Ok(())
    }

    pub fn select_teacher(&mut self, teacher_id: Option<EntityId>) {
        self.selected_teacher = teacher_id;
    }

    pub async fn assign_teacher(&mut self) -> ViewResult<()> {
        let Some(teacher_id) = self.selected_teacher else {
            self.api
                .notifier()
                .notify(Notice::error("Please select a teacher"));
            return Err(ViewError::Invalid(FormErrors::single(
                "teacher_id",
                "Please select a teacher",
            )));
        };

        let request = ApiRequest::post(endpoints::add_teacher_to_batch(self.id))
            .json(&json!({ "teacher_id": teacher_id }))?;
        let response = match self.api.send(request).await {
            Ok(response) => response,
            Err(error) => {
                return Err(write_failed(
                    &self.api,
                    error,
                    &[],
                    "Failed to assign teacher.",
                ))
            }
        };

        let message = response
            .message()
            .unwrap_or("Teacher assigned successfully!")
            .to_string();
        notify_success(&self.api, &message);
        info!(batch_id = self.id, teacher_id = teacher_id, "Teacher assigned");

        self.selected_teacher = None;
        self.refresh_batch().await
    }

    pub async fn remove_teacher(&mut self, teacher_id: EntityId) -> ViewResult<()> {
        let path = endpoints::remove_teacher_in_batch(self.id, teacher_id);
        if let Err(error) = self.api.send(ApiRequest::post(path)).await {
            return Err(write_failed(&self.api, error, &[], "Failed to remove teacher"));
        }
        notify_success(&self.api, "Teacher removed from batch");
        self.refresh_batch().await
    }

    pub async fn remove_student(&mut self, student_id: EntityId) -> ViewResult<()> {
        let path = endpoints::remove_student_in_batch(student_id);
        if let Err(error) = self.api.send(ApiRequest::post(path)).await {
            return Err(write_failed(&self.api, error, &[], "Failed to remove student"));
        }
        notify_success(&self.api, "Student removed from batch");
        self.refresh_batch().await
    }

    pub async fn delete(&mut self) -> ViewResult<Navigation> {
        delete_resource::<Batch>(&self.api, self.id).await?;
        Ok(Navigation::BatchList)
    }
}
