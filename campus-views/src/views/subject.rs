use super::{fetch, load_failed, notify_success, write_failed, FormMode, Resource};
use crate::error::{ViewError, ViewResult};
use crate::forms::schemas;
use crate::navigation::Navigation;
use campus_api::{endpoints, ApiClient};
use campus_core::{EntityId, Subject};
use serde::{Deserialize, Serialize};

impl Resource for Subject {
    const LABEL: &'static str = "subject";
    const COLLECTION: &'static str = endpoints::SUBJECTS;
    const LIST: Navigation = Navigation::SubjectList;
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this subject?";
    const DELETED: &'static str = "Subject deleted successfully!";
    const DELETE_FAILED: &'static str = "Failed to delete subject.";

    fn detail_path(id: EntityId) -> String {
        endpoints::subject(id)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectForm {
    pub name: String,
}

pub struct SubjectEditor {
    api: ApiClient,
    mode: FormMode,
    pub form: SubjectForm,
}

impl SubjectEditor {
    pub fn create(api: ApiClient) -> Self {
        Self {
            api,
            mode: FormMode::Create,
            form: SubjectForm::default(),
        }
    }

    pub fn edit(api: ApiClient, id: EntityId) -> Self {
        Self {
            api,
            mode: FormMode::Edit(id),
            form: SubjectForm::default(),
        }
    }

    pub async fn mount(&mut self) -> ViewResult<()> {
        if let FormMode::Edit(id) = self.mode {
            let subject: Subject = fetch(&self.api, &endpoints::subject(id))
                .await
                .map_err(|e| load_failed("subject_edit", e))?;
            self.form.name = subject.name;
        }
        Ok(())
    }

    pub async fn submit(&mut self) -> ViewResult<Navigation> {
        schemas::subject()
            .validate(&self.form)
            .map_err(ViewError::Invalid)?;

        let (result, fallback, success) = match self.mode {
            FormMode::Create => (
                self.api.post_json(endpoints::SUBJECTS, &self.form).await,
                "Subject creation failed. Please try again.",
                "Subject created successfully!",
            ),
            FormMode::Edit(id) => (
                self.api.put_json(&endpoints::subject(id), &self.form).await,
                "Update failed. Maybe subject name already exists.",
                "Subject updated successfully!",
            ),
        };

        if let Err(error) = result {
            return Err(write_failed(&self.api, error, &["name"], fallback));
        }
        notify_success(&self.api, success);
        Ok(Navigation::SubjectList)
    }
}
