//! Course list, detail and create/edit form

use super::{fetch, load_failed, notify_success, write_failed, FormMode, Resource};
use crate::error::{ViewError, ViewResult};
use crate::forms::schemas;
use crate::navigation::Navigation;
use campus_api::{endpoints, ApiClient};
use campus_core::{Course, EntityId, Subject};
use serde::{Deserialize, Serialize};

impl Resource for Course {
    const LABEL: &'static str = "course";
    const COLLECTION: &'static str = endpoints::COURSES;
    const LIST: Navigation = Navigation::CourseList;
    const DELETE_PROMPT: &'static str = "Are you sure you want to delete this course?";
    const DELETED: &'static str = "Course deleted successfully!";
    const DELETE_FAILED: &'static str = "Failed to delete course.";

    fn detail_path(id: EntityId) -> String {
        endpoints::course(id)
    }

    fn id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CourseForm {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub fk_subject: Vec<EntityId>,
}

impl From<&Course> for CourseForm {
    fn from(course: &Course) -> Self {
        Self {
            title: course.title.clone(),
            description: course.description.clone(),
            duration: course.duration.clone(),
            fk_subject: course.fk_subject.clone(),
        }
    }
}

pub struct CourseEditor {
    api: ApiClient,
    mode: FormMode,
    pub form: CourseForm,
    pub subjects: Vec<Subject>,
}

impl CourseEditor {
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
            form: CourseForm::default(),
            subjects: Vec::new(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub async fn mount(&mut self) -> ViewResult<()> {
        if let FormMode::Edit(id) = self.mode {
            let course: Course = fetch(&self.api, &endpoints::course(id))
                .await
                .map_err(|e| load_failed("course_edit", e))?;
            self.form = CourseForm::from(&course);
        }

        self.subjects = fetch(&self.api, endpoints::SUBJECTS)
            .await
            .map_err(|e| load_failed("course_form", e))?;
        Ok(())
    }

    pub async fn submit(&mut self) -> ViewResult<Navigation> {
        schemas::course()
            .validate(&self.form)
            .map_err(ViewError::Invalid)?;

        match self.mode {
            FormMode::Create => {
                if let Err(error) = self.api.post_json(endpoints::COURSES, &self.form).await {
                    return Err(write_failed(
                        &self.api,
                        error,
                        &["title"],
                        "Course creation failed. Please try again.",
                    ));
                }
                notify_success(&self.api, "Course created successfully!");
                Ok(Navigation::CourseList)
            }
            FormMode::Edit(id) => {
                if let Err(error) = self.api.put_json(&endpoints::course(id), &self.form).await {
                    return Err(write_failed(&self.api, error, &[], "Failed to update course"));
                }
                notify_success(&self.api, "Course updated successfully!");
                Ok(Navigation::CourseDetail(id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_serializes_to_request_shape() {
        let form = CourseForm {
            title: "Algebra I".to_string(),
            duration: "30".to_string(),
            ..CourseForm::default()
        };
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            json!({"title": "Algebra I", "description": "", "duration": "30", "fk_subject": []})
        );
    }

    #[test]
    fn test_form_from_course() {
        let course: Course = serde_json::from_value(json!({
            "id": 2,
            "title": "Geometry",
            "description": null,
            "duration": 45,
            "fk_subject": [1, "4"]
        }))
        .unwrap();

        let form = CourseForm::from(&course);
        assert_eq!(form.duration, "45");
        assert_eq!(form.description, "");
        assert_eq!(form.fk_subject, vec![1, 4]);
    }
}
