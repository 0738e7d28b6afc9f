//! Campus Views - the console's entity views and form validation
//!
//! Views sit on top of [`campus_api::ApiClient`]: they hold view-local
//! state, validate forms before sending anything and return the next
//! [`Navigation`] target on success.

pub mod error;
pub mod forms;
pub mod navigation;
pub mod views;

pub use error::{ViewError, ViewResult};
pub use forms::{FormErrors, FormSchema};
pub use navigation::Navigation;
pub use views::auth::{AdminForm, AdminRegisterView, LoginForm, LoginView};
pub use views::batch::{BatchDetailView, BatchEditor, BatchForm};
pub use views::course::{CourseEditor, CourseForm};
pub use views::student::{StudentRegisterView, StudentRegistration};
pub use views::subject::{SubjectEditor, SubjectForm};
pub use views::teacher::{
    TeacherEditView, TeacherFilters, TeacherListView, TeacherRegisterView, TeacherRegistration,
    TeacherUpdate,
};
pub use views::{DetailView, FormMode, ListView, Resource};
