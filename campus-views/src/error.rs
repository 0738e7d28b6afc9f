use crate::forms::FormErrors;
use campus_core::CampusError;
use thiserror::Error;

pub type ViewResult<T> = Result<T, ViewError>;

/// Why a view operation did not complete
#[derive(Error, Debug)]
pub enum ViewError {
    /// Client-side validation rejected the form; nothing was sent
    #[error("Invalid form: {0}")]
    Invalid(FormErrors),

    #[error(transparent)]
    Api(#[from] CampusError),

    /// The user declined a confirmation prompt
    #[error("Cancelled by user")]
    Cancelled,
}

impl ViewError {
    pub fn form_errors(&self) -> Option<&FormErrors> {
        match self {
            ViewError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn api_error(&self) -> Option<&CampusError> {
        match self {
            ViewError::Api(error) => Some(error),
            _ => None,
        }
    }
}

impl From<FormErrors> for ViewError {
    fn from(errors: FormErrors) -> Self {
        ViewError::Invalid(errors)
    }
}
