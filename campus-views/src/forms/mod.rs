//! Form validation
//!
//! [`schema`] holds the validation mechanism, [`schemas`] the rule sets for
//! each form of the console.

mod schema;
pub mod schemas;

pub use schema::{CrossFieldRule, FieldError, FieldRule, FormErrors, FormSchema, Format, FORM_KEY};
