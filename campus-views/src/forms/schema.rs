//! Declarative form validation
//!
//! A [`FormSchema`] lists per-field rules (required message, format rule)
//! and cross-field rules. Forms are validated on their serialized JSON shape,
//! so any `Serialize` form struct can be checked against its schema. Each
//! field reports at most one message: the required message when the value is
//! empty, otherwise the format message.

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use tracing::warn;

/// Key under which errors about the form as a whole are reported
pub const FORM_KEY: &str = "form";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub enum Format {
    Email,
    /// `YYYY-MM-DD`
    Date,
    /// Numeric text, optionally bounded below with its own message
    Number { min: Option<(f64, &'static str)> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub field: &'static str,
    pub required: Option<&'static str>,
    pub format: Option<(Format, &'static str)>,
}

impl FieldRule {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            required: None,
            format: None,
        }
    }

    pub fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    pub fn format(mut self, format: Format, message: &'static str) -> Self {
        self.format = Some((format, message));
        self
    }

    fn check(&self, value: Option<&str>) -> Option<&'static str> {
        let Some(text) = value else {
            return self.required;
        };

        let (format, message) = self.format.as_ref()?;
        match format {
            Format::Email => (!EMAIL_PATTERN.is_match(text)).then_some(*message),
            Format::Date => parse_date(text).is_none().then_some(*message),
            Format::Number { min } => match text.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => match min {
                    Some((bound, min_message)) if number < *bound => Some(*min_message),
                    _ => None,
                },
                _ => Some(*message),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrossFieldRule {
    /// `field` must not be an earlier date than `other`
    DateNotBefore {
        field: &'static str,
        other: &'static str,
        message: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Validation failures in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn single(field: &str, message: &str) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|error| error.field.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();
        write!(f, "{}", messages.join("; "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormSchema {
    pub name: &'static str,
    pub fields: Vec<FieldRule>,
    pub cross_field: Vec<CrossFieldRule>,
}

impl FormSchema {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            cross_field: Vec::new(),
        }
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.fields.push(rule);
        self
    }

    /// Shorthand for a rule with only a required message
    pub fn required(self, field: &'static str, message: &'static str) -> Self {
        self.field(FieldRule::new(field).required(message))
    }

    pub fn cross(mut self, rule: CrossFieldRule) -> Self {
        self.cross_field.push(rule);
        self
    }

    /// Names of the fields that must be filled in
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|rule| rule.required.is_some())
            .map(|rule| rule.field)
            .collect()
    }

    /// Validate any serializable form. A form that cannot be serialized is
    /// rejected as a whole under the `form` key.
    pub fn validate<T: Serialize>(&self, form: &T) -> Result<(), FormErrors> {
        let values = serde_json::to_value(form).map_err(|e| {
            warn!(schema = self.name, error = %e, "Form could not be serialized");
            FormErrors::single(FORM_KEY, "Form could not be read")
        })?;
        self.validate_value(&values)
    }

    pub fn validate_value(&self, values: &Value) -> Result<(), FormErrors> {
        let mut errors = FormErrors::default();

        for rule in &self.fields {
            let text = field_text(values, rule.field);
            if let Some(message) = rule.check(text.as_deref()) {
                errors.push(rule.field, message);
            }
        }

        for rule in &self.cross_field {
            match rule {
                CrossFieldRule::DateNotBefore {
                    field,
                    other,
                    message,
                } => {
                    if errors.contains(field) {
                        continue;
                    }
                    let later = field_text(values, field).as_deref().and_then(parse_date);
                    let earlier = field_text(values, other).as_deref().and_then(parse_date);
                    if let (Some(later), Some(earlier)) = (later, earlier) {
                        if later < earlier {
                            errors.push(field, message);
                        }
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

/// Text of a field; `None` for missing, null, empty strings and empty lists
fn field_text(values: &Value, field: &str) -> Option<String> {
    match values.get(field)? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if items.is_empty() => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_schema() -> FormSchema {
        FormSchema::new("sample")
            .required("name", "Name is required")
            .field(
                FieldRule::new("email")
                    .required("Email is required")
                    .format(Format::Email, "Invalid email"),
            )
            .field(
                FieldRule::new("years")
                    .required("Years are required")
                    .format(
                        Format::Number {
                            min: Some((0.0, "Cannot be negative")),
                        },
                        "Must be a number",
                    ),
            )
            .field(FieldRule::new("start").format(Format::Date, "Invalid date"))
            .field(FieldRule::new("end").format(Format::Date, "Invalid date"))
            .cross(CrossFieldRule::DateNotBefore {
                field: "end",
                other: "start",
                message: "End before start",
            })
    }

    #[test]
    fn test_required_takes_precedence_over_format() {
        let errors = sample_schema()
            .validate_value(&json!({"name": "", "email": "", "years": ""}))
            .unwrap_err();

        assert_eq!(errors.get("name"), Some("Name is required"));
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("years"), Some("Years are required"));
        assert_eq!(errors.fields(), vec!["name", "email", "years"]);
    }

    #[test]
    fn test_format_rules() {
        let errors = sample_schema()
            .validate_value(&json!({
                "name": "x",
                "email": "not-an-email",
                "years": "-2",
                "start": "2024-13-01"
            }))
            .unwrap_err();

        assert_eq!(errors.get("email"), Some("Invalid email"));
        assert_eq!(errors.get("years"), Some("Cannot be negative"));
        assert_eq!(errors.get("start"), Some("Invalid date"));

        let errors = sample_schema()
            .validate_value(&json!({"name": "x", "email": "a@b.co", "years": "ten"}))
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("years"), Some("Must be a number"));
    }

    #[test]
    fn test_numbers_may_arrive_as_json_numbers() {
        assert!(sample_schema()
            .validate_value(&json!({"name": "x", "email": "a@b.co", "years": 4}))
            .is_ok());
    }

    #[test]
    fn test_cross_field_dates() {
        let errors = sample_schema()
            .validate_value(&json!({
                "name": "x",
                "email": "a@b.co",
                "years": "1",
                "start": "2024-05-10",
                "end": "2024-05-01"
            }))
            .unwrap_err();
        assert_eq!(errors.get("end"), Some("End before start"));

        assert!(sample_schema()
            .validate_value(&json!({
                "name": "x",
                "email": "a@b.co",
                "years": "1",
                "start": "2024-05-10",
                "end": "2024-05-10"
            }))
            .is_ok());
    }

    #[test]
    fn test_empty_list_counts_as_missing() {
        let schema = FormSchema::new("tags").required("tags", "Pick one");
        assert!(schema.validate_value(&json!({"tags": []})).is_err());
        assert!(schema.validate_value(&json!({"tags": [1]})).is_ok());
    }

    struct Unreadable;

    impl Serialize for Unreadable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("unreadable field"))
        }
    }

    #[test]
    fn test_unserializable_form_is_rejected() {
        let errors = sample_schema().validate(&Unreadable).unwrap_err();
        assert_eq!(errors.get(FORM_KEY), Some("Form could not be read"));
        assert_eq!(errors.iter().count(), 1);
    }
}
