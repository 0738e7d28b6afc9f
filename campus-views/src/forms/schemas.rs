//! Rule sets for every form of the console

use super::schema::{CrossFieldRule, FieldRule, FormSchema, Format};

const EXPERIENCE_NOT_NUMBER: &str = "Years of experience must be a number";
const EXPERIENCE_NEGATIVE: &str = "Experience cannot be negative";

fn email(message: &'static str) -> FieldRule {
    FieldRule::new("email")
        .required("Email is required")
        .format(Format::Email, message)
}

fn date(field: &'static str, required: &'static str) -> FieldRule {
    FieldRule::new(field)
        .required(required)
        .format(Format::Date, "Invalid date")
}

pub fn login() -> FormSchema {
    FormSchema::new("login")
        .required("username", "Username is required")
        .required("password", "Password is required")
}

pub fn admin_register() -> FormSchema {
    FormSchema::new("admin_register")
        .required("username", "Username is required")
        .field(email("Invalid email"))
        .required("password", "Password is required")
}

pub fn course() -> FormSchema {
    FormSchema::new("course")
        .required("title", "Title is required")
        .field(
            FieldRule::new("duration")
                .required("Duration is required")
                .format(Format::Number { min: None }, "Duration must be a number"),
        )
}

pub fn subject() -> FormSchema {
    FormSchema::new("subject").required("name", "Name is required")
}

pub fn batch() -> FormSchema {
    FormSchema::new("batch")
        .required("fk_course", "Course is required")
        .required("batch_name", "Batch name is required")
        .required("batch_code", "Batch code is required")
        .field(date("start_date", "Start date is required"))
        .field(date("end_date", "End date is required"))
        .cross(CrossFieldRule::DateNotBefore {
            field: "end_date",
            other: "start_date",
            message: "End date cannot be before start date",
        })
}

pub fn teacher_register() -> FormSchema {
    FormSchema::new("teacher_register")
        .required("username", "Username is required")
        .field(email("Invalid email format"))
        .required("password", "Password is required")
        .required("full_name", "Full name is required")
        .required("phone_number", "Phone number is required")
        .required("gender", "Gender is required")
        .field(date("date_of_birth", "Date of birth is required"))
        .field(
            FieldRule::new("years_of_experience")
                .required("Experience is required")
                .format(
                    Format::Number {
                        min: Some((0.0, EXPERIENCE_NEGATIVE)),
                    },
                    EXPERIENCE_NOT_NUMBER,
                ),
        )
}

pub fn teacher_edit() -> FormSchema {
    FormSchema::new("teacher_edit")
        .required("username", "Username is required")
        .field(email("Invalid email"))
        .required("full_name", "Full name is required")
        .required("phone_number", "Phone number is required")
        .required("gender", "Gender is required")
        .field(date("date_of_birth", "Date of birth is required"))
}

pub fn student_register() -> FormSchema {
    FormSchema::new("student_register")
        .required("username", "Username is required")
        .field(email("Invalid email"))
        .required("password", "Password is required")
        .required("full_name", "Full name is required")
        .required("phone_number", "Phone number is required")
        .required("gender", "Gender is required")
        .field(date("date_of_birth", "Date of birth is required"))
        .field(date("date_of_admission", "Date of admission is required"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_required_field_sets() {
        assert_eq!(
            teacher_register().required_fields(),
            vec![
                "username",
                "email",
                "password",
                "full_name",
                "phone_number",
                "gender",
                "date_of_birth",
                "years_of_experience"
            ]
        );
        assert_eq!(
            teacher_edit().required_fields(),
            vec![
                "username",
                "email",
                "full_name",
                "phone_number",
                "gender",
                "date_of_birth"
            ]
        );
        assert_eq!(
            student_register().required_fields(),
            vec![
                "username",
                "email",
                "password",
                "full_name",
                "phone_number",
                "gender",
                "date_of_birth",
                "date_of_admission"
            ]
        );
        assert_eq!(
            batch().required_fields(),
            vec!["fk_course", "batch_name", "batch_code", "start_date", "end_date"]
        );
        assert_eq!(course().required_fields(), vec!["title", "duration"]);
        assert_eq!(subject().required_fields(), vec!["name"]);
        assert_eq!(admin_register().required_fields(), vec!["username", "email", "password"]);
        assert_eq!(login().required_fields(), vec!["username", "password"]);
    }

    #[test]
    fn test_empty_teacher_registration_messages() {
        let errors = teacher_register().validate_value(&json!({})).unwrap_err();

        assert_eq!(errors.get("username"), Some("Username is required"));
        assert_eq!(errors.get("full_name"), Some("Full name is required"));
        assert_eq!(errors.get("years_of_experience"), Some("Experience is required"));
        assert_eq!(errors.len(), 8);
    }

    #[test]
    fn test_email_messages_differ_per_form() {
        let bad = json!({"email": "nope"});
        assert_eq!(
            teacher_register().validate_value(&bad).unwrap_err().get("email"),
            Some("Invalid email format")
        );
        assert_eq!(
            admin_register().validate_value(&bad).unwrap_err().get("email"),
            Some("Invalid email")
        );
    }

    #[test]
    fn test_experience_rules() {
        let base = |years: &str| {
            json!({
                "username": "ada",
                "email": "ada@example.com",
                "password": "secret",
                "full_name": "Ada Lovelace",
                "phone_number": "555",
                "gender": "Female",
                "date_of_birth": "1990-12-10",
                "years_of_experience": years
            })
        };

        assert!(teacher_register().validate_value(&base("3")).is_ok());
        assert_eq!(
            teacher_register()
                .validate_value(&base("-1"))
                .unwrap_err()
                .get("years_of_experience"),
            Some(EXPERIENCE_NEGATIVE)
        );
        assert_eq!(
            teacher_register()
                .validate_value(&base("many"))
                .unwrap_err()
                .get("years_of_experience"),
            Some(EXPERIENCE_NOT_NUMBER)
        );
    }

    #[test]
    fn test_batch_dates() {
        let errors = batch()
            .validate_value(&json!({
                "fk_course": 1,
                "batch_name": "Morning",
                "batch_code": "M-01",
                "start_date": "2024-09-01",
                "end_date": "2024-06-01"
            }))
            .unwrap_err();
        assert_eq!(
            errors.get("end_date"),
            Some("End date cannot be before start date")
        );
    }
}
