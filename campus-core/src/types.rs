//! Core data type definitions

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier of any backend record
pub type EntityId = i64;

/// Role of the authenticated principal, as encoded by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum Role {
    Admin = 1,
    Teacher = 2,
    Student = 3,
}

impl Role {
    /// The value persisted under the `role` session key
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }
}

impl From<Role> for u8 {
    fn from(role: Role) -> Self {
        role.code()
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Role::Admin),
            2 => Ok(Role::Teacher),
            3 => Ok(Role::Student),
            other => Err(format!("unknown role code {}", other)),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("role must be 1, 2 or 3, got '{}'", s))?;
        Role::try_from(code)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.label())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Scalar::deserialize(deserializer)? {
            Scalar::Int(code) => u8::try_from(code)
                .map_err(|_| format!("unknown role code {}", code))
                .and_then(Role::try_from)
                .map_err(serde::de::Error::custom),
            Scalar::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// The backend sends identifiers and codes either as JSON numbers or as
/// numeric strings, depending on the serializer.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    fn into_id<E: serde::de::Error>(self) -> Result<EntityId, E> {
        match self {
            Scalar::Int(id) => Ok(id),
            Scalar::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid identifier '{}'", text))),
        }
    }
}

/// Accepts `7` or `"7"`.
pub fn deserialize_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntityId, D::Error> {
    Scalar::deserialize(deserializer)?.into_id()
}

/// Accepts `7`, `"7"`, `null`, `""` or a missing field.
pub fn deserialize_optional_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<EntityId>, D::Error> {
    match Option::<Scalar>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Scalar::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(scalar) => scalar.into_id().map(Some),
    }
}

/// Accepts a list of numbers or numeric strings.
pub fn deserialize_id_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<EntityId>, D::Error> {
    Option::<Vec<Scalar>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .map(Scalar::into_id)
        .collect()
}

/// Free-text scalar that may arrive as a number (e.g. `duration: 30`).
pub fn deserialize_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        Int(i64),
        Float(f64),
        Str(String),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        None => String::new(),
        Some(Text::Int(n)) => n.to_string(),
        Some(Text::Float(n)) => n.to_string(),
        Some(Text::Str(s)) => s,
    })
}

/// A list that may arrive as `null`.
pub fn deserialize_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// RFC 3339 timestamps, or naive ones (no offset) read as UTC. Anything
/// unparseable decodes as `None` instead of rejecting the record.
pub fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }

    tracing::warn!(value = %raw, "Ignoring unparseable timestamp");
    Ok(None)
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Client-held record of the authenticated principal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub username: Option<String>,
    pub student_id: Option<EntityId>,
    pub teacher_id: Option<EntityId>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(default, deserialize_with = "deserialize_text")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "deserialize_text")]
    pub title: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub description: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub duration: String,
    #[serde(deserialize_with = "deserialize_id_list")]
    pub fk_subject: Vec<EntityId>,
    #[serde(deserialize_with = "deserialize_list")]
    pub fk_subject_details: Vec<Subject>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeacherSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "deserialize_text")]
    pub full_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudentSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "deserialize_text")]
    pub full_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSummary {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "deserialize_text")]
    pub batch_name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub course_title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "deserialize_text")]
    pub batch_name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub batch_code: String,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub fk_course: Option<EntityId>,
    #[serde(deserialize_with = "deserialize_text")]
    pub course_title: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub start_date: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub end_date: String,
    #[serde(deserialize_with = "deserialize_list")]
    pub subject_list: Vec<Subject>,
    #[serde(deserialize_with = "deserialize_list")]
    pub teacher_list: Vec<TeacherSummary>,
    #[serde(deserialize_with = "deserialize_list")]
    pub student_list: Vec<StudentSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Teacher {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "deserialize_text")]
    pub username: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub full_name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub phone_number: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub qualifications: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub years_of_experience: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub gender: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub date_of_birth: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub address: String,
    pub image: Option<String>,
    #[serde(deserialize_with = "deserialize_id_list")]
    pub subjects: Vec<EntityId>,
    #[serde(deserialize_with = "deserialize_list")]
    pub subject_names: Vec<String>,
    #[serde(deserialize_with = "deserialize_list")]
    pub assigned_batches: Vec<BatchSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Student {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: EntityId,
    #[serde(deserialize_with = "deserialize_text")]
    pub username: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub email: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub full_name: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub roll_no: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub date_of_birth: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub phone_number: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub address: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub gender: String,
    #[serde(deserialize_with = "deserialize_text")]
    pub date_of_admission: String,
    #[serde(deserialize_with = "deserialize_optional_id")]
    pub batch: Option<EntityId>,
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_accepts_numbers_and_strings() {
        let from_string: Role = serde_json::from_value(json!("2")).unwrap();
        let from_number: Role = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(from_string, Role::Teacher);
        assert_eq!(from_number, Role::Student);
        assert!(serde_json::from_value::<Role>(json!("9")).is_err());
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!(1));
    }

    #[test]
    fn test_course_decodes_loose_payload() {
        let course: Course = serde_json::from_value(json!({
            "id": "4",
            "title": "Algebra I",
            "duration": 30,
            "fk_subject": [1, "2"],
            "fk_subject_details": [{"id": 1, "name": "Maths"}],
            "created_at": "2024-06-01T09:30:00Z",
            "extra": "ignored"
        }))
        .unwrap();

        assert_eq!(course.id, 4);
        assert_eq!(course.duration, "30");
        assert_eq!(course.description, "");
        assert_eq!(course.fk_subject, vec![1, 2]);
        assert_eq!(course.fk_subject_details[0].name, "Maths");
        assert!(course.created_at.is_some());
        assert!(course.updated_at.is_none());
    }

    #[test]
    fn test_batch_optional_course() {
        let batch: Batch = serde_json::from_value(json!({
            "id": 9,
            "batch_name": "Morning",
            "fk_course": "",
            "teacher_list": [{"id": 3, "full_name": "Ada"}]
        }))
        .unwrap();

        assert_eq!(batch.fk_course, None);
        assert_eq!(batch.teacher_list.len(), 1);
        assert!(batch.student_list.is_empty());
    }

    #[test]
    fn test_null_text_and_lists_decode_as_empty() {
        let teacher: Teacher = serde_json::from_value(json!({
            "id": 3,
            "qualifications": null,
            "address": null,
            "subject_names": null,
            "assigned_batches": null
        }))
        .unwrap();
        assert_eq!(teacher.qualifications, "");
        assert_eq!(teacher.address, "");
        assert!(teacher.subject_names.is_empty());
        assert!(teacher.assigned_batches.is_empty());

        let student: Student =
            serde_json::from_value(json!({"id": 5, "roll_no": null, "address": null})).unwrap();
        assert_eq!(student.roll_no, "");
        assert_eq!(student.address, "");

        let batch: Batch = serde_json::from_value(json!({
            "id": 2,
            "fk_course": null,
            "course_title": null,
            "student_list": null
        }))
        .unwrap();
        assert_eq!(batch.fk_course, None);
        assert_eq!(batch.course_title, "");
        assert!(batch.student_list.is_empty());
    }

    #[test]
    fn test_naive_timestamps_are_read_as_utc() {
        let course: Course = serde_json::from_value(json!({
            "id": 1,
            "title": null,
            "created_at": "2024-06-01T09:30:00.123456",
            "updated_at": "2024-06-02 10:00:00"
        }))
        .unwrap();

        assert_eq!(course.title, "");
        let created = course.created_at.unwrap();
        assert_eq!(created.to_rfc3339(), "2024-06-01T09:30:00.123456+00:00");
        assert!(course.updated_at.is_some());

        let garbled: Course =
            serde_json::from_value(json!({"id": 1, "created_at": "yesterday"})).unwrap();
        assert!(garbled.created_at.is_none());
    }
}
