//! Flat multipart payloads
//!
//! The backend reads nested serializer fields from flat keys joined with
//! [`NESTED_KEY_SEPARATOR`]: the nested user account of a teacher is sent as
//! `fk_user.username`, `fk_user.email` and `fk_user.password`. Multi-valued
//! fields are sent as one part per value under the same key. Nothing deeper
//! is inferred.

use campus_core::{CampusError, CampusResult, ErrorContext};
use reqwest::multipart::{Form, Part};
use std::path::Path;

pub const NESTED_KEY_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl FormPart {
    pub fn name(&self) -> &str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => name,
        }
    }
}

/// An ordered list of multipart fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartPayload {
    parts: Vec<FormPart>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// `parent.field`, e.g. `fk_user.username`
    pub fn nested(self, parent: &str, field: &str, value: impl Into<String>) -> Self {
        let key = format!("{}{}{}", parent, NESTED_KEY_SEPARATOR, field);
        self.text(key, value)
    }

    /// Skipped entirely when `value` is `None`
    pub fn optional_text(self, name: &str, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    /// One part per value, all under `name`
    pub fn repeated<I, V>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        for value in values {
            self = self.text(name, value.to_string());
        }
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        });
        self
    }

    /// Read `path` and attach it as a file part
    pub async fn file_from_path(self, name: &str, path: &Path) -> CampusResult<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        let content_type = guess_content_type(path);
        Ok(self.file(name, file_name, content_type, bytes))
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Text values recorded under `name`, in insertion order
    pub fn values(&self, name: &str) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                FormPart::Text { name: n, value } if n == name => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, FormPart::File { name: n, .. } if n == name))
    }

    pub(crate) fn into_form(self) -> CampusResult<Form> {
        let mut form = Form::new();
        for part in self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name, value),
                FormPart::File {
                    name,
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&content_type)
                        .map_err(|e| CampusError::Internal {
                            message: format!("Invalid content type '{}': {}", content_type, e),
                            source: Some(Box::new(e)),
                            context: ErrorContext::new("multipart")
                                .with_operation("into_form"),
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

fn guess_content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
