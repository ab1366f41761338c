//! Conversion of accumulated wizard state into a submittable form.
//!
//! Steps that collect form input store their payload wrapped in a
//! [`TaggedPayload`], which records the kind of component that produced it.
//! At the end of a flow [`aggregate_form_data`] walks the state bag and
//! flattens every tagged payload into ordered [`FormData`] entries, which can
//! then be turned into a multipart body.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use reqwest::blocking::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::wizard::{Payload, StepId};

/// Errors raised while building a multipart body
#[derive(Error, Debug)]
pub enum FormDataError {
    #[error("failed to attach file {path:?} for field '{field}': {source}")]
    FileAttach {
        field: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid content type '{content_type}' for field '{field}': {source}")]
    InvalidContentType {
        field: String,
        content_type: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Kind of input component a step payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentType {
    FileUpload,
    Select,
    MultiSelect,
    TextInput,
    TextArea,
    Checkbox,
    DatePicker,
}

impl ComponentType {
    pub fn all() -> &'static [ComponentType] {
        &[
            ComponentType::FileUpload,
            ComponentType::Select,
            ComponentType::MultiSelect,
            ComponentType::TextInput,
            ComponentType::TextArea,
            ComponentType::Checkbox,
            ComponentType::DatePicker,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::FileUpload => "file-upload",
            ComponentType::Select => "select",
            ComponentType::MultiSelect => "multi-select",
            ComponentType::TextInput => "text-input",
            ComponentType::TextArea => "text-area",
            ComponentType::Checkbox => "checkbox",
            ComponentType::DatePicker => "date-picker",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ComponentType::all()
            .iter()
            .copied()
            .find(|ct| ct.as_str() == s)
            .ok_or_else(|| format!("unknown component type: {s}"))
    }
}

/// A step payload tagged with the component that produced it.
///
/// Serialized as `{"componentType": ..., "field": ..., "value": ...}`;
/// `field` defaults to the step id when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaggedPayload {
    pub component_type: ComponentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default)]
    pub value: Value,
}

impl TaggedPayload {
    pub fn new(component_type: ComponentType, value: Value) -> Self {
        Self {
            component_type,
            field: None,
            value,
        }
    }

    /// Submit under `field` instead of the step id
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// The JSON payload to store in the wizard state
    pub fn into_payload(self) -> Payload {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Tag a value with its component type, ready for `update_step_state`
pub fn tag(component_type: ComponentType, value: Value) -> Payload {
    TaggedPayload::new(component_type, value).into_payload()
}

/// A file selected in a file-upload step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    pub name: String,
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// One form entry value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text(String),
    File(FileDescriptor),
}

/// Ordered multi-valued form entries, like a browser `FormData`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, FormPart)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.push((key.into(), FormPart::Text(text.into())));
    }

    pub fn append_file(&mut self, key: impl Into<String>, file: FileDescriptor) {
        self.entries.push((key.into(), FormPart::File(file)));
    }

    pub fn entries(&self) -> &[(String, FormPart)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All values appended under `key`, in order
    pub fn get_all(&self, key: &str) -> Vec<&FormPart> {
        self.entries
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, part)| part)
            .collect()
    }

    /// First text value appended under `key`
    pub fn text(&self, key: &str) -> Option<&str> {
        self.entries.iter().find_map(|(k, part)| match part {
            FormPart::Text(text) if k == key => Some(text.as_str()),
            _ => None,
        })
    }

    /// Build a multipart body, reading file parts from disk
    pub fn into_multipart(self) -> Result<Form, FormDataError> {
        let mut form = Form::new();
        for (key, part) in self.entries {
            form = match part {
                FormPart::Text(text) => form.text(key, text),
                FormPart::File(file) => {
                    let part = file_part(&key, file)?;
                    form.part(key, part)
                }
            };
        }
        Ok(form)
    }
}

fn file_part(field: &str, file: FileDescriptor) -> Result<Part, FormDataError> {
    let part = Part::file(&file.path).map_err(|source| FormDataError::FileAttach {
        field: field.to_string(),
        path: file.path.clone(),
        source,
    })?;
    let part = part.file_name(file.name);

    match file.content_type {
        Some(content_type) => {
            part.mime_str(&content_type)
                .map_err(|source| FormDataError::InvalidContentType {
                    field: field.to_string(),
                    content_type,
                    source,
                })
        }
        None => Ok(part),
    }
}

/// Flatten every tagged payload in the state bag into form entries.
///
/// Entries are visited in step-id order. Untagged payloads are ignored;
/// payloads with an unrecognised `componentType` are skipped with a warning.
pub fn aggregate_form_data(state: &BTreeMap<StepId, Payload>) -> FormData {
    let mut form = FormData::new();
    for (step_id, payload) in state {
        append_payload(&mut form, step_id, payload);
    }
    form
}

/// Append one step payload. Returns whether the payload was recognised.
pub fn append_payload(form: &mut FormData, step_id: &str, payload: &Payload) -> bool {
    let Some(tag) = payload.get("componentType") else {
        tracing::trace!(step = step_id, "untagged step payload not submitted");
        return false;
    };
    let Some(component_type) = tag.as_str().and_then(|s| s.parse::<ComponentType>().ok()) else {
        tracing::warn!(
            step = step_id,
            component_type = %tag,
            "skipping payload with unknown component type"
        );
        return false;
    };

    let field = payload
        .get("field")
        .and_then(Value::as_str)
        .unwrap_or(step_id);
    let value = payload.get("value").unwrap_or(&Value::Null);

    match component_type {
        ComponentType::FileUpload => append_files(form, field, value),
        _ => {
            if let Some(text) = value_to_text(value) {
                form.append_text(field, text);
            }
        }
    }
    true
}

fn append_files(form: &mut FormData, field: &str, value: &Value) {
    let descriptors: &[Value] = match value {
        Value::Array(items) => items.as_slice(),
        Value::Null => &[],
        single => std::slice::from_ref(single),
    };

    for descriptor in descriptors {
        match serde_json::from_value::<FileDescriptor>(descriptor.clone()) {
            Ok(file) => form.append_file(field, file),
            Err(err) => {
                tracing::warn!(field, error = %err, "skipping malformed file descriptor");
            }
        }
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
