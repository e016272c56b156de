use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::contact::NewContactSubmission;

/// Raw "Get in Touch" form as submitted. Missing fields deserialize empty so
/// validation can name them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message_type: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    General,
    Feedback,
    Bug,
    Collaboration,
    Other,
}

impl MessageType {
    pub const ALL: [MessageType; 5] = [
        MessageType::General,
        MessageType::Feedback,
        MessageType::Bug,
        MessageType::Collaboration,
        MessageType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Feedback => "feedback",
            Self::Bug => "bug",
            Self::Collaboration => "collaboration",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General inquiry",
            Self::Feedback => "Feedback",
            Self::Bug => "Bug report",
            Self::Collaboration => "Collaboration",
            Self::Other => "Other",
        }
    }
}

impl FromStr for MessageType {
    type Err = ContactValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ContactValidationError::UnknownMessageType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactValidationError {
    #[error("Please fill in the '{0}' field.")]
    MissingField(&'static str),

    #[error("Unknown message type '{0}'.")]
    UnknownMessageType(String),
}

/// Checks that every field is present and the category is known.
/// Whitespace-only counts as missing. Accepted values are stored as submitted.
pub fn validate(form: &ContactForm) -> Result<NewContactSubmission, ContactValidationError> {
    let required = [
        ("Name", form.name.trim()),
        ("Email", form.email.trim()),
        ("Message Type", form.message_type.trim()),
        ("Message", form.message.trim()),
    ];
    if let Some((label, _)) = required.iter().find(|(_, v)| v.is_empty()) {
        return Err(ContactValidationError::MissingField(*label));
    }

    form.message_type.parse::<MessageType>()?;

    Ok(NewContactSubmission {
        name: form.name.clone(),
        email: form.email.clone(),
        message_type: form.message_type.clone(),
        message: form.message.clone(),
    })
}
