//! Request bodies for creating and editing capsules and attaching contents.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dates::parse_datetime_input;
use crate::errors::AppError;
use crate::models::capsule::{
    Capsule, CapsuleStatus, NewCapsule, NewCapsuleContent, PLACEHOLDER_KEY_HASH,
};

/// Mime classes the file-drop accepts.
pub const ACCEPTED_MIME_CLASSES: [&str; 4] = ["image/*", "audio/*", "video/*", "application/pdf"];

#[derive(Debug, Deserialize)]
pub struct CreateCapsuleRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub release_date: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditCapsuleRequest {
    pub title: Option<String>,
    /// An empty string clears the description.
    pub description: Option<String>,
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddContentRequest {
    pub content_type: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Opaque payload, already encrypted by the caller.
    pub encrypted_content: String,
    #[serde(default)]
    pub metadata: Option<Value>,
}

fn required_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    Ok(title.to_string())
}

fn optional_text(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn release_date(input: &str) -> Result<DateTime<Utc>, AppError> {
    if input.trim().is_empty() {
        return Err(AppError::Validation("Release date is required".into()));
    }
    parse_datetime_input(input)
        .ok_or_else(|| AppError::Validation(format!("Invalid release date '{input}'")))
}

impl CreateCapsuleRequest {
    /// Every new capsule starts as a draft carrying the placeholder key hash.
    pub fn into_new_capsule(self, creator_id: Uuid) -> Result<NewCapsule, AppError> {
        Ok(NewCapsule {
            creator_id,
            title: required_title(&self.title)?,
            description: optional_text(self.description),
            release_date: release_date(&self.release_date)?,
            encryption_key_hash: PLACEHOLDER_KEY_HASH.to_string(),
            status: CapsuleStatus::Draft,
        })
    }
}

impl EditCapsuleRequest {
    pub fn apply(self, capsule: &Capsule, now: DateTime<Utc>) -> Result<Capsule, AppError> {
        let mut next = capsule.clone();
        if let Some(title) = self.title {
            next.title = required_title(&title)?;
        }
        if let Some(description) = self.description {
            next.description = optional_text(Some(description));
        }
        if let Some(date) = self.release_date {
            next.release_date = release_date(&date)?;
        }
        next.updated_at = now;
        Ok(next)
    }
}

/// `image/png` matches `image/*`; parameters such as `; charset=` are ignored.
pub fn accepts_mime(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let Some((kind, subtype)) = essence.split_once('/') else {
        return false;
    };
    if kind.is_empty() || subtype.is_empty() {
        return false;
    }

    ACCEPTED_MIME_CLASSES.iter().any(|class| match class.split_once('/') {
        Some((class_kind, "*")) => class_kind == kind,
        _ => *class == essence,
    })
}

impl AddContentRequest {
    pub fn into_new_content(self, capsule_id: Uuid) -> Result<NewCapsuleContent, AppError> {
        if !accepts_mime(&self.content_type) {
            return Err(AppError::Validation(format!(
                "Unsupported content type '{}'; accepted: {}",
                self.content_type,
                ACCEPTED_MIME_CLASSES.join(", ")
            )));
        }
        if self.encrypted_content.is_empty() {
            return Err(AppError::Validation("Content payload is required".into()));
        }
        let metadata = match self.metadata {
            None | Some(Value::Null) => json!({}),
            Some(v @ Value::Object(_)) => v,
            Some(_) => return Err(AppError::Validation("Metadata must be a JSON object".into())),
        };

        Ok(NewCapsuleContent {
            capsule_id,
            content_type: self.content_type.trim().to_ascii_lowercase(),
            title: required_title(&self.title)?,
            description: optional_text(self.description),
            encrypted_content: self.encrypted_content,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create(title: &str, description: Option<&str>, release: &str) -> CreateCapsuleRequest {
        CreateCapsuleRequest {
            title: title.to_string(),
            description: description.map(str::to_string),
            release_date: release.to_string(),
        }
    }

    #[test]
    fn test_create_is_always_draft_with_placeholder_hash() {
        let creator = Uuid::new_v4();
        let new = create("T", None, "2030-01-01T00:00")
            .into_new_capsule(creator)
            .unwrap();
        assert_eq!(new.status, CapsuleStatus::Draft);
        assert_eq!(new.title, "T");
        assert_eq!(new.creator_id, creator);
        assert_eq!(new.encryption_key_hash, PLACEHOLDER_KEY_HASH);
        assert_eq!(
            new.release_date,
            Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(matches!(
            create("   ", None, "2030-01-01T00:00").into_new_capsule(Uuid::new_v4()),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_missing_release_date_rejected() {
        assert!(create("T", None, "").into_new_capsule(Uuid::new_v4()).is_err());
        assert!(create("T", None, "soon").into_new_capsule(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_blank_description_stored_as_none() {
        let new = create("T", Some("  "), "2030-01-01T00:00")
            .into_new_capsule(Uuid::new_v4())
            .unwrap();
        assert!(new.description.is_none());
    }

    #[test]
    fn test_accepts_mime_classes() {
        assert!(accepts_mime("image/png"));
        assert!(accepts_mime("Audio/MPEG"));
        assert!(accepts_mime("video/mp4; codecs=avc1"));
        assert!(accepts_mime("application/pdf"));
        assert!(!accepts_mime("application/zip"));
        assert!(!accepts_mime("text/plain"));
        assert!(!accepts_mime("image"));
        assert!(!accepts_mime("image/"));
    }

    #[test]
    fn test_content_metadata_must_be_object() {
        let req = AddContentRequest {
            content_type: "image/jpeg".to_string(),
            title: "Beach".to_string(),
            description: None,
            encrypted_content: "b64...".to_string(),
            metadata: Some(json!([1, 2])),
        };
        assert!(req.into_new_content(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_content_defaults_metadata() {
        let req = AddContentRequest {
            content_type: "IMAGE/JPEG".to_string(),
            title: "Beach".to_string(),
            description: Some("".to_string()),
            encrypted_content: "b64...".to_string(),
            metadata: None,
        };
        let new = req.into_new_content(Uuid::new_v4()).unwrap();
        assert_eq!(new.metadata, json!({}));
        assert_eq!(new.content_type, "image/jpeg");
        assert!(new.description.is_none());
    }
}
