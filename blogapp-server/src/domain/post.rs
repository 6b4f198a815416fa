use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::{DomainError, FieldErrors};

pub const TITLE_MAX_CHARS: usize = 200;

/// Wire format for `created_at`: microsecond precision, always UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_BLANK: &str = "This field may not be blank.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: Author,
    pub created_at: DateTime<Utc>,
}

/// A post that has passed validation but has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author: Author,
}

/// Caller-writable fields of a full write (create or PUT).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    pub title: String,
    pub content: String,
}

/// Caller-writable fields of a partial write; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostChanges {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl From<PostFields> for PostChanges {
    fn from(fields: PostFields) -> Self {
        Self {
            title: Some(fields.title),
            content: Some(fields.content),
        }
    }
}

/// Inbound JSON body for post writes.
///
/// Only `title` and `content` are read. Server-owned keys such as `author`,
/// `id` and `created_at` are dropped during deserialization and can never
/// reach the store.
#[derive(Debug, Default, Deserialize)]
pub struct PostPayload {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Value>,
}

// Keeps an explicit `null` as `Some(Value::Null)` so it can be told apart from
// a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl PostPayload {
    pub fn validate(self) -> Result<PostFields, DomainError> {
        let mut errors = FieldErrors::new();
        let title = clean_field("title", self.title, true, Some(TITLE_MAX_CHARS), &mut errors);
        let content = clean_field("content", self.content, true, None, &mut errors);

        match (title, content) {
            (Some(title), Some(content)) if errors.is_empty() => Ok(PostFields { title, content }),
            _ => Err(DomainError::ValidationFailed(errors)),
        }
    }

    pub fn validate_partial(self) -> Result<PostChanges, DomainError> {
        let mut errors = FieldErrors::new();
        let title = clean_field("title", self.title, false, Some(TITLE_MAX_CHARS), &mut errors);
        let content = clean_field("content", self.content, false, None, &mut errors);

        if errors.is_empty() {
            Ok(PostChanges { title, content })
        } else {
            Err(DomainError::ValidationFailed(errors))
        }
    }
}

fn clean_field(
    field: &str,
    value: Option<Value>,
    required: bool,
    max_chars: Option<usize>,
    errors: &mut FieldErrors,
) -> Option<String> {
    let raw = match value {
        None => {
            if required {
                errors.add(field, REQUIRED);
            }
            return None;
        }
        Some(Value::Null) => {
            errors.add(field, NOT_NULL);
            return None;
        }
        Some(Value::String(raw)) => raw,
        Some(Value::Number(number)) => number.to_string(),
        Some(_) => {
            errors.add(field, NOT_STRING);
            return None;
        }
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        errors.add(field, NOT_BLANK);
        return None;
    }

    if let Some(max) = max_chars {
        if trimmed.chars().count() > max {
            errors.add(
                field,
                format!("Ensure this field has no more than {} characters.", max),
            );
            return None;
        }
    }

    Some(trimmed.to_string())
}

/// Outbound JSON shape of a post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author: post.author.username,
            created_at: post.created_at.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}
