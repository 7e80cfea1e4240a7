use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::FieldError;
use crate::validation::MAX_TAGS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: String,
}

impl Bookmark {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Case-insensitive substring match over title, url and description.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.url.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

/// Request body for create and update. Every field is optional on the wire,
/// the rules live in `validation`. A field with the wrong JSON type is kept
/// out of the typed fields and recorded in `malformed`, so it is reported
/// next to the other violations instead of failing the whole body.
#[derive(Debug, Clone, Default)]
pub struct BookmarkInput {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub malformed: Vec<FieldError>,
}

impl BookmarkInput {
    pub fn new(url: &str, title: &str) -> Self {
        BookmarkInput {
            url: Some(url.to_owned()),
            title: Some(title.to_owned()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_owned());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    fn from_fields(mut fields: Map<String, Value>) -> Self {
        let mut malformed = Vec::new();
        let url = string_field(&mut fields, "url", "Invalid URL format", &mut malformed);
        let title = string_field(&mut fields, "title", "Title must be a string", &mut malformed);
        let description = string_field(
            &mut fields,
            "description",
            "Description must be a string",
            &mut malformed,
        );
        let tags = tags_field(&mut fields, &mut malformed);

        BookmarkInput {
            url,
            title,
            description,
            tags,
            malformed,
        }
    }
}

impl<'de> Deserialize<'de> for BookmarkInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Map::<String, Value>::deserialize(deserializer)?;
        Ok(BookmarkInput::from_fields(fields))
    }
}

fn string_field(
    fields: &mut Map<String, Value>,
    name: &str,
    msg: &str,
    malformed: &mut Vec<FieldError>,
) -> Option<String> {
    match fields.remove(name) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(_) => {
            malformed.push(FieldError::new(name, msg));
            None
        }
    }
}

fn tags_field(fields: &mut Map<String, Value>, malformed: &mut Vec<FieldError>) -> Option<Vec<String>> {
    let items = match fields.remove("tags") {
        None | Some(Value::Null) => return None,
        Some(Value::Array(items)) => items,
        Some(_) => {
            malformed.push(FieldError::new("tags", "Tags must be an array"));
            return None;
        }
    };

    if items.iter().any(|v| !v.is_string()) {
        if items.len() > MAX_TAGS {
            malformed.push(FieldError::new("tags", "Maximum 5 tags allowed"));
        }
        malformed.push(FieldError::new("tags", "Tags must be lowercase strings"));
    }

    Some(
        items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
    )
}

/// Trimmed, owned form of a `BookmarkInput`.
#[derive(Debug, Clone, Default)]
pub struct Draft {
    pub url: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub malformed: Vec<FieldError>,
}

impl Draft {
    /// True when `field` arrived with the wrong JSON type.
    pub fn is_malformed(&self, field: &str) -> bool {
        self.malformed.iter().any(|e| e.param == field)
    }
}

impl From<BookmarkInput> for Draft {
    fn from(input: BookmarkInput) -> Self {
        Draft {
            url: input.url.unwrap_or_default().trim().to_owned(),
            title: input.title.unwrap_or_default().trim().to_owned(),
            description: input.description.unwrap_or_default().trim().to_owned(),
            tags: input.tags.unwrap_or_default(),
            malformed: input.malformed,
        }
    }
}
