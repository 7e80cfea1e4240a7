use url::Url;

use crate::error::FieldError;
use crate::model::Draft;

pub const MAX_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_TAGS: usize = 5;

pub fn is_valid_url(value: &str) -> bool {
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

const FIELD_ORDER: [&str; 4] = ["url", "title", "description", "tags"];

fn field_rank(param: &str) -> usize {
    FIELD_ORDER.iter().position(|f| *f == param).unwrap_or(FIELD_ORDER.len())
}

/// Keeps `details` in field order: url, title, description, tags.
fn sort_by_field(errors: &mut [FieldError]) {
    errors.sort_by_key(|e| field_rank(&e.param));
}

/// Checks every rule except "title is required", which the store applies
/// after title enrichment. Violations are collected, not short-circuited.
/// Fields that arrived with the wrong JSON type report only that.
pub fn check_fields(draft: &Draft) -> Vec<FieldError> {
    let mut errors = draft.malformed.clone();

    if !draft.is_malformed("url") {
        if draft.url.is_empty() {
            errors.push(FieldError::new("url", "URL is required"));
        } else if !is_valid_url(&draft.url) {
            errors.push(FieldError::new("url", "Invalid URL format"));
        }
    }

    if !draft.is_malformed("title") && draft.title.chars().count() > MAX_TITLE_LEN {
        errors.push(FieldError::new("title", "Title must be 200 characters or less"));
    }

    if !draft.is_malformed("description") && draft.description.chars().count() > MAX_DESCRIPTION_LEN {
        errors.push(FieldError::new(
            "description",
            "Description must be 500 characters or less",
        ));
    }

    if !draft.is_malformed("tags") {
        if draft.tags.len() > MAX_TAGS {
            errors.push(FieldError::new("tags", "Maximum 5 tags allowed"));
        }
        if draft.tags.iter().any(|tag| *tag != tag.to_lowercase()) {
            errors.push(FieldError::new("tags", "Tags must be lowercase strings"));
        }
    }

    sort_by_field(&mut errors);
    errors
}

/// Full rule set for a draft whose title is final.
pub fn validate(draft: &Draft) -> Vec<FieldError> {
    let mut errors = check_fields(draft);
    if let Some(err) = require_title(draft) {
        insert_title_error(&mut errors, err);
    }
    errors
}

/// A title of the wrong type is already reported by `check_fields`.
pub fn require_title(draft: &Draft) -> Option<FieldError> {
    if draft.title.is_empty() && !draft.is_malformed("title") {
        Some(FieldError::new("title", "Title is required"))
    } else {
        None
    }
}

pub fn insert_title_error(errors: &mut Vec<FieldError>, err: FieldError) {
    errors.push(err);
    sort_by_field(errors);
}
