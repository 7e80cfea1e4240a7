use serde::Serialize;
use thiserror::Error;

/// One violated field rule, serialized into the `details` array of a 400.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub param: String,
    pub msg: String,
}

impl FieldError {
    pub fn new(param: &str, msg: &str) -> Self {
        FieldError {
            param: param.to_owned(),
            msg: msg.to_owned(),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ValidationError: {}", summarize(.0))]
    Validation(Vec<FieldError>),
    #[error("NotFoundError: {0}")]
    NotFound(String),
    #[error("InternalError: {0}")]
    Internal(#[from] anyhow::Error),
}

impl StoreError {
    pub fn fields(&self) -> Vec<&str> {
        match self {
            StoreError::Validation(errors) => errors.iter().map(|e| e.param.as_str()).collect(),
            _ => vec![],
        }
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.param, e.msg))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure to enrich a bookmark with its page title. Never leaves the store.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("RequestError: {0}")]
    Request(#[from] reqwest::Error),
    #[error("NoTitle: {0}")]
    NoTitle(String),
}

/// Failure to read or write the backing file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IoError: {0}")]
    Io(#[from] std::io::Error),
    #[error("DecodeError: {0}")]
    Decode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_lists_every_field() {
        let err = StoreError::Validation(vec![
            FieldError::new("url", "Invalid URL format"),
            FieldError::new("tags", "Maximum 5 tags allowed"),
        ]);
        assert_eq!(
            err.to_string(),
            "ValidationError: url: Invalid URL format, tags: Maximum 5 tags allowed"
        );
        assert_eq!(err.fields(), vec!["url", "tags"]);
    }

    #[test]
    fn test_unpack_error_walks_sources() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = PersistenceError::from(io);
        assert_eq!(crate::unpack_error(&err), "IoError: denied: denied");
    }
}
