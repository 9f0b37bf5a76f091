use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Every problem found in one request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    /// First message, used as the top-level error text.
    pub fn summary(&self) -> String {
        match self.0.first() {
            Some(first) => format!("{} {}", first.field, first.message),
            None => "invalid request".to_string(),
        }
    }
}

/// Trims `value` and checks it is present, non-blank and at most `max_len`
/// characters. Records a field error and returns `None` otherwise.
pub fn required_text(
    field: &'static str,
    value: Option<String>,
    max_len: usize,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = value.map(|value| value.trim().to_string());
    match value {
        Some(value) if !value.is_empty() => {
            if value.chars().count() > max_len {
                errors.push(FieldError::new(
                    field,
                    format!("must be at most {} characters", max_len),
                ));
                None
            } else {
                Some(value)
            }
        }
        _ => {
            errors.push(FieldError::new(field, "is required"));
            None
        }
    }
}

/// Like [`required_text`] but absent or blank input is fine.
pub fn optional_text(
    field: &'static str,
    value: Option<String>,
    max_len: usize,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())?;
    if value.chars().count() > max_len {
        errors.push(FieldError::new(
            field,
            format!("must be at most {} characters", max_len),
        ));
        return None;
    }
    Some(value)
}

/// Lowercases and trims a category so exact matching is not defeated by
/// casing in stored rows.
pub fn normalize_category(value: &str) -> String {
    value.trim().to_lowercase()
}
