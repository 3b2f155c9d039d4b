use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Field-level validation messages, keyed by the wire name of the field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(|v| v.as_slice())
    }

    /// `Ok(value)` when no message was recorded.
    pub fn into_result<T>(self, value: T) -> Result<T, StoreError> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(StoreError::Validation(self))
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for m in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {m}")?;
                first = false;
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("validation failed: {0}")]
    Validation(FieldErrors),
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("integrity error: {0}")]
    Integrity(String),
    #[error(transparent)]
    Db(rusqlite::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wire code reported in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation_failed",
            StoreError::NotFound { .. } => "not_found",
            StoreError::Integrity(_) => "integrity_error",
            StoreError::Db(_) => "db_query_failed",
        }
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            StoreError::Validation(fields) => Some(serde_json::json!({ "fields": fields })),
            StoreError::NotFound { entity, id } => {
                Some(serde_json::json!({ "entity": entity, "id": id }))
            }
            StoreError::Integrity(_) | StoreError::Db(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            // Constraint failures that slip past the in-transaction checks.
            rusqlite::Error::SqliteFailure(f, msg)
                if f.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::Integrity(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            _ => StoreError::Db(e),
        }
    }
}

impl From<FieldErrors> for StoreError {
    fn from(errors: FieldErrors) -> Self {
        StoreError::Validation(errors)
    }
}
