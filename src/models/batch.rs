use serde::Serialize;
use uuid::Uuid;

use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure {
    pub application_id: Uuid,
    pub code: &'static str,
    pub message: String,
}

impl ItemFailure {
    pub fn from_error(application_id: Uuid, err: &Error) -> Self {
        Self {
            application_id,
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Outcome of a batch in which every item is processed on its own.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary<T> {
    pub succeeded: Vec<T>,
    pub failed: Vec<ItemFailure>,
}

impl<T> BatchSummary<T> {
    pub fn new() -> Self {
        Self {
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn failure_for(&self, application_id: Uuid) -> Option<&ItemFailure> {
        self.failed
            .iter()
            .find(|failure| failure.application_id == application_id)
    }
}

impl<T> Default for BatchSummary<T> {
    fn default() -> Self {
        Self::new()
    }
}
