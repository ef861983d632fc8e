//! The `{status, message, age_distribution}` document returned to callers.

use serde::Serialize;

use crate::{distribution::AgeDistribution, error::IngestError, pipeline::IngestOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionResponse {
    pub status: Status,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age_distribution: Option<AgeDistribution>,
}

impl ConversionResponse {
    pub fn success(outcome: &IngestOutcome) -> Self {
        Self {
            status: Status::Success,
            message: format!(
                "CSV processing complete and {} age groups reported.",
                outcome.distribution.len()
            ),
            age_distribution: Some(outcome.distribution.clone()),
        }
    }

    /// Missing input files get their own message; everything else is a
    /// processing failure.
    pub fn failure(err: &IngestError) -> Self {
        let message = if err.is_not_found() {
            format!("File Not Found: {err}")
        } else {
            format!("Processing failed: {err}")
        };
        Self {
            status: Status::Error,
            message,
            age_distribution: None,
        }
    }

    pub fn from_result(result: &Result<IngestOutcome, IngestError>) -> Self {
        match result {
            Ok(outcome) => Self::success(outcome),
            Err(err) => Self::failure(err),
        }
    }
}
