//! Contract with the external service that synthesizes more rows for an
//! uploaded CSV.
//!
//! Transport is left to implementors of [`SynthesisService`]. Whatever goes
//! wrong along the way reaches the caller as one [`SynthesisError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::output::csv::{read_csv_rows, write_records_csv};

/// Body sent to the service: the uploaded data rows, header excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub columns: Vec<Vec<String>>,
    #[serde(rename = "addSamples")]
    pub add_samples: u64,
}

/// Body returned by the service: the new rows only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResponse {
    pub response: Vec<Vec<Value>>,
}

impl SynthesisResponse {
    /// Decode a raw response body.
    pub fn from_json(body: &str) -> Result<Self, SynthesisError> {
        serde_json::from_str(body).map_err(|err| SynthesisError::MalformedResponse(err.to_string()))
    }
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("could not parse uploaded CSV: {0}")]
    Upload(String),
    #[error("sample count must be a positive number")]
    InvalidSamples,
    #[error("synthesis service failed: {0}")]
    Service(String),
    #[error("synthesis service returned a malformed response: {0}")]
    MalformedResponse(String),
    #[error("could not encode CSV: {0}")]
    Encode(#[from] csv::Error),
}

/// A fallible remote dependency that returns extra rows for a table.
pub trait SynthesisService {
    fn increase(&self, request: &SynthesisRequest) -> Result<SynthesisResponse, SynthesisError>;
}

/// Append `add_samples` synthesized rows to an uploaded CSV.
///
/// The uploaded rows are kept as-is and the service rows follow them.
pub fn synthesize_csv(
    csv_text: &str,
    add_samples: u64,
    service: &dyn SynthesisService,
) -> Result<String, SynthesisError> {
    if add_samples == 0 {
        return Err(SynthesisError::InvalidSamples);
    }
    let mut rows = read_csv_rows(csv_text).map_err(|err| SynthesisError::Upload(err.to_string()))?;
    if rows.is_empty() {
        return Err(SynthesisError::Upload("file is empty".to_string()));
    }

    let request = SynthesisRequest {
        columns: rows[1..].to_vec(),
        add_samples,
    };
    info!(
        rows = request.columns.len(),
        add_samples, "requesting synthesized rows"
    );
    let response = service.increase(&request).inspect_err(|err| {
        warn!(error = %err, "synthesis request failed");
    })?;

    for (index, row) in response.response.into_iter().enumerate() {
        let row = row
            .into_iter()
            .map(cell_to_string)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                SynthesisError::MalformedResponse(format!("row {index} holds a nested value"))
            })?;
        rows.push(row);
    }

    let mut buffer = Vec::new();
    write_records_csv(&mut buffer, &rows)?;
    String::from_utf8(buffer).map_err(|err| SynthesisError::MalformedResponse(err.to_string()))
}

fn cell_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(value) => Some(value.to_string()),
        Value::Number(value) => Some(value.to_string()),
        Value::String(value) => Some(value),
        Value::Array(_) | Value::Object(_) => None,
    }
}
