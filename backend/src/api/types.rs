//! REST API types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{ConvertError, CsvResult, PipelineError, ServerError};
use crate::transform::mapping::{MappingConfig, MappingPreset};
use crate::transform::pipeline::{Conversion, OUTPUT_FILE_NAME, OUTPUT_MIME};
use crate::validation::OptionalColumnWarning;

/// Response sent after a successful conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    pub job_id: String,

    /// "ready" or "warning"
    pub status: String,

    pub mapping: String,

    /// Suggested download name
    pub file_name: String,

    pub mime_type: String,

    /// Target header, duplicates included
    pub header: Vec<String>,

    /// First converted rows
    pub preview: Vec<Vec<String>>,

    /// The converted CSV
    pub csv: String,

    pub metadata: ResponseMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub row_count: usize,
    pub csv_info: CsvMetadata,
    pub warning: Option<WarningInfo>,
    pub renamed_headers: Vec<RenamedHeader>,
}

/// Input file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvMetadata {
    pub encoding: String,
    pub delimiter: String,
    pub row_count: usize,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningInfo {
    pub message: String,
    pub missing_columns: Vec<String>,
    pub blank_targets: Vec<String>,
}

impl From<&OptionalColumnWarning> for WarningInfo {
    fn from(w: &OptionalColumnWarning) -> Self {
        Self {
            message: w.to_string(),
            missing_columns: w.missing_columns.clone(),
            blank_targets: w.blank_targets.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenamedHeader {
    pub from: String,
    pub to: String,
}

impl ConvertResponse {
    pub fn build(conversion: &Conversion, preview_rows: usize) -> CsvResult<Self> {
        let bytes = conversion.to_csv_bytes()?;
        let warning = conversion.report.warning.as_ref().map(WarningInfo::from);

        Ok(Self {
            job_id: Uuid::new_v4().to_string(),
            status: if warning.is_some() { "warning" } else { "ready" }.to_string(),
            mapping: conversion.mapping.clone(),
            file_name: OUTPUT_FILE_NAME.to_string(),
            mime_type: OUTPUT_MIME.to_string(),
            header: conversion.table.header.clone(),
            preview: conversion.preview(preview_rows),
            csv: String::from_utf8_lossy(&bytes).into_owned(),
            metadata: ResponseMetadata {
                row_count: conversion.table.len(),
                csv_info: CsvMetadata {
                    encoding: conversion.csv_info.encoding.clone(),
                    delimiter: conversion.csv_info.delimiter.to_string(),
                    row_count: conversion.csv_info.row_count,
                    columns: conversion.csv_info.headers.clone(),
                },
                warning,
                renamed_headers: conversion
                    .report
                    .renamed_headers
                    .iter()
                    .map(|(from, to)| RenamedHeader {
                        from: from.clone(),
                        to: to.clone(),
                    })
                    .collect(),
            },
        })
    }
}

/// One entry of `GET /api/mappings`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingSummary {
    pub id: &'static str,
    pub description: String,
    pub required_columns: Vec<String>,
    pub optional_columns: Vec<String>,
    pub target_columns: Vec<String>,
}

impl MappingSummary {
    pub fn new(preset: MappingPreset) -> Self {
        let MappingConfig {
            description,
            required_columns,
            optional_columns,
            columns,
            ..
        } = preset.config();

        Self {
            id: preset.id(),
            description,
            required_columns,
            optional_columns,
            target_columns: columns.into_iter().map(|c| c.name).collect(),
        }
    }
}

/// Create an error response body
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "preview": [],
    })
}

/// Create an error response body naming missing required columns
fn schema_error_response(error: &str, missing: &[String]) -> Value {
    let mut body = error_response(error);
    body["missingColumns"] = json!(missing);
    body
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Csv(_)) => StatusCode::BAD_REQUEST,
            ServerError::Pipeline(PipelineError::Convert(ConvertError::NotRun { .. })) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ServerError::Pipeline(PipelineError::Convert(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let body = match &self {
            ServerError::Pipeline(PipelineError::Convert(ConvertError::SchemaValidation { missing })) => {
                schema_error_response(&message, missing)
            }
            _ => error_response(&message),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::pipeline::{convert_bytes, ConvertOptions};

    #[test]
    fn test_response_from_conversion() {
        let csv = "first_name,last_name\nJane,Doe\nJohn,Roe\n";
        let options = ConvertOptions {
            preset: MappingPreset::RechatBasic,
            ..ConvertOptions::default()
        };
        let conversion = convert_bytes(csv.as_bytes(), &options).unwrap();
        let response = ConvertResponse::build(&conversion, 1).unwrap();

        assert_eq!(response.status, "warning");
        assert_eq!(response.file_name, "converted_file.csv");
        assert_eq!(response.preview.len(), 1);
        assert_eq!(response.preview[0][2], "Jane Doe");
        assert_eq!(response.metadata.row_count, 2);
        assert!(response.csv.starts_with("First Name,Last Name,Marketing Name"));

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["metadata"]["csvInfo"]["columns"].is_array());
    }

    #[test]
    fn test_error_status_codes() {
        let schema = ServerError::Pipeline(PipelineError::Convert(ConvertError::SchemaValidation {
            missing: vec!["first_name".into()],
        }));
        assert_eq!(schema.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ServerError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        let not_run = ServerError::Pipeline(PipelineError::Convert(ConvertError::NotRun {
            stage: "idle",
        }));
        assert_eq!(not_run.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_mapping_summary() {
        let summary = MappingSummary::new(MappingPreset::Rechat);
        assert_eq!(summary.id, "rechat");
        assert_eq!(summary.target_columns.iter().filter(|c| *c == "Tag").count(), 2);
    }

    #[test]
    fn test_error_response_shape() {
        let body = schema_error_response("missing", &["zip_code".to_string()]);
        assert_eq!(body["status"], "error");
        assert_eq!(body["missingColumns"][0], "zip_code");
    }
}
