use serde::{Deserialize, Serialize};

use super::{UploadedImage, ValidationError, ValidationResult};

/// Outcome of the image upload step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageUploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<UploadedImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageUploadResponse {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            images: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of the validate (preview) step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ValidationResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    pub fn ok(result: ValidationResult) -> Self {
        Self {
            success: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// Outcome of the commit step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkUploadResult {
    pub success: bool,
    pub created: usize,
    #[serde(rename = "duplicatesSkipped")]
    pub duplicates_skipped: usize,
    pub errors: usize,
    #[serde(rename = "createdIds")]
    pub created_ids: Vec<i64>,
    #[serde(
        rename = "errorDetails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub error_details: Option<Vec<ValidationError>>,
}

impl BulkUploadResult {
    /// Whole-call failure: nothing was read or written
    pub fn rejected(field: &str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            created: 0,
            duplicates_skipped: 0,
            errors: 1,
            created_ids: Vec::new(),
            error_details: Some(vec![ValidationError::new(0, field, message, None)]),
        }
    }
}

/// Spreadsheet template offered for download
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateData {
    pub headers: Vec<String>,
    pub examples: Vec<Vec<serde_json::Value>>,
    pub instructions: Vec<String>,
}
