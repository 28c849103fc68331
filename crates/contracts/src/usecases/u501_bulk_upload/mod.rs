pub mod excel;
pub mod request;
pub mod response;
pub mod validation;

pub use excel::{ExcelRow, UploadedImage};
pub use request::CommitRequest;
pub use response::{BulkUploadResult, ImageUploadResponse, TemplateData, ValidateResponse};
pub use validation::{DuplicateProduct, ValidatedProduct, ValidationError, ValidationResult};

use crate::usecases::common::UseCaseMetadata;

pub struct BulkUpload;

impl UseCaseMetadata for BulkUpload {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "bulk_upload"
    }

    fn display_name() -> &'static str {
        "Carga masiva de productos"
    }

    fn description() -> &'static str {
        "Validación de una planilla Excel de maquinaria y creación por lotes de los productos aceptados"
    }
}
