use serde::{Deserialize, Serialize};

/// Row that passed every rule and is not a duplicate; ready to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedProduct {
    #[serde(rename = "rowNumber")]
    pub row_number: u32,
    pub nombre: String,
    pub marca: String,
    pub modelo: String,
    pub categoria: String,
    pub anio: i32,
    pub precio_dia: f64,
    pub precio_hora: Option<f64>,
    pub precio_semana: Option<f64>,
    pub precio_mes: Option<f64>,
    pub peso: Option<f64>,
    pub potencia: Option<f64>,
    pub capacidad: Option<String>,
    pub especificaciones: Option<String>,
    pub stock: i32,
    pub disponible: bool,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
    #[serde(rename = "imagenUrl")]
    pub imagen_url: Option<String>,
}

/// Row whose identity key already exists in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateProduct {
    #[serde(rename = "rowNumber")]
    pub row_number: u32,
    pub nombre: String,
    pub categoria: String,
    #[serde(rename = "existingId")]
    pub existing_id: i64,
}

/// One rule violation of one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "rowNumber")]
    pub row_number: u32,
    pub field: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(
        row_number: u32,
        field: impl Into<String>,
        message: impl Into<String>,
        value: Option<String>,
    ) -> Self {
        Self {
            row_number,
            field: field.into(),
            message: message.into(),
            value,
        }
    }
}

/// Three-way partition of the non-blank rows of one spreadsheet.
///
/// Every row lands in exactly one collection (a row may contribute several
/// entries to `errors`). Each collection keeps spreadsheet order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    #[serde(rename = "toCreate")]
    pub to_create: Vec<ValidatedProduct>,
    pub duplicates: Vec<DuplicateProduct>,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Number of distinct rows reported in `errors`
    pub fn error_row_count(&self) -> usize {
        let mut rows: Vec<u32> = self.errors.iter().map(|e| e.row_number).collect();
        rows.dedup();
        rows.len()
    }

    /// Number of rows accounted for across the partition
    pub fn row_count(&self) -> usize {
        self.to_create.len() + self.duplicates.len() + self.error_row_count()
    }
}
