use serde::{Deserialize, Serialize};

/// Image previously accepted by the image registry in the current session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedImage {
    #[serde(rename = "fileName")]
    pub file_name: String,
    pub url: String,
    pub size: u64,
}

/// One non-blank spreadsheet data row, coerced to typed cells.
///
/// `row_number` is the physical 1-based row (the header is row 1).
/// Blank or unparsable cells are `None`; required-ness is checked later.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExcelRow {
    #[serde(rename = "rowNumber")]
    pub row_number: u32,
    pub nombre: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub categoria: Option<String>,
    pub anio: Option<i64>,
    pub precio_dia: Option<f64>,
    pub precio_hora: Option<f64>,
    pub precio_semana: Option<f64>,
    pub precio_mes: Option<f64>,
    pub peso: Option<f64>,
    pub potencia: Option<f64>,
    pub capacidad: Option<String>,
    pub especificaciones: Option<String>,
    pub stock: Option<i64>,
    pub disponible: Option<bool>,
    pub descripcion: Option<String>,
    pub imagen: Option<String>,
}
