use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use contracts::usecases::u501_bulk_upload::ExcelRow;

use super::duplicates::normalize_text;
use super::error::BulkUploadError;
use crate::shared::config::BulkUploadConfig;

pub const PREFERRED_SHEET: &str = "Productos";

pub const REQUIRED_COLUMNS: [&str; 8] = [
    "nombre",
    "marca",
    "modelo",
    "categoria",
    "anio",
    "precio_dia",
    "stock",
    "disponible",
];

pub const OPTIONAL_COLUMNS: [&str; 9] = [
    "precio_hora",
    "precio_semana",
    "precio_mes",
    "peso",
    "potencia",
    "capacidad",
    "especificaciones",
    "descripcion",
    "imagen",
];

const EXCEL_MIME_TYPES: [&str; 2] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
];

/// Spreadsheet as received from the operator
#[derive(Debug, Clone)]
pub struct SpreadsheetUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Type and size checks that run before the workbook is opened
pub fn check_file(
    upload: &SpreadsheetUpload,
    limits: &BulkUploadConfig,
) -> Result<(), BulkUploadError> {
    let mime_ok = upload
        .content_type
        .as_deref()
        .map(|ct| EXCEL_MIME_TYPES.contains(&ct))
        .unwrap_or(false);
    let name = upload.file_name.to_lowercase();
    let extension_ok = name.ends_with(".xlsx") || name.ends_with(".xls");
    if !mime_ok && !extension_ok {
        return Err(BulkUploadError::InvalidFileType);
    }

    if upload.bytes.len() as u64 > limits.max_excel_bytes {
        return Err(BulkUploadError::FileTooLarge {
            max_mb: limits.max_excel_bytes / (1024 * 1024),
        });
    }
    Ok(())
}

/// Position of every known column inside the header row
struct ColumnIndex(HashMap<&'static str, usize>);

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, BulkUploadError> {
        let mut index = HashMap::new();
        for column in REQUIRED_COLUMNS.iter().chain(OPTIONAL_COLUMNS.iter()) {
            if let Some(pos) = headers.iter().position(|h| h == column) {
                index.insert(*column, pos);
            }
        }

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !index.contains_key(*c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(BulkUploadError::MissingColumns(missing));
        }
        Ok(Self(index))
    }

    fn cell<'a>(&self, row: &'a [Data], column: &str) -> Option<&'a Data> {
        self.0.get(column).and_then(|pos| row.get(*pos))
    }
}

/// Read the product sheet into typed rows.
///
/// Blank rows are skipped but keep their physical numbering. The row cap is
/// applied to non-blank rows before any cell is coerced.
pub fn parse_workbook(bytes: Vec<u8>, max_rows: usize) -> Result<Vec<ExcelRow>, BulkUploadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| BulkUploadError::Unreadable(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .iter()
        .find(|name| name.as_str() == PREFERRED_SHEET)
        .or_else(|| sheet_names.first())
        .cloned()
        .ok_or(BulkUploadError::NoSheets)?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| BulkUploadError::Unreadable(e.to_string()))?;

    tracing::info!(
        "Reading sheet '{}' ({} sheets in workbook)",
        sheet_name,
        sheet_names.len()
    );

    rows_from_range(&range, max_rows)
}

fn rows_from_range(range: &Range<Data>, max_rows: usize) -> Result<Vec<ExcelRow>, BulkUploadError> {
    let mut rows = range.rows();
    let header_row = rows.next().ok_or(BulkUploadError::NoProducts)?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| normalize_text(&cell_text(cell).unwrap_or_default()))
        .collect();
    let columns = ColumnIndex::resolve(&headers)?;

    // Physical number of the header row
    let first_row = range.start().map(|(row, _)| row + 1).unwrap_or(1);

    let data: Vec<(u32, &[Data])> = rows
        .enumerate()
        .map(|(i, cells)| (first_row + i as u32 + 1, cells))
        .filter(|(_, cells)| !is_blank_row(cells))
        .collect();

    if data.len() > max_rows {
        return Err(BulkUploadError::TooManyRows {
            found: data.len(),
            max: max_rows,
        });
    }
    if data.is_empty() {
        return Err(BulkUploadError::NoProducts);
    }

    Ok(data
        .into_iter()
        .map(|(row_number, cells)| typed_row(row_number, cells, &columns))
        .collect())
}

fn typed_row(row_number: u32, cells: &[Data], columns: &ColumnIndex) -> ExcelRow {
    let text = |c: &str| columns.cell(cells, c).and_then(cell_text);
    let int = |c: &str| columns.cell(cells, c).and_then(cell_int);
    let float = |c: &str| columns.cell(cells, c).and_then(cell_float);

    ExcelRow {
        row_number,
        nombre: text("nombre"),
        marca: text("marca"),
        modelo: text("modelo"),
        categoria: text("categoria"),
        anio: int("anio"),
        precio_dia: float("precio_dia"),
        precio_hora: float("precio_hora"),
        precio_semana: float("precio_semana"),
        precio_mes: float("precio_mes"),
        peso: float("peso"),
        potencia: float("potencia"),
        capacidad: text("capacidad"),
        especificaciones: text("especificaciones"),
        stock: int("stock"),
        disponible: columns.cell(cells, "disponible").and_then(cell_bool),
        descripcion: text("descripcion"),
        imagen: text("imagen"),
    }
}

fn is_blank_row(cells: &[Data]) -> bool {
    cells.iter().all(|cell| cell_text(cell).is_none())
}

/// Trimmed text of a cell; `None` when the cell is empty or whitespace
fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Integer value; fractional numbers are truncated toward zero
fn cell_int(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) if f.is_finite() => Some(f.trunc() as i64),
        Data::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| parse_decimal(s).map(|f| f.trunc() as i64))
        }
        _ => None,
    }
}

fn cell_float(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) if f.is_finite() => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_decimal(s.trim()),
        _ => None,
    }
}

/// Accepts a decimal comma ("20,5")
fn parse_decimal(s: &str) -> Option<f64> {
    s.replace(',', ".").parse::<f64>().ok().filter(|f| f.is_finite())
}

fn cell_bool(cell: &Data) -> Option<bool> {
    match cell {
        Data::Bool(b) => Some(*b),
        other => cell_text(other).map(|t| t.to_uppercase() == "TRUE"),
    }
}
