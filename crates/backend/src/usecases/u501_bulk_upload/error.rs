use thiserror::Error;

/// Whole-call failures of the bulk upload. Nothing row-scoped ends up here.
#[derive(Debug, Error)]
pub enum BulkUploadError {
    #[error("No se recibió el archivo Excel")]
    MissingFile,

    #[error("El archivo debe ser Excel (.xlsx o .xls)")]
    InvalidFileType,

    #[error("El archivo Excel no puede exceder {max_mb}MB")]
    FileTooLarge { max_mb: u64 },

    #[error("El archivo no contiene hojas de datos")]
    NoSheets,

    #[error("Formato inválido. Columnas requeridas faltantes: {}. Descarga la plantilla oficial.", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("El archivo no contiene productos para procesar")]
    NoProducts,

    #[error("El archivo contiene {found} productos. Máximo {max} productos por archivo")]
    TooManyRows { found: usize, max: usize },

    #[error("No se pudo leer el archivo Excel: {0}")]
    Unreadable(String),

    #[error("No se pudieron cargar los productos existentes: {0}")]
    Store(#[source] anyhow::Error),
}
