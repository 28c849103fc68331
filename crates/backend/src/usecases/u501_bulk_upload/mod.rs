pub mod duplicates;
pub mod error;
pub mod executor;
pub mod images;
pub mod ports;
pub mod report;
pub mod row_rules;
pub mod spreadsheet;
pub mod storage_keys;
pub mod template;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::BulkUploadError;
pub use executor::{authorize, BulkUploadExecutor};
pub use images::{ImageRegistry, IncomingImage, LocalImageStorage};
pub use ports::{AuditLogSink, VehicleStore};
pub use spreadsheet::SpreadsheetUpload;
