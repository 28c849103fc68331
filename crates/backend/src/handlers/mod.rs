pub mod a002_audit_log;
pub mod u501_bulk_upload;
