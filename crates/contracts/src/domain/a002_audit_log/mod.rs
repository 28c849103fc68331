pub mod aggregate;

pub use aggregate::{AuditAction, AuditContext, AuditEntry, AuditLogQuery};
