use axum::{extract::Query, Json};
use contracts::domain::a002_audit_log::{AuditEntry, AuditLogQuery};

use crate::domain::a002_audit_log::repository;
use crate::shared::data::db::get_connection;

/// GET /api/a002/audit-log
pub async fn list(
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditEntry>>, axum::http::StatusCode> {
    match repository::list(get_connection(), &query).await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            tracing::error!("Failed to list audit log: {}", e);
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
