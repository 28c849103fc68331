use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CREATE" => Some(AuditAction::Create),
            "UPDATE" => Some(AuditAction::Update),
            "DELETE" => Some(AuditAction::Delete),
            _ => None,
        }
    }
}

/// Who performed a change and why.
///
/// Passed explicitly into every operation that writes audit records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditContext {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    #[serde(rename = "userEmail")]
    pub user_email: Option<String>,
    pub comment: Option<String>,
}

impl AuditContext {
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// One row of the audit trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub tabla: String,
    #[serde(rename = "registroId")]
    pub registro_id: String,
    pub operacion: AuditAction,
    #[serde(rename = "datosAnteriores")]
    pub datos_anteriores: Option<serde_json::Value>,
    #[serde(rename = "datosNuevos")]
    pub datos_nuevos: Option<serde_json::Value>,
    #[serde(rename = "usuarioId")]
    pub usuario_id: Option<i64>,
    #[serde(rename = "usuarioEmail")]
    pub usuario_email: Option<String>,
    pub comentario: Option<String>,
    #[serde(rename = "fechaCambio")]
    pub fecha_cambio: chrono::DateTime<chrono::Utc>,
}

/// Filters for listing the audit trail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditLogQuery {
    pub tabla: Option<String>,
    pub registro_id: Option<String>,
    pub usuario_id: Option<i64>,
    pub operacion: Option<AuditAction>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}
