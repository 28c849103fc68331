use chrono::Utc;
use contracts::domain::a002_audit_log::{AuditAction, AuditContext, AuditEntry, AuditLogQuery};
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};

const PROTECTED: &str = "[PROTECTED]";
const PROTECTED_FIELDS: [&str; 3] = ["password", "updated_at", "updatedAt"];
const DEFAULT_LIMIT: u64 = 50;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a002_audit_log")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tabla: String,
    pub registro_id: String,
    pub operacion: String,
    pub datos_anteriores: Option<String>,
    pub datos_nuevos: Option<String>,
    pub usuario_id: Option<i64>,
    pub usuario_email: Option<String>,
    pub comentario: Option<String>,
    pub fecha_cambio: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn parse_snapshot(raw: Option<String>) -> Option<serde_json::Value> {
    raw.and_then(|s| serde_json::from_str(&s).ok())
}

impl From<Model> for AuditEntry {
    fn from(m: Model) -> Self {
        AuditEntry {
            id: m.id,
            tabla: m.tabla,
            registro_id: m.registro_id,
            operacion: AuditAction::from_code(&m.operacion).unwrap_or(AuditAction::Update),
            datos_anteriores: parse_snapshot(m.datos_anteriores),
            datos_nuevos: parse_snapshot(m.datos_nuevos),
            usuario_id: m.usuario_id,
            usuario_email: m.usuario_email,
            comentario: m.comentario,
            fecha_cambio: m.fecha_cambio,
        }
    }
}

/// Copy of a record snapshot with sensitive and noisy fields masked
pub fn clean_snapshot(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut cleaned = map.clone();
            for field in PROTECTED_FIELDS {
                if cleaned.contains_key(field) {
                    cleaned.insert(
                        field.to_string(),
                        serde_json::Value::String(PROTECTED.to_string()),
                    );
                }
            }
            serde_json::Value::Object(cleaned)
        }
        other => other.clone(),
    }
}

/// Append one entry to the audit trail
pub async fn record<C: ConnectionTrait>(
    db: &C,
    tabla: &str,
    registro_id: &str,
    action: AuditAction,
    before: Option<&serde_json::Value>,
    after: Option<&serde_json::Value>,
    context: &AuditContext,
) -> anyhow::Result<i64> {
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        tabla: Set(tabla.to_string()),
        registro_id: Set(registro_id.to_string()),
        operacion: Set(action.as_str().to_string()),
        datos_anteriores: Set(before.map(|v| clean_snapshot(v).to_string())),
        datos_nuevos: Set(after.map(|v| clean_snapshot(v).to_string())),
        usuario_id: Set(context.user_id),
        usuario_email: Set(context.user_email.clone()),
        comentario: Set(context.comment.clone()),
        fecha_cambio: Set(Utc::now()),
    };
    let model = active.insert(db).await?;
    Ok(model.id)
}

/// Newest entries first, filtered by whatever the query sets
pub async fn list<C: ConnectionTrait>(
    db: &C,
    query: &AuditLogQuery,
) -> anyhow::Result<Vec<AuditEntry>> {
    let mut select = Entity::find();
    if let Some(tabla) = &query.tabla {
        select = select.filter(Column::Tabla.eq(tabla.clone()));
    }
    if let Some(registro_id) = &query.registro_id {
        select = select.filter(Column::RegistroId.eq(registro_id.clone()));
    }
    if let Some(usuario_id) = query.usuario_id {
        select = select.filter(Column::UsuarioId.eq(usuario_id));
    }
    if let Some(action) = query.operacion {
        select = select.filter(Column::Operacion.eq(action.as_str()));
    }

    let items = select
        .order_by_desc(Column::FechaCambio)
        .order_by_desc(Column::Id)
        .limit(query.limit.unwrap_or(DEFAULT_LIMIT))
        .offset(query.offset.unwrap_or(0))
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}
