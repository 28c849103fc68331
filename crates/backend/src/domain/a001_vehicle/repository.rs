use chrono::Utc;
use contracts::domain::a001_vehicle::{NewVehicle, Vehicle, VehicleIdentity, VehicleStatus};
use contracts::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};

use sea_orm::entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Set};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "a001_vehicle")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub placa: String,
    pub marca: String,
    pub modelo: String,
    pub model_label: String,
    pub categoria: String,
    pub anio: i32,
    pub precio_dia: f64,
    pub precio_hora: Option<f64>,
    pub peso: Option<f64>,
    pub potencia: Option<f64>,
    pub capacidad: Option<String>,
    pub especificaciones: Option<String>,
    pub stock: i32,
    pub disponible: bool,
    pub descripcion: Option<String>,
    pub imagen_url: Option<String>,
    pub estado: String,
    pub owner_id: Option<i64>,
    pub created_by: Option<i64>,
    pub updated_by: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Vehicle {
    fn from(m: Model) -> Self {
        let estado = VehicleStatus::from_code(&m.estado)
            .unwrap_or_else(|| VehicleStatus::for_availability(m.disponible));

        Vehicle {
            id: m.id,
            placa: m.placa,
            marca: m.marca,
            modelo: m.modelo,
            model_label: m.model_label,
            categoria: m.categoria,
            anio: m.anio,
            precio_dia: m.precio_dia,
            precio_hora: m.precio_hora,
            peso: m.peso,
            potencia: m.potencia,
            capacidad: m.capacidad,
            especificaciones: m.especificaciones,
            stock: m.stock,
            disponible: m.disponible,
            descripcion: m.descripcion,
            imagen_url: m.imagen_url,
            estado,
            owner_id: m.owner_id,
            metadata: EntityMetadata {
                created_at: m.created_at,
                updated_at: m.updated_at,
                deleted_at: m.deleted_at,
                created_by: m.created_by,
                updated_by: m.updated_by,
            },
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct IdentityRow {
    id: i64,
    marca: String,
    modelo: String,
    categoria: String,
}

/// Business identity of every unit that is not soft-deleted
pub async fn list_identities<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<VehicleIdentity>> {
    let rows = Entity::find()
        .select_only()
        .column(Column::Id)
        .column(Column::Marca)
        .column(Column::Modelo)
        .column(Column::Categoria)
        .filter(Column::DeletedAt.is_null())
        .order_by_asc(Column::Id)
        .into_model::<IdentityRow>()
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|r| VehicleIdentity {
            id: r.id,
            marca: r.marca,
            modelo: r.modelo,
            categoria: r.categoria,
        })
        .collect())
}

pub async fn insert<C: ConnectionTrait>(db: &C, vehicle: &NewVehicle) -> anyhow::Result<Vehicle> {
    let now = Utc::now();
    let active = ActiveModel {
        id: sea_orm::ActiveValue::NotSet,
        placa: Set(vehicle.placa.clone()),
        marca: Set(vehicle.marca.clone()),
        modelo: Set(vehicle.modelo.clone()),
        model_label: Set(vehicle.model_label.clone()),
        categoria: Set(vehicle.categoria.clone()),
        anio: Set(vehicle.anio),
        precio_dia: Set(vehicle.precio_dia),
        precio_hora: Set(vehicle.precio_hora),
        peso: Set(vehicle.peso),
        potencia: Set(vehicle.potencia),
        capacidad: Set(vehicle.capacidad.clone()),
        especificaciones: Set(vehicle.especificaciones.clone()),
        stock: Set(vehicle.stock),
        disponible: Set(vehicle.disponible),
        descripcion: Set(vehicle.descripcion.clone()),
        imagen_url: Set(vehicle.imagen_url.clone()),
        estado: Set(vehicle.estado.as_str().to_string()),
        owner_id: Set(vehicle.owner_id),
        created_by: Set(vehicle.created_by),
        updated_by: Set(vehicle.created_by),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    let model = active.insert(db).await?;
    Ok(model.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::connect_in_memory;
    use sea_orm::sea_query::Expr;

    async fn load(db: &DatabaseConnection, id: i64) -> Vehicle {
        Entity::find_by_id(id).one(db).await.unwrap().unwrap().into()
    }

    async fn mark_deleted(db: &DatabaseConnection, id: i64) {
        Entity::update_many()
            .col_expr(Column::DeletedAt, Expr::value(Utc::now()))
            .filter(Column::Id.eq(id))
            .exec(db)
            .await
            .unwrap();
    }

    fn new_vehicle(placa: &str, label: &str) -> NewVehicle {
        NewVehicle {
            placa: placa.to_string(),
            marca: "CAT".to_string(),
            modelo: "320D".to_string(),
            model_label: label.to_string(),
            categoria: "Excavadora".to_string(),
            anio: 2020,
            precio_dia: 1500.0,
            precio_hora: Some(200.0),
            peso: Some(20.5),
            potencia: None,
            capacidad: Some("1.2 m³".to_string()),
            especificaciones: None,
            stock: 3,
            disponible: true,
            descripcion: None,
            imagen_url: None,
            estado: VehicleStatus::Disponible,
            owner_id: Some(1),
            created_by: Some(1),
        }
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = connect_in_memory().await.unwrap();
        let created = insert(&db, &new_vehicle("AUTO-1", "CAT-320D-1")).await.unwrap();
        assert!(created.id > 0);

        let loaded = load(&db, created.id).await;
        assert_eq!(loaded.placa, "AUTO-1");
        assert_eq!(loaded.modelo, "320D");
        assert_eq!(loaded.model_label, "CAT-320D-1");
        assert_eq!(loaded.estado, VehicleStatus::Disponible);
        assert_eq!(loaded.metadata.created_by, Some(1));
        assert!(!loaded.metadata.is_deleted());
    }

    #[tokio::test]
    async fn test_placa_is_unique_at_storage_level() {
        let db = connect_in_memory().await.unwrap();
        insert(&db, &new_vehicle("AUTO-1", "CAT-320D-1")).await.unwrap();
        let second = insert(&db, &new_vehicle("AUTO-1", "CAT-320D-2")).await;
        assert!(second.is_err());
    }

    #[tokio::test]
    async fn test_identities_skip_soft_deleted_units() {
        let db = connect_in_memory().await.unwrap();
        let kept = insert(&db, &new_vehicle("AUTO-1", "L-1")).await.unwrap();
        let removed = insert(&db, &new_vehicle("AUTO-2", "L-2")).await.unwrap();

        mark_deleted(&db, removed.id).await;

        let identities = list_identities(&db).await.unwrap();
        assert_eq!(
            identities,
            vec![VehicleIdentity {
                id: kept.id,
                marca: "CAT".to_string(),
                modelo: "320D".to_string(),
                categoria: "Excavadora".to_string(),
            }]
        );
        assert!(load(&db, removed.id).await.metadata.is_deleted());
    }
}
