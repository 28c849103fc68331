use crate::domain::common::EntityMetadata;
use serde::{Deserialize, Serialize};

// ============================================================================
// Status
// ============================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Disponible,
    Ocupado,
    EnMantenimiento,
    FueraServicio,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Disponible => "DISPONIBLE",
            VehicleStatus::Ocupado => "OCUPADO",
            VehicleStatus::EnMantenimiento => "EN_MANTENIMIENTO",
            VehicleStatus::FueraServicio => "FUERA_SERVICIO",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DISPONIBLE" => Some(VehicleStatus::Disponible),
            "OCUPADO" => Some(VehicleStatus::Ocupado),
            "EN_MANTENIMIENTO" => Some(VehicleStatus::EnMantenimiento),
            "FUERA_SERVICIO" => Some(VehicleStatus::FueraServicio),
            _ => None,
        }
    }

    /// Initial status of a freshly catalogued unit
    pub fn for_availability(disponible: bool) -> Self {
        if disponible {
            VehicleStatus::Disponible
        } else {
            VehicleStatus::FueraServicio
        }
    }
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// Persisted catalog unit (one rentable machine)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    /// Storage-unique plate, machine generated for bulk-loaded units
    pub placa: String,
    pub marca: String,
    /// Business model as typed by the operator (part of the identity key)
    pub modelo: String,
    /// Storage-unique model label, never used for duplicate detection
    #[serde(rename = "modelLabel")]
    pub model_label: String,
    pub categoria: String,
    pub anio: i32,
    #[serde(rename = "precioDia")]
    pub precio_dia: f64,
    #[serde(rename = "precioHora")]
    pub precio_hora: Option<f64>,
    pub peso: Option<f64>,
    pub potencia: Option<f64>,
    pub capacidad: Option<String>,
    pub especificaciones: Option<String>,
    pub stock: i32,
    pub disponible: bool,
    pub descripcion: Option<String>,
    #[serde(rename = "imagenUrl")]
    pub imagen_url: Option<String>,
    pub estado: VehicleStatus,
    #[serde(rename = "ownerId")]
    pub owner_id: Option<i64>,
    #[serde(flatten)]
    pub metadata: EntityMetadata,
}

/// Values for inserting a new catalog unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub placa: String,
    pub marca: String,
    pub modelo: String,
    #[serde(rename = "modelLabel")]
    pub model_label: String,
    pub categoria: String,
    pub anio: i32,
    #[serde(rename = "precioDia")]
    pub precio_dia: f64,
    #[serde(rename = "precioHora")]
    pub precio_hora: Option<f64>,
    pub peso: Option<f64>,
    pub potencia: Option<f64>,
    pub capacidad: Option<String>,
    pub especificaciones: Option<String>,
    pub stock: i32,
    pub disponible: bool,
    pub descripcion: Option<String>,
    #[serde(rename = "imagenUrl")]
    pub imagen_url: Option<String>,
    pub estado: VehicleStatus,
    #[serde(rename = "ownerId")]
    pub owner_id: Option<i64>,
    #[serde(rename = "createdBy")]
    pub created_by: Option<i64>,
}

impl NewVehicle {
    pub fn validate(&self) -> Result<(), String> {
        if self.placa.trim().is_empty() {
            return Err("La placa no puede estar vacía".into());
        }
        if self.model_label.trim().is_empty() {
            return Err("La etiqueta de modelo no puede estar vacía".into());
        }
        if self.precio_dia <= 0.0 {
            return Err("El precio por día debe ser mayor a 0".into());
        }
        if self.stock < 0 {
            return Err("El stock no puede ser negativo".into());
        }
        Ok(())
    }
}

/// Business identity of a persisted unit, used for duplicate detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleIdentity {
    pub id: i64,
    pub marca: String,
    pub modelo: String,
    pub categoria: String,
}
