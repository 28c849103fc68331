use async_trait::async_trait;
use contracts::domain::a001_vehicle::{NewVehicle, Vehicle, VehicleIdentity};
use contracts::domain::a002_audit_log::{AuditAction, AuditContext};
use sea_orm::DatabaseConnection;

use crate::domain::{a001_vehicle, a002_audit_log};

/// Catalog storage used by the pipeline
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Identity of every unit that is not soft-deleted
    async fn list_identities(&self) -> anyhow::Result<Vec<VehicleIdentity>>;

    /// Persist one unit on its own; nothing is shared with other rows
    async fn create(&self, vehicle: &NewVehicle) -> anyhow::Result<Vehicle>;
}

/// Best-effort audit trail
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record_create(
        &self,
        entity: &str,
        id: i64,
        snapshot: &serde_json::Value,
        comment: &str,
        context: &AuditContext,
    ) -> anyhow::Result<()>;
}

/// Where accepted image bytes end up
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Store `bytes` under `key` and return the public URL
    async fn store(&self, key: &str, bytes: &[u8]) -> anyhow::Result<String>;
}

/// `ProductStore` backed by the a001 repository
pub struct VehicleStore {
    db: DatabaseConnection,
}

impl VehicleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductStore for VehicleStore {
    async fn list_identities(&self) -> anyhow::Result<Vec<VehicleIdentity>> {
        a001_vehicle::service::list_identities(&self.db).await
    }

    async fn create(&self, vehicle: &NewVehicle) -> anyhow::Result<Vehicle> {
        a001_vehicle::service::create(&self.db, vehicle).await
    }
}

/// `AuditSink` backed by the a002 repository
pub struct AuditLogSink {
    db: DatabaseConnection,
}

impl AuditLogSink {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AuditSink for AuditLogSink {
    async fn record_create(
        &self,
        entity: &str,
        id: i64,
        snapshot: &serde_json::Value,
        comment: &str,
        context: &AuditContext,
    ) -> anyhow::Result<()> {
        let context = context.clone().with_comment(comment);
        a002_audit_log::repository::record(
            &self.db,
            entity,
            &id.to_string(),
            AuditAction::Create,
            None,
            Some(snapshot),
            &context,
        )
        .await?;
        Ok(())
    }
}
