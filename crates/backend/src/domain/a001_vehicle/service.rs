use super::repository;
use contracts::domain::a001_vehicle::{NewVehicle, Vehicle, VehicleIdentity};
use sea_orm::ConnectionTrait;

pub const ENTITY_NAME: &str = "a001_vehicle";

pub async fn create<C: ConnectionTrait>(db: &C, vehicle: &NewVehicle) -> anyhow::Result<Vehicle> {
    vehicle
        .validate()
        .map_err(|e| anyhow::anyhow!("Validation failed: {}", e))?;
    repository::insert(db, vehicle).await
}

pub async fn list_identities<C: ConnectionTrait>(db: &C) -> anyhow::Result<Vec<VehicleIdentity>> {
    repository::list_identities(db).await
}
