pub mod aggregate;

pub use aggregate::{NewVehicle, Vehicle, VehicleIdentity, VehicleStatus};
