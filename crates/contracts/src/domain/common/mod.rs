//! Common types for all aggregates

pub mod entity_metadata;

// Re-exports
pub use entity_metadata::EntityMetadata;
