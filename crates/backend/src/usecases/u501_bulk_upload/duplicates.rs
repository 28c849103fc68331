use std::collections::{HashMap, HashSet};

use contracts::domain::a001_vehicle::VehicleIdentity;

/// Lowercase, trim and collapse whitespace runs
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Business identity of a product: marca|modelo|categoria, normalized.
/// Unrelated to the storage keys (placa, model label).
pub fn identity_key(marca: &str, modelo: &str, categoria: &str) -> String {
    format!(
        "{}|{}|{}",
        normalize_text(marca),
        normalize_text(modelo),
        normalize_text(categoria)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateCheck {
    /// Key belongs to a persisted product
    Existing(i64),
    /// Key was accepted earlier in the same spreadsheet
    RepeatedInFile,
    Unique,
}

/// Duplicate detection state for one validate call
pub struct DuplicateResolver {
    existing: HashMap<String, i64>,
    seen_in_file: HashSet<String>,
}

impl DuplicateResolver {
    pub fn new(identities: &[VehicleIdentity]) -> Self {
        let existing = identities
            .iter()
            .map(|p| (identity_key(&p.marca, &p.modelo, &p.categoria), p.id))
            .collect();
        Self {
            existing,
            seen_in_file: HashSet::new(),
        }
    }

    /// Database first, then the file. Unique keys are remembered.
    pub fn check(&mut self, marca: &str, modelo: &str, categoria: &str) -> DuplicateCheck {
        let key = identity_key(marca, modelo, categoria);
        if let Some(id) = self.existing.get(&key) {
            return DuplicateCheck::Existing(*id);
        }
        if !self.seen_in_file.insert(key) {
            return DuplicateCheck::RepeatedInFile;
        }
        DuplicateCheck::Unique
    }
}
