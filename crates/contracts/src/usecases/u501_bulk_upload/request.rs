use serde::{Deserialize, Serialize};

use super::ValidatedProduct;

/// Confirmation of a previewed upload: the exact `toCreate` snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRequest {
    pub products: Vec<ValidatedProduct>,
}
