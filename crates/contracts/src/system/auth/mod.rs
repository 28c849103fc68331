use serde::{Deserialize, Serialize};

/// Role name carried by administrator tokens
pub const ADMIN_ROLE: &str = "ADMINISTRADOR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // user_id
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at
}

impl TokenClaims {
    /// Role comparison is case-insensitive
    pub fn is_admin(&self) -> bool {
        self.rol
            .as_deref()
            .map(|r| r.trim().eq_ignore_ascii_case(ADMIN_ROLE))
            .unwrap_or(false)
    }

    /// Numeric user id, when the subject is one
    pub fn user_id(&self) -> Option<i64> {
        self.sub.trim().parse().ok()
    }
}
