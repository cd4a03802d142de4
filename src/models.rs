use serde::{Deserialize, Serialize};

/// Claims of a token minted by the external identity service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Display name, when the identity service provides one.
    #[serde(default)]
    pub name: Option<String>,
    /// Profile: ADMIN, ROOT or FUN.
    pub role: String,
    pub exp: usize,
}
