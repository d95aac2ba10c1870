// ============================================================================
// Auth Configuration
// ============================================================================

use crate::constants::{DEFAULT_JWT_AUDIENCE, DEFAULT_JWT_ISSUER, DEFAULT_JWT_SECRET};
use crate::env_string;

/// Bearer token verification settings (HS256)
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
}

impl AuthConfig {
    pub(crate) fn from_env() -> Self {
        Self {
            jwt_secret: env_string("JWT_SECRET", DEFAULT_JWT_SECRET),
            jwt_issuer: env_string("JWT_ISSUER", DEFAULT_JWT_ISSUER),
            jwt_audience: env_string("JWT_AUDIENCE", DEFAULT_JWT_AUDIENCE),
        }
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

// Keep the secret out of debug output
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"***")
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .finish()
    }
}
