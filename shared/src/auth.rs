// ============================================================================
// Bearer token verification
// ============================================================================
//
// HS256 JWTs with a required issuer and audience. The ingress service only
// verifies tokens; `issue` exists for local tooling and tests.
//
// ============================================================================

use chatline_config::AuthConfig;
use chatline_error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims read back from a verified token.
///
/// `iss` and `aud` are checked by the decoder against the raw claims, so
/// `aud` may be a string or an array and `iat` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    pub exp: i64,
}

/// Verified claims attached to a request by the auth middleware
#[derive(Debug, Clone)]
pub struct AuthenticatedClaims(pub Claims);

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,
    #[error("Authorization header must use the Bearer scheme")]
    InvalidScheme,
    #[error("empty bearer token")]
    EmptyToken,
    #[error("invalid token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err.to_string())
    }
}

pub struct TokenVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.jwt_issuer]);
        validation.set_audience(&[&config.jwt_audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
        }
    }

    /// Verify the value of an `Authorization` header.
    ///
    /// The scheme is matched case-insensitively.
    pub fn verify_header(&self, header: Option<&str>) -> Result<Claims, AuthError> {
        let header = header.ok_or(AuthError::MissingHeader)?;
        let (scheme, token) = header.split_once(' ').ok_or(AuthError::InvalidScheme)?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return Err(AuthError::InvalidScheme);
        }
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::EmptyToken);
        }
        self.verify(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }

    /// Sign a token for `subject` valid for `ttl_secs` seconds.
    pub fn issue(&self, subject: &str, ttl_secs: i64) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iss: self.issuer.clone(),
            aud: serde_json::Value::String(self.audience.clone()),
            iat: Some(now),
            exp: now + ttl_secs,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }
}
