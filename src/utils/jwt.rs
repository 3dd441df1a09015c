//! Utilidades JWT
//!
//! El token lleva el rol y las sedes autorizadas del llamador; de ahí sale el
//! `SiteScope` que filtra toda consulta y escritura.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::SiteScope;
use crate::utils::errors::AppError;

/// Rol con acceso a todas las sedes
pub const SUPER_ADMIN_ROLE: &str = "SUPER_ADMIN";

/// Claims del JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteClaims {
    pub sub: String,
    pub role: String,
    #[serde(default)]
    pub sites: Vec<Uuid>,
    pub exp: usize,
    pub iat: usize,
}

impl SiteClaims {
    pub fn scope(&self) -> SiteScope {
        if self.role == SUPER_ADMIN_ROLE {
            SiteScope::All
        } else {
            SiteScope::sites(self.sites.iter().copied())
        }
    }
}

/// Generar JWT token
pub fn generate_token(
    subject: &str,
    role: &str,
    sites: Vec<Uuid>,
    ttl_seconds: i64,
    secret: &str,
) -> Result<String, AppError> {
    let now = chrono::Utc::now();
    let claims = SiteClaims {
        sub: subject.to_string(),
        role: role.to_string(),
        sites,
        exp: (now + chrono::Duration::seconds(ttl_seconds)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("Error generando token: {}", e)))
}

/// Verificar y decodificar JWT token
pub fn verify_token(token: &str, secret: &str) -> Result<SiteClaims, AppError> {
    decode::<SiteClaims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Token inválido: {}", e)))
}
