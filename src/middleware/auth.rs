//! Middleware de autenticación JWT
//!
//! Extrae el token Bearer, lo verifica y deja el `SiteScope` del llamador en
//! las extensions de la request.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use tracing::debug;

use crate::{state::AppState, utils::errors::AppError, utils::jwt::verify_token};

pub async fn site_scope_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_str| auth_str.to_str().ok())
        .and_then(|auth_str| auth_str.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Token de autorización requerido".to_string()))?;

    let claims = verify_token(token, &state.config.jwt_secret)?;
    debug!("🔐 {} ({}) autenticado", claims.sub, claims.role);

    request.extensions_mut().insert(claims.scope());
    Ok(next.run(request).await)
}
