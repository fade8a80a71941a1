//! Middleware for protecting authenticated routes and handling authorization.
//!
//! `jwt_auth` validates the bearer token and stores its `Claims` in the
//! request extensions. `admin_auth` must run after it. Every rejection has the
//! same body, `{"message":"Unauthorized"}`; the reason is only logged.

use crate::api::common::{ApiError, service_error_to_http};
use crate::database::models::Role;
use crate::errors::{ServiceError, ServiceResult};
use crate::utils::jwt::{Claims, JwtUtils};
use axum::{
    extract::{Extension, Request},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Pulls the token out of `Authorization: Bearer <token>`.
fn bearer_token(request: &Request) -> ServiceResult<&str> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ServiceError::unauthorized("Missing Authorization header"))?
        .to_str()
        .map_err(|_| ServiceError::unauthorized("Authorization header is not valid ASCII"))?;

    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(ServiceError::unauthorized(
            "Authorization header is not a bearer token",
        )),
    }
}

/// JWT authentication middleware
pub async fn jwt_auth(
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = bearer_token(&request)
        .and_then(|token| jwt_utils.validate_token(token))
        .map_err(service_error_to_http)?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Optional JWT authentication middleware (doesn't fail if no token)
///
/// Always inserts an `Option<Claims>`; an invalid token counts as anonymous.
pub async fn optional_jwt_auth(
    Extension(jwt_utils): Extension<Arc<JwtUtils>>,
    mut request: Request,
    next: Next,
) -> Response {
    let claims = if request.headers().contains_key(AUTHORIZATION) {
        match bearer_token(&request).and_then(|token| jwt_utils.validate_token(token)) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Ignoring optional credentials: {}", e);
                None
            }
        }
    } else {
        None
    };

    request.extensions_mut().insert(claims);
    next.run(request).await
}

/// Checks that an identity is present and carries one of `allowed`.
///
/// # Errors
/// - `Unauthorized` when there is no identity
/// - `PermissionDenied` when the role is not allowed
pub fn ensure_role(claims: Option<&Claims>, allowed: &[Role]) -> ServiceResult<()> {
    let claims = claims.ok_or_else(|| ServiceError::unauthorized("No authenticated identity"))?;

    if !claims.has_any_role(allowed) {
        tracing::warn!(
            "User {} with role {} denied, requires one of {:?}",
            claims.sub,
            claims.role,
            allowed
        );
        return Err(ServiceError::permission_denied("Forbidden"));
    }
    Ok(())
}

/// Admin role authorization middleware
pub async fn admin_auth(request: Request, next: Next) -> Result<Response, ApiError> {
    ensure_role(request.extensions().get::<Claims>(), &[Role::Admin])
        .map_err(service_error_to_http)?;

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> Claims {
        Claims {
            sub: 1,
            email: "someone@example.com".into(),
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_role_gate_without_identity_is_unauthorized() {
        assert!(matches!(
            ensure_role(None, &[Role::Admin]),
            Err(ServiceError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_role_gate_wrong_role_is_forbidden() {
        assert!(matches!(
            ensure_role(Some(&claims(Role::User)), &[Role::Admin]),
            Err(ServiceError::PermissionDenied { .. })
        ));
        assert!(ensure_role(Some(&claims(Role::Admin)), &[Role::Admin]).is_ok());
        assert!(ensure_role(Some(&claims(Role::User)), &[Role::User, Role::Admin]).is_ok());
    }

    #[test]
    fn test_bearer_token_parsing() {
        let request = Request::builder()
            .header(AUTHORIZATION, "Bearer abc.def.ghi")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(bearer_token(&request).unwrap(), "abc.def.ghi");

        let basic = Request::builder()
            .header(AUTHORIZATION, "Basic dXNlcjpwYXNz")
            .body(axum::body::Body::empty())
            .unwrap();
        assert!(bearer_token(&basic).is_err());

        let missing = Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        assert!(bearer_token(&missing).is_err());
    }
}
