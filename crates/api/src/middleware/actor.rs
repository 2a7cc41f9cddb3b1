//! Actor context extraction from gateway headers.
//!
//! Authentication lives upstream; the gateway forwards the resolved
//! caller as headers. This service only trusts the role it is given
//! and dispatches on it with a closed enum.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::Response,
};
use uuid::Uuid;

use almoner_core::role::ActorRole;
use almoner_shared::AppError;

use crate::routes::error_response;

/// Header carrying the caller's user id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
/// Header carrying the caller's role.
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
/// Optional header carrying the caller's facility unit.
pub const ACTOR_UNIT_HEADER: &str = "x-actor-unit";

/// The resolved caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct ActorContext {
    /// The caller's user id.
    pub user_id: Uuid,
    /// The caller's role.
    pub role: ActorRole,
    /// The caller's facility unit, used to scope queue queries.
    pub unit_id: Option<Uuid>,
}

fn missing(header: &str) -> Response {
    let err = AppError::Unauthorized(format!("Header {header} is required"));
    error_response(err.status_code(), err.error_code(), err.to_string())
}

fn malformed(header: &str) -> Response {
    let err = AppError::Validation(format!("Header {header} is not valid"));
    error_response(err.status_code(), err.error_code(), err.to_string())
}

impl<S: Send + Sync> FromRequestParts<S> for ActorContext {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_str = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        };

        let user_id = header_str(ACTOR_ID_HEADER).ok_or_else(|| missing(ACTOR_ID_HEADER))?;
        let user_id: Uuid = user_id.parse().map_err(|_| malformed(ACTOR_ID_HEADER))?;

        let role = header_str(ACTOR_ROLE_HEADER).ok_or_else(|| missing(ACTOR_ROLE_HEADER))?;
        let role = ActorRole::parse(role).ok_or_else(|| malformed(ACTOR_ROLE_HEADER))?;

        let unit_id = match header_str(ACTOR_UNIT_HEADER) {
            Some(raw) => Some(raw.parse().map_err(|_| malformed(ACTOR_UNIT_HEADER))?),
            None => None,
        };

        Ok(Self {
            user_id,
            role,
            unit_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> Result<ActorContext, Response> {
        let (mut parts, ()) = req.into_parts();
        ActorContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_actor() {
        let id = Uuid::new_v4();
        let req = Request::builder()
            .header(ACTOR_ID_HEADER, id.to_string())
            .header(ACTOR_ROLE_HEADER, "finance")
            .body(())
            .unwrap();

        let actor = extract(req).await.unwrap();
        assert_eq!(actor.user_id, id);
        assert_eq!(actor.role, ActorRole::Finance);
        assert!(actor.unit_id.is_none());
    }

    #[tokio::test]
    async fn test_missing_id_rejected() {
        let req = Request::builder()
            .header(ACTOR_ROLE_HEADER, "finance")
            .body(())
            .unwrap();
        assert!(extract(req).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let req = Request::builder()
            .header(ACTOR_ID_HEADER, Uuid::new_v4().to_string())
            .header(ACTOR_ROLE_HEADER, "superuser")
            .body(())
            .unwrap();
        assert!(extract(req).await.is_err());
    }

    #[tokio::test]
    async fn test_unit_header_parsed() {
        let unit = Uuid::new_v4();
        let req = Request::builder()
            .header(ACTOR_ID_HEADER, Uuid::new_v4().to_string())
            .header(ACTOR_ROLE_HEADER, "caseworker")
            .header(ACTOR_UNIT_HEADER, unit.to_string())
            .body(())
            .unwrap();

        let actor = extract(req).await.unwrap();
        assert_eq!(actor.unit_id, Some(unit));
    }
}
