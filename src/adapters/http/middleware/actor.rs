//! Actor extractors for axum.
//!
//! The service sits behind a gateway that has already authenticated the
//! caller and forwards the identity in two trusted headers:
//!
//! ```text
//! X-Actor-Id: member-42
//! X-Actor-Role: evaluator
//! ```
//!
//! A missing role header defaults to `member`.

use axum::{
    async_trait,
    extract::FromRequestParts,
    response::{IntoResponse, Response},
    Json,
};
use http::{request::Parts, HeaderMap, StatusCode};

use crate::domain::foundation::{Actor, ActorRole, UserId};

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extractor for endpoints that need to know who is calling.
#[derive(Debug, Clone)]
pub struct RequireActor(pub Actor);

/// Extractor for endpoints where the caller is only recorded if known.
#[derive(Debug, Clone)]
pub struct OptionalActor(pub Option<Actor>);

fn actor_from_headers(headers: &HeaderMap) -> Result<Option<Actor>, ActorRejection> {
    let Some(raw_id) = headers.get(ACTOR_ID_HEADER) else {
        return Ok(None);
    };
    let id = raw_id
        .to_str()
        .map_err(|_| ActorRejection::Malformed("actor id is not valid ASCII".to_string()))?;
    let user_id = UserId::new(id).map_err(|e| ActorRejection::Malformed(e.to_string()))?;

    let role = match headers.get(ACTOR_ROLE_HEADER) {
        Some(raw) => raw
            .to_str()
            .map_err(|_| ActorRejection::Malformed("actor role is not valid ASCII".to_string()))?
            .parse::<ActorRole>()
            .map_err(|e| ActorRejection::Malformed(e.to_string()))?,
        None => ActorRole::default(),
    };

    Ok(Some(Actor::new(user_id, role)))
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireActor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers)?
            .map(RequireActor)
            .ok_or(ActorRejection::Missing)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalActor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_headers(&parts.headers).map(OptionalActor)
    }
}

/// Rejection for missing or unreadable actor headers.
#[derive(Debug, Clone)]
pub enum ActorRejection {
    Missing,
    Malformed(String),
}

impl IntoResponse for ActorRejection {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ActorRejection::Missing => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHENTICATED",
                "Actor headers required".to_string(),
            ),
            ActorRejection::Malformed(reason) => {
                (StatusCode::BAD_REQUEST, "INVALID_ACTOR", reason)
            }
        };

        (
            status,
            Json(serde_json::json!({
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}
