//! HTTP routes for succession endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    add_criterion, cancel_meeting, complete_meeting, create_approach, create_cycle,
    define_position, get_active_cycle, get_cycle_statistics, get_nomination_ranking,
    get_pending_rc_review, get_status_history, record_approach_response, record_rc_approval,
    schedule_meeting, submit_evaluation_score, submit_nomination, transition_cycle,
    update_evaluation_score, withdraw_nomination, SuccessionHandlers,
};

/// Creates the succession router. Mount under `/api/succession`.
pub fn succession_routes(handlers: SuccessionHandlers) -> Router {
    Router::new()
        .route("/cycles", post(create_cycle))
        .route("/active-cycle", get(get_active_cycle))
        .route("/cycles/:id/transition", post(transition_cycle))
        .route("/cycles/:id/statistics", get(get_cycle_statistics))
        .route("/cycles/:id/pending-rc-review", get(get_pending_rc_review))
        .route("/cycles/:id/positions", post(define_position))
        .route("/cycles/:id/nominations", post(submit_nomination))
        .route("/cycles/:id/approaches", post(create_approach))
        .route("/cycles/:id/meetings", post(schedule_meeting))
        .route("/positions/:id/criteria", post(add_criterion))
        .route("/positions/:id/ranking", get(get_nomination_ranking))
        .route("/nominations/:id/withdraw", post(withdraw_nomination))
        .route(
            "/nominations/:id/scores",
            post(submit_evaluation_score).put(update_evaluation_score),
        )
        .route("/nominations/:id/rc-approval", post(record_rc_approval))
        .route("/approaches/:id/response", post(record_approach_response))
        .route("/meetings/:id/complete", post(complete_meeting))
        .route("/meetings/:id/cancel", post(cancel_meeting))
        .route("/history/:entity/:id", get(get_status_history))
        .with_state(handlers)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::http::api_router;
    use crate::adapters::memory::InMemorySuccessionStore;
    use crate::adapters::wiring::SuccessionPorts;
    use crate::domain::succession::PartialScoringPolicy;

    use super::SuccessionHandlers;

    fn app() -> Router {
        let ports = SuccessionPorts::in_memory(
            InMemorySuccessionStore::new(),
            Arc::new(InMemoryEventBus::new()),
        );
        api_router(SuccessionHandlers::new(ports, PartialScoringPolicy::default()))
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .header("x-actor-id", "admin-1")
            .header("x-actor-role", "admin")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create_cycle(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(post(
                "/api/succession/cycles",
                json!({"scope": "chapter-12", "name": "2026 Succession", "year": 2026}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["phase"], "draft");
        body["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn health_is_mounted() {
        let response = app().oneshot(get("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn create_then_find_active_cycle() {
        let app = app();
        let id = create_cycle(&app).await;

        let response = app
            .clone()
            .oneshot(get("/api/succession/active-cycle?scope=chapter-12"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["id"], id.as_str());
    }

    #[tokio::test]
    async fn second_active_cycle_is_409() {
        let app = app();
        create_cycle(&app).await;

        let response = app
            .clone()
            .oneshot(post(
                "/api/succession/cycles",
                json!({"scope": "chapter-12", "name": "Again", "year": 2026}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn skipping_phases_is_409() {
        let app = app();
        let id = create_cycle(&app).await;

        let response = app
            .clone()
            .oneshot(post(
                &format!("/api/succession/cycles/{}/transition", id),
                json!({"target_phase": "completed"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(response).await["code"], "INVALID_STATE_TRANSITION");
    }

    #[tokio::test]
    async fn malformed_id_is_400() {
        let response = app()
            .oneshot(get("/api/succession/cycles/not-a-uuid/statistics"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["field"], "cycle_id");
    }

    #[tokio::test]
    async fn unknown_cycle_is_404() {
        let response = app()
            .oneshot(get(&format!(
                "/api/succession/cycles/{}/statistics",
                uuid::Uuid::new_v4()
            )))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn nominating_requires_an_actor() {
        let app = app();
        let id = create_cycle(&app).await;

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/succession/cycles/{}/nominations", id))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"position_id": uuid::Uuid::new_v4().to_string(), "nominee_id": "member-9"})
                    .to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn new_cycle_history_has_one_entry() {
        let app = app();
        let id = create_cycle(&app).await;

        let response = app
            .clone()
            .oneshot(get(&format!("/api/succession/history/cycle/{}", id)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["to_status"], "draft");
    }
}
