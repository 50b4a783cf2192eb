//! HTTP router. All routes live under `/api/`; admin, clinician and client
//! surfaces are path prefixes, with role enforcement owned by the deployment
//! gateway (out of scope here).

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::state::AppState;

pub fn api_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        // Admin surface
        .route("/admin/alerts", get(endpoints::alerts::admin_list))
        .route("/admin/alerts/:id", put(endpoints::alerts::admin_update))
        .route(
            "/admin/service-assignments",
            post(endpoints::assignments::create),
        )
        .route(
            "/admin/service-assignments/:client_id",
            get(endpoints::assignments::for_client),
        )
        // Audience read surfaces, one handler set parameterized by audience
        .route(
            "/clinician/alerts/:subject_id",
            get(endpoints::alerts::clinician_list),
        )
        .route(
            "/clinician/alerts/:id/read",
            put(endpoints::alerts::mark_read),
        )
        .route(
            "/client/alerts/:subject_id",
            get(endpoints::alerts::client_list),
        )
        .route("/client/alerts/:id/read", put(endpoints::alerts::mark_read))
        // Appointments
        .route(
            "/appointments",
            post(endpoints::appointments::create).get(endpoints::appointments::list),
        )
        // Engine triggers
        .route("/engine/sweep", post(endpoints::engine::sweep))
        .route("/engine/reminders", post(endpoints::engine::reminders))
        .with_state(state);

    Router::new()
        .nest("/api", routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::db::open_memory_database;
    use crate::engine::LogDispatcher;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Local};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn test_router() -> Router {
        let conn = open_memory_database().unwrap();
        let state = AppState::new(conn, Arc::new(LogDispatcher), EngineConfig::default());
        api_router(state)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn put_json(uri: &str, body: Value) -> Request<Body> {
        Request::put(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let router = test_router();
        let (status, body) = send(&router, get_req("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn sweep_emits_then_client_surface_sees_and_marks() {
        let router = test_router();
        let client_id = Uuid::new_v4();
        let today = Local::now().date_naive();

        // Assignment expiring in 10 days
        let (status, _) = send(
            &router,
            post_json(
                "/api/admin/service-assignments",
                json!({
                    "client_id": client_id,
                    "client_name": "Ada",
                    "expiration_date": (today + Duration::days(10)).to_string(),
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        // First sweep creates, second skips
        let (_, body) = send(&router, post_json("/api/engine/sweep", json!({}))).await;
        assert_eq!(body["summary"]["created"], 1);
        let (_, body) = send(&router, post_json("/api/engine/sweep", json!({}))).await;
        assert_eq!(body["summary"]["created"], 0);
        assert_eq!(body["summary"]["skipped"], 1);

        // Visible on the client surface, not the clinician one
        let (_, body) = send(&router, get_req(&format!("/api/client/alerts/{client_id}"))).await;
        assert_eq!(body["alerts"].as_array().unwrap().len(), 1);
        assert_eq!(body["alerts"][0]["read"], false);
        let alert_id = body["alerts"][0]["id"].as_str().unwrap().to_string();

        let (_, body) = send(&router, get_req(&format!("/api/clinician/alerts/{client_id}"))).await;
        assert!(body["alerts"].as_array().unwrap().is_empty());

        // Mark read through the client surface
        let (status, _) = send(
            &router,
            put_json(&format!("/api/client/alerts/{alert_id}/read"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (_, body) = send(&router, get_req(&format!("/api/client/alerts/{client_id}"))).await;
        assert_eq!(body["alerts"][0]["read"], true);
    }

    #[tokio::test]
    async fn mark_read_unknown_alert_is_404() {
        let router = test_router();
        let (status, body) = send(
            &router,
            put_json(&format!("/api/clinician/alerts/{}/read", Uuid::new_v4()), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn admin_listing_paginates() {
        let router = test_router();
        let today = Local::now().date_naive();
        for _ in 0..3 {
            send(
                &router,
                post_json(
                    "/api/admin/service-assignments",
                    json!({
                        "client_id": Uuid::new_v4(),
                        "client_name": "Ada",
                        "review_date": (today - Duration::days(1)).to_string(),
                    }),
                ),
            )
            .await;
        }
        send(&router, post_json("/api/engine/sweep", json!({}))).await;

        let (status, body) = send(&router, get_req("/api/admin/alerts?page=1&limit=2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 3);
        assert_eq!(body["alerts"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn admin_edit_updates_without_emitting() {
        let router = test_router();
        let client_id = Uuid::new_v4();
        let today = Local::now().date_naive();
        send(
            &router,
            post_json(
                "/api/admin/service-assignments",
                json!({
                    "client_id": client_id,
                    "client_name": "Ada",
                    "review_date": today.to_string(),
                }),
            ),
        )
        .await;
        send(&router, post_json("/api/engine/sweep", json!({}))).await;

        let (_, body) = send(&router, get_req(&format!("/api/client/alerts/{client_id}"))).await;
        let alert_id = body["alerts"][0]["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &router,
            put_json(
                &format!("/api/admin/alerts/{alert_id}"),
                json!({"message": "corrected wording"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["alert"]["message"], "corrected wording");

        let (_, body) = send(&router, get_req("/api/admin/alerts")).await;
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn admin_edit_onto_existing_condition_key_is_409() {
        let router = test_router();
        let client_id = Uuid::new_v4();
        let today = Local::now().date_naive();
        // Expiration and review both land on today: two alerts sharing
        // subject, audience and effective date, differing only in message
        send(
            &router,
            post_json(
                "/api/admin/service-assignments",
                json!({
                    "client_id": client_id,
                    "client_name": "Ada",
                    "expiration_date": today.to_string(),
                    "review_date": today.to_string(),
                }),
            ),
        )
        .await;
        send(&router, post_json("/api/engine/sweep", json!({}))).await;

        let (_, body) = send(&router, get_req(&format!("/api/client/alerts/{client_id}"))).await;
        let alerts = body["alerts"].as_array().unwrap();
        assert_eq!(alerts.len(), 2);
        let target = alerts[0]["id"].as_str().unwrap().to_string();
        let other_message = alerts[1]["message"].as_str().unwrap().to_string();

        let (status, body) = send(
            &router,
            put_json(
                &format!("/api/admin/alerts/{target}"),
                json!({"message": other_message}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn booking_confirms_and_lists() {
        let router = test_router();
        let scheduled = Local::now().naive_local() + Duration::days(3);
        let (status, body) = send(
            &router,
            post_json(
                "/api/appointments",
                json!({
                    "client_id": Uuid::new_v4(),
                    "client_name": "Ada",
                    "client_contact": "ada@example.com",
                    "scheduled_at": scheduled.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    "video": true,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["confirmation_sent"], true);

        let (_, body) = send(&router, get_req("/api/appointments")).await;
        assert_eq!(body["appointments"].as_array().unwrap().len(), 1);

        // Three days out: nothing due yet
        let (_, body) = send(&router, post_json("/api/engine/reminders", json!({}))).await;
        assert_eq!(body["summary"]["sent"], 0);
    }
}
