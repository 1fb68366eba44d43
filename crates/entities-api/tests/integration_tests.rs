//! # Integration Tests for entities-api
//!
//! Drives the assembled router with `oneshot` requests: the entity CRUD
//! contract, version negotiation, health probes, OpenAPI documents,
//! metrics, and the 404/422/500 paths reachable through backend errors.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use entities_api::state::{AppConfig, AppState};
use entities_core::{
    Entity, EntityBackend, EntityChanges, EntityDraft, EntityError, EntityId, EntityQuery,
    PatchDocument,
};

const ENTITY_ID: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
const NIL_ID: &str = "00000000-0000-0000-0000-000000000000";

/// Helper: build the test app with the stub backend.
fn test_app() -> axum::Router {
    entities_api::app(AppState::new())
}

/// Helper: build the test app over a given backend.
fn test_app_with_backend(backend: impl EntityBackend + 'static) -> axum::Router {
    entities_api::app(AppState::with_backend(
        AppConfig::default(),
        Arc::new(backend),
    ))
}

/// Helper: read response body as string.
async fn body_string(response: axum::http::Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Helper: read response body as JSON.
async fn body_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: &str, uri: &str, content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post(uri: &str, body: &str) -> Request<Body> {
    with_json("POST", uri, "application/json", body)
}

fn put(uri: &str, body: &str) -> Request<Body> {
    with_json("PUT", uri, "application/json", body)
}

fn patch(uri: &str, body: &str) -> Request<Body> {
    with_json("PATCH", uri, "application/json-patch+json", body)
}

async fn error_code(response: axum::http::Response<Body>) -> String {
    body_json(response).await["error"]["code"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Backend whose every operation fails with one error.
#[derive(Debug)]
struct FailingBackend {
    error: fn(EntityId) -> EntityError,
}

impl EntityBackend for FailingBackend {
    fn list(&self, _query: &EntityQuery) -> Result<Vec<Entity>, EntityError> {
        Err((self.error)(EntityId::new()))
    }

    fn get(&self, id: EntityId) -> Result<Option<Entity>, EntityError> {
        Err((self.error)(id))
    }

    fn create(&self, _draft: &EntityDraft) -> Result<Entity, EntityError> {
        Err((self.error)(EntityId::new()))
    }

    fn replace(&self, id: EntityId, _changes: &EntityChanges) -> Result<Entity, EntityError> {
        Err((self.error)(id))
    }

    fn patch(&self, id: EntityId, _document: &PatchDocument) -> Result<Entity, EntityError> {
        Err((self.error)(id))
    }

    fn delete(&self, id: EntityId) -> Result<(), EntityError> {
        Err((self.error)(id))
    }
}

/// Backend holding exactly one entity.
#[derive(Debug)]
struct SingleEntityBackend {
    id: EntityId,
}

impl EntityBackend for SingleEntityBackend {
    fn list(&self, _query: &EntityQuery) -> Result<Vec<Entity>, EntityError> {
        Ok(vec![Entity::new(self.id)])
    }

    fn get(&self, id: EntityId) -> Result<Option<Entity>, EntityError> {
        Ok((id == self.id).then(|| Entity::new(id)))
    }

    fn create(&self, _draft: &EntityDraft) -> Result<Entity, EntityError> {
        Ok(Entity::new(EntityId::new()))
    }

    fn replace(&self, id: EntityId, _changes: &EntityChanges) -> Result<Entity, EntityError> {
        Ok(Entity::new(id))
    }

    fn patch(&self, id: EntityId, _document: &PatchDocument) -> Result<Entity, EntityError> {
        Ok(Entity::new(id))
    }

    fn delete(&self, _id: EntityId) -> Result<(), EntityError> {
        Ok(())
    }
}

// -- Health Probes ------------------------------------------------------------

#[tokio::test]
async fn test_liveness_probe() {
    let response = test_app().oneshot(get("/health/liveness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ok");
}

#[tokio::test]
async fn test_readiness_probe() {
    let response = test_app().oneshot(get("/health/readiness")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "ready");
}

// -- GET collection -----------------------------------------------------------

#[tokio::test]
async fn test_list_entities_returns_204_from_stub() {
    let response = test_app()
        .oneshot(get("/api/v1.0/entities?page_number=1&page_size=10&order_by=name"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn test_list_entities_returns_400_for_unbindable_query() {
    let response = test_app()
        .oneshot(get("/api/v1.0/entities?page_size=lots"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "BAD_REQUEST");
}

#[tokio::test]
async fn test_list_entities_returns_200_with_page() {
    let id = EntityId::new();
    let response = test_app_with_backend(SingleEntityBackend { id })
        .oneshot(get("/api/v1/entities"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([{ "id": id.to_string() }]));
}

// -- GET by id ----------------------------------------------------------------

#[tokio::test]
async fn test_get_entity_returns_204_from_stub() {
    let response = test_app()
        .oneshot(get(&format!("/api/v1.0/entities/{ENTITY_ID}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_get_entity_returns_400_for_nil_id() {
    let response = test_app()
        .oneshot(get(&format!("/api/v1.0/entities/{NIL_ID}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_entity_returns_400_for_non_uuid_id() {
    let response = test_app()
        .oneshot(get("/api/v1.0/entities/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "BAD_REQUEST");
}

#[tokio::test]
async fn test_get_entity_returns_200_when_found() {
    let id = EntityId::new();
    let response = test_app_with_backend(SingleEntityBackend { id })
        .oneshot(get(&format!("/api/v1.0/entities/{id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id.to_string());
}

// -- POST ---------------------------------------------------------------------

#[tokio::test]
async fn test_create_entity_returns_201_with_location() {
    let response = test_app()
        .oneshot(post("/api/v1.0/entities", r#"{"name": "Acme"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let body = body_json(response).await;
    let id = body["id"].as_str().unwrap();
    assert_ne!(id, NIL_ID);
    assert_eq!(location, format!("/api/v1.0/entities/{id}"));
}

#[tokio::test]
async fn test_create_entity_location_resolves() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post("/api/v1/entities", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();

    let response = app.oneshot(get(&location)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_create_entity_returns_400_for_null_body() {
    let response = test_app()
        .oneshot(post("/api/v1.0/entities", "null"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_entity_returns_400_for_malformed_json() {
    let response = test_app()
        .oneshot(post("/api/v1.0/entities", "{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert!(!body["error"]["message"].as_str().unwrap().contains("line"));
}

#[tokio::test]
async fn test_create_entity_returns_400_without_content_type() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1.0/entities")
        .body(Body::from("{}"))
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_entity_returns_413_for_oversized_body() {
    let body = format!(r#"{{"blob": "{}"}}"#, "x".repeat(2 * 1024 * 1024 + 1));
    let response = test_app()
        .oneshot(post("/api/v1.0/entities", &body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error_code(response).await, "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_create_entity_returns_500_on_backend_fault() {
    let app = test_app_with_backend(FailingBackend {
        error: |_| EntityError::Internal("store offline".to_string()),
    });
    let response = app
        .oneshot(post("/api/v1.0/entities", "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
    assert!(!body["error"]["message"].as_str().unwrap().contains("offline"));
}

// -- PUT ----------------------------------------------------------------------

#[tokio::test]
async fn test_put_entity_returns_200_echoing_id() {
    let response = test_app()
        .oneshot(put(&format!("/api/v1.0/entities/{ENTITY_ID}"), r#"{"name": "Acme"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], ENTITY_ID);
}

#[tokio::test]
async fn test_put_entity_returns_400_for_null_body() {
    let response = test_app()
        .oneshot(put(&format!("/api/v1.0/entities/{ENTITY_ID}"), "null"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_entity_returns_400_for_nil_id() {
    let response = test_app()
        .oneshot(put(&format!("/api/v1.0/entities/{NIL_ID}"), "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_put_entity_returns_404_when_backend_has_no_entity() {
    let app = test_app_with_backend(FailingBackend {
        error: EntityError::NotFound,
    });
    let response = app
        .oneshot(put(&format!("/api/v1.0/entities/{ENTITY_ID}"), "{}"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_code(response).await, "NOT_FOUND");
}

// -- PATCH --------------------------------------------------------------------

#[tokio::test]
async fn test_patch_entity_returns_200_echoing_id() {
    let body = r#"[{"op": "replace", "path": "/firstname", "value": "Dave"}]"#;
    let response = test_app()
        .oneshot(patch(&format!("/api/v1.0/entities/{ENTITY_ID}"), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], ENTITY_ID);
}

#[tokio::test]
async fn test_patch_entity_accepts_plain_json_content_type() {
    let body = r#"[{"op": "remove", "path": "/nickname"}]"#;
    let response = test_app()
        .oneshot(with_json(
            "PATCH",
            &format!("/api/v1.0/entities/{ENTITY_ID}"),
            "application/json",
            body,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_patch_entity_returns_400_for_null_document() {
    let response = test_app()
        .oneshot(patch(&format!("/api/v1.0/entities/{ENTITY_ID}"), "null"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_entity_returns_400_for_unknown_operation() {
    let body = r#"[{"op": "merge", "path": "/firstname", "value": "Dave"}]"#;
    let response = test_app()
        .oneshot(patch(&format!("/api/v1.0/entities/{ENTITY_ID}"), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_entity_returns_400_for_move_without_from() {
    let body = r#"[{"op": "move", "path": "/surname"}]"#;
    let response = test_app()
        .oneshot(patch(&format!("/api/v1.0/entities/{ENTITY_ID}"), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_entity_returns_400_for_nil_id() {
    let response = test_app()
        .oneshot(patch(&format!("/api/v1.0/entities/{NIL_ID}"), "[]"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_entity_returns_404_when_backend_has_no_entity() {
    let app = test_app_with_backend(FailingBackend {
        error: EntityError::NotFound,
    });
    let response = app
        .oneshot(patch(&format!("/api/v1.0/entities/{ENTITY_ID}"), "[]"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_patch_entity_returns_422_when_backend_cannot_apply() {
    let app = test_app_with_backend(FailingBackend {
        error: |id| EntityError::Unprocessable {
            id,
            reason: "path /firstname does not exist".to_string(),
        },
    });
    let body = r#"[{"op": "test", "path": "/firstname", "value": null}]"#;
    let response = app
        .oneshot(patch(&format!("/api/v1.0/entities/{ENTITY_ID}"), body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_code(response).await, "UNPROCESSABLE_ENTITY");
}

// -- DELETE -------------------------------------------------------------------

#[tokio::test]
async fn test_delete_entity_returns_204() {
    let response = test_app()
        .oneshot(delete(&format!("/api/v1.0/entities/{ENTITY_ID}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(body_string(response).await.is_empty());
}

#[tokio::test]
async fn test_delete_entity_returns_400_for_nil_id() {
    let response = test_app()
        .oneshot(delete(&format!("/api/v1.0/entities/{NIL_ID}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_entity_returns_404_when_backend_has_no_entity() {
    let app = test_app_with_backend(FailingBackend {
        error: EntityError::NotFound,
    });
    let response = app
        .oneshot(delete(&format!("/api/v1.0/entities/{ENTITY_ID}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// -- Versioning ---------------------------------------------------------------

#[tokio::test]
async fn test_v1_and_v1_0_are_equivalent() {
    let app = test_app();
    for uri in ["/api/v1/entities", "/api/v1.0/entities"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
    }
}

#[tokio::test]
async fn test_unsupported_version_returns_400() {
    let app = test_app();
    for uri in [
        "/api/v2/entities",
        "/api/v2.0/entities",
        "/api/1.0/entities",
        format!("/api/v9/entities/{ENTITY_ID}").as_str(),
    ] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_code(response).await, "UNSUPPORTED_API_VERSION", "{uri}");
    }
}

#[tokio::test]
async fn test_unsupported_version_is_rejected_before_body_binding() {
    let response = test_app()
        .oneshot(post("/api/v3/entities", "null"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_code(response).await, "UNSUPPORTED_API_VERSION");
}

#[tokio::test]
async fn test_every_response_reports_supported_versions() {
    let app = test_app();
    for request in [
        get("/api/v1.0/entities"),
        get("/api/v2/entities"),
        post("/api/v1.0/entities", "null"),
        get("/health/liveness"),
    ] {
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()["api-supported-versions"],
            "1.0",
            "status {}",
            response.status()
        );
    }
}

// -- OpenAPI ------------------------------------------------------------------

#[tokio::test]
async fn test_openapi_json_is_served() {
    let response = test_app().oneshot(get("/openapi.json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert_eq!(spec["info"]["title"], "Entities API");
    assert!(spec["paths"]["/api/v1.0/entities"]["post"].is_object());
    assert!(spec["paths"]["/api/v1.0/entities/{id}"]["patch"]["responses"]["422"].is_object());
}

#[tokio::test]
async fn test_versioned_swagger_document_is_served() {
    let response = test_app()
        .oneshot(get("/swagger/v1/swagger.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert_eq!(spec["info"]["version"], "1.0");
    assert!(spec["paths"]["/api/v1.0/entities/{id}"]["delete"].is_object());
}

// -- Metrics ------------------------------------------------------------------

#[tokio::test]
async fn test_metrics_record_entity_requests() {
    let app = test_app();
    app.clone()
        .oneshot(get(&format!("/api/v1.0/entities/{ENTITY_ID}")))
        .await
        .unwrap();

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("entities_http_requests_total"));
    assert!(body.contains(r#"path="/api/{version}/entities/{id}""#));
    assert!(!body.contains(ENTITY_ID));
}

fn request_series(metrics: &str) -> Vec<&str> {
    metrics
        .lines()
        .filter(|line| line.starts_with("entities_http_requests_total{"))
        .collect()
}

#[tokio::test]
async fn test_metrics_labels_stay_bounded_for_arbitrary_paths() {
    let app = test_app();
    for i in 0..25 {
        for uri in [
            format!("/api/v1.0/entities/not-a-uuid-{i}"),
            format!("/api/x{i}/entities"),
        ] {
            let response = app.clone().oneshot(get(&uri)).await.unwrap();
            assert!(response.status().is_client_error(), "{uri}");
        }
    }

    let response = app.oneshot(get("/metrics")).await.unwrap();
    let body = body_string(response).await;
    let series = request_series(&body);
    assert_eq!(series.len(), 2, "series: {series:#?}");
    assert!(body.contains(r#"path="/api/{version}/entities/{id}""#));
    assert!(body.contains(r#"path="/api/{version}/entities""#));
    assert!(!body.contains("not-a-uuid"));
}

#[tokio::test]
async fn test_metrics_endpoint_absent_when_disabled() {
    let config = AppConfig {
        metrics_enabled: false,
        ..AppConfig::default()
    };
    let app = entities_api::app(AppState::with_config(config));
    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
