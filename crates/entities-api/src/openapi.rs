//! # OpenAPI Specification Assembly
//!
//! Assembles the utoipa-documented entity routes into an OpenAPI 3.1
//! document. The full document is served at `/openapi.json`; one document
//! per supported API version is served at `/swagger/{group}/swagger.json`
//! (e.g. `/swagger/v1/swagger.json`), with paths rewritten to that version's
//! route segment.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;
use crate::versioning::ApiVersion;

/// Route segment the handlers are documented under.
const DOCUMENTED_SEGMENT: &str = "/api/v1.0/";

/// Assembled OpenAPI spec for the entities API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Entities API",
        version = "1.0",
        description = "Versioned CRUD contract over the entity resource.\n\nRoutes live under `/api/{version}/entities`, where `{version}` is `v1` or `v1.0`. Every response carries the `api-supported-versions` header.\n\nErrors are returned as `{\"error\": {\"code\", \"message\"}}`.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::entities::list_entities,
        crate::routes::entities::get_entity,
        crate::routes::entities::create_entity,
        crate::routes::entities::replace_entity,
        crate::routes::entities::patch_entity,
        crate::routes::entities::delete_entity,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::routes::entities::CreateEntityRequest,
            crate::routes::entities::UpdateEntityRequest,
            crate::routes::entities::PatchOperationRequest,
            crate::routes::entities::EntityResponse,
        ),
    ),
    tags(
        (name = "entities", description = "Entity resource: list, fetch, create, replace, patch and delete"),
    )
)]
pub struct ApiDoc;

/// OpenAPI document for one API version.
pub fn versioned_document(version: ApiVersion) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.version = version.to_string();

    let prefix = format!("/api/{}/", version.segment());
    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| (path.replacen(DOCUMENTED_SEGMENT, &prefix, 1), item))
        .collect();
    doc
}

/// Build the OpenAPI router.
///
/// Serves `/openapi.json` plus one Swagger document per supported version.
pub fn router() -> Router<AppState> {
    ApiVersion::SUPPORTED.iter().fold(
        Router::new().route("/openapi.json", get(openapi_json)),
        |router, version| {
            let version = *version;
            router.route(
                &format!("/swagger/{}/swagger.json", version.group_name()),
                get(move || async move { Json(versioned_document(version)) }),
            )
        },
    )
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
