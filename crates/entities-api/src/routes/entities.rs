//! # Entity Resource Controller
//!
//! Versioned CRUD over the entity collection. Each handler binds and
//! presence-checks its input, delegates to the [`EntityBackend`] in
//! [`AppState`], and translates the result into a response.
//!
//! ## Endpoints
//!
//! | Method | Path | Success | Errors |
//! |--------|------|---------|--------|
//! | GET    | `/api/{version}/entities`      | 200, 204 | 400 |
//! | GET    | `/api/{version}/entities/{id}` | 200, 204 | 400 |
//! | POST   | `/api/{version}/entities`      | 201 + `Location` | 400 |
//! | PUT    | `/api/{version}/entities/{id}` | 200 | 400, 404 |
//! | PATCH  | `/api/{version}/entities/{id}` | 200 | 400, 404, 422 |
//! | DELETE | `/api/{version}/entities/{id}` | 204 | 400, 404 |
//!
//! Every operation may also answer 500. Operations taking a body answer 413
//! when it exceeds the 2 MiB limit.
//!
//! [`EntityBackend`]: entities_core::EntityBackend

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::routing::{on, MethodFilter, MethodRouter};
use axum::{Json, Router};
use entities_core::{
    Entity, EntityChanges, EntityDraft, EntityQuery, PatchDocument, PatchError, PatchOperation,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_entity_id, extract_json, extract_query, EntityPath};
use crate::state::AppState;
use crate::versioning::{require_supported_version, ApiVersion};

// ── Request/Response DTOs ───────────────────────────────────────────

/// Query parameters for listing entities.
///
/// Accepted and forwarded to the backend; paging, searching, filtering,
/// sorting and shaping are not interpreted by this service.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GetEntitiesRequest {
    /// 1-based page index.
    pub page_number: Option<u32>,
    /// Maximum entities per page.
    pub page_size: Option<u32>,
    /// Free-text search.
    pub search_query: Option<String>,
    /// Filter expression.
    pub filter: Option<String>,
    /// Sort expression, e.g. `name desc`.
    pub order_by: Option<String>,
    /// Comma-separated attributes to include in each result.
    pub fields: Option<String>,
}

impl From<GetEntitiesRequest> for EntityQuery {
    fn from(req: GetEntitiesRequest) -> Self {
        Self {
            page_number: req.page_number,
            page_size: req.page_size,
            search_query: req.search_query,
            filter: req.filter,
            order_by: req.order_by,
            fields: req.fields,
        }
    }
}

/// Attributes of a new entity. Any JSON object, including `{}`.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(value_type = Object)]
pub struct CreateEntityRequest(pub Map<String, Value>);

impl From<CreateEntityRequest> for EntityDraft {
    fn from(req: CreateEntityRequest) -> Self {
        Self { attributes: req.0 }
    }
}

/// Replacement attributes for an entity. Any JSON object, including `{}`.
#[derive(Debug, Deserialize, ToSchema)]
#[schema(value_type = Object)]
pub struct UpdateEntityRequest(pub Map<String, Value>);

impl From<UpdateEntityRequest> for EntityChanges {
    fn from(req: UpdateEntityRequest) -> Self {
        Self { attributes: req.0 }
    }
}

/// One JSON Patch (RFC 6902) operation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchOperationRequest {
    /// `add`, `remove`, `replace`, `move`, `copy` or `test`.
    #[schema(example = "replace")]
    pub op: String,
    /// JSON Pointer to the target location.
    #[schema(example = "/firstname")]
    pub path: String,
    /// Source location for `move` and `copy`.
    #[serde(default)]
    pub from: Option<String>,
    /// Value for `add`, `replace` and `test`. An explicit `null` is a value.
    #[serde(default, deserialize_with = "present_value")]
    #[schema(value_type = Object, example = "Dave")]
    pub value: Option<Value>,
}

/// Deserialize a member that is present, keeping `null` as `Some(Value::Null)`.
fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<PatchOperationRequest> for PatchOperation {
    type Error = PatchError;

    fn try_from(req: PatchOperationRequest) -> Result<Self, Self::Error> {
        PatchOperation::parse(&req.op, &req.path, req.from.as_deref(), req.value)
    }
}

fn patch_document(operations: Vec<PatchOperationRequest>) -> Result<PatchDocument, AppError> {
    operations
        .into_iter()
        .map(PatchOperation::try_from)
        .collect::<Result<PatchDocument, _>>()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Entity representation returned by every read and write.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EntityResponse {
    /// Unique identifier of the entity.
    pub id: Uuid,
}

impl From<Entity> for EntityResponse {
    fn from(entity: Entity) -> Self {
        Self {
            id: *entity.id.as_uuid(),
        }
    }
}

/// Result of a read: a body (200) or nothing (204).
#[derive(Debug)]
pub enum Fetched<T> {
    Found(T),
    Empty,
}

impl<T: Serialize> IntoResponse for Fetched<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Found(body) => (StatusCode::OK, Json(body)).into_response(),
            Self::Empty => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

// ── Route table ─────────────────────────────────────────────────────

/// HTTP method of a route table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    fn filter(self) -> MethodFilter {
        match self {
            Self::Get => MethodFilter::GET,
            Self::Post => MethodFilter::POST,
            Self::Put => MethodFilter::PUT,
            Self::Patch => MethodFilter::PATCH,
            Self::Delete => MethodFilter::DELETE,
        }
    }
}

/// Controller operation a route dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListEntities,
    GetEntity,
    CreateEntity,
    ReplaceEntity,
    PatchEntity,
    DeleteEntity,
}

impl Operation {
    fn method_router(self, filter: MethodFilter) -> MethodRouter<AppState> {
        match self {
            Self::ListEntities => on(filter, list_entities),
            Self::GetEntity => on(filter, get_entity),
            Self::CreateEntity => on(filter, create_entity),
            Self::ReplaceEntity => on(filter, replace_entity),
            Self::PatchEntity => on(filter, patch_entity),
            Self::DeleteEntity => on(filter, delete_entity),
        }
    }
}

/// One row of the route table.
#[derive(Debug, Clone, Copy)]
pub struct RouteSpec {
    pub method: HttpMethod,
    /// Axum path pattern, including the `{version}` segment.
    pub path: &'static str,
    pub operation: Operation,
    /// Status codes the operation may return, excluding the global 500.
    pub responses: &'static [u16],
}

pub const COLLECTION_PATH: &str = "/api/{version}/entities";
pub const ITEM_PATH: &str = "/api/{version}/entities/{id}";

/// Every entity route, in documentation order.
pub const ROUTES: &[RouteSpec] = &[
    RouteSpec {
        method: HttpMethod::Get,
        path: COLLECTION_PATH,
        operation: Operation::ListEntities,
        responses: &[200, 204, 400],
    },
    RouteSpec {
        method: HttpMethod::Get,
        path: ITEM_PATH,
        operation: Operation::GetEntity,
        responses: &[200, 204, 400],
    },
    RouteSpec {
        method: HttpMethod::Post,
        path: COLLECTION_PATH,
        operation: Operation::CreateEntity,
        responses: &[201, 400],
    },
    RouteSpec {
        method: HttpMethod::Put,
        path: ITEM_PATH,
        operation: Operation::ReplaceEntity,
        responses: &[200, 400, 404],
    },
    RouteSpec {
        method: HttpMethod::Patch,
        path: ITEM_PATH,
        operation: Operation::PatchEntity,
        responses: &[200, 400, 404, 422],
    },
    RouteSpec {
        method: HttpMethod::Delete,
        path: ITEM_PATH,
        operation: Operation::DeleteEntity,
        responses: &[204, 400, 404],
    },
];

// ── Router ──────────────────────────────────────────────────────────

/// Build the entities router from [`ROUTES`].
///
/// Unsupported or malformed `{version}` segments are rejected before any
/// handler runs.
pub fn router() -> Router<AppState> {
    ROUTES
        .iter()
        .fold(Router::new(), |router, route| {
            tracing::debug!(
                method = route.method.as_str(),
                path = route.path,
                operation = ?route.operation,
                "entity route registered"
            );
            router.route(
                route.path,
                route.operation.method_router(route.method.filter()),
            )
        })
        .route_layer(from_fn(require_supported_version))
}

/// Location of an entity for a given API version.
pub fn entity_location(version: ApiVersion, id: Uuid) -> String {
    format!("/api/{}/entities/{id}", version.segment())
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /api/{version}/entities: Get a page of entities.
#[utoipa::path(
    get,
    path = "/api/v1.0/entities",
    params(GetEntitiesRequest),
    responses(
        (status = 200, description = "Success - OK - Returns the requested page of entities", body = Vec<EntityResponse>),
        (status = 204, description = "Success - No Content - No entities matched given criteria"),
        (status = 400, description = "Error - Bad Request - It was not possible to bind the request", body = crate::error::ErrorBody),
        (status = 500, description = "Error - Internal Server Error", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
async fn list_entities(
    State(state): State<AppState>,
    query: Result<Query<GetEntitiesRequest>, QueryRejection>,
) -> Result<Fetched<Vec<EntityResponse>>, AppError> {
    let query = EntityQuery::from(extract_query(query)?);

    let entities = state.backend.list(&query)?;
    if entities.is_empty() {
        return Ok(Fetched::Empty);
    }

    Ok(Fetched::Found(
        entities.into_iter().map(EntityResponse::from).collect(),
    ))
}

/// GET /api/{version}/entities/{id}: Get an entity.
#[utoipa::path(
    get,
    path = "/api/v1.0/entities/{id}",
    params(("id" = Uuid, Path, description = "The unique identifier of the entity")),
    responses(
        (status = 200, description = "Success - OK - Returns the requested entity", body = EntityResponse),
        (status = 204, description = "Success - No Content - No entity matched the given identifier"),
        (status = 400, description = "Error - Bad Request - Missing or nil identifier", body = crate::error::ErrorBody),
        (status = 500, description = "Error - Internal Server Error", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
async fn get_entity(
    State(state): State<AppState>,
    path: Result<Path<EntityPath>, PathRejection>,
) -> Result<Fetched<EntityResponse>, AppError> {
    let id = extract_entity_id(path)?;

    Ok(match state.backend.get(id)? {
        Some(entity) => Fetched::Found(entity.into()),
        None => Fetched::Empty,
    })
}

/// POST /api/{version}/entities: Add an entity.
#[utoipa::path(
    post,
    path = "/api/v1.0/entities",
    request_body = CreateEntityRequest,
    responses(
        (status = 201, description = "Success - Created - The entity was successfully created", body = EntityResponse,
            headers(("Location" = String, description = "URI of the newly created entity"))),
        (status = 400, description = "Error - Bad Request - It was not possible to bind the request JSON", body = crate::error::ErrorBody),
        (status = 413, description = "Error - Payload Too Large - The request body exceeds 2 MiB", body = crate::error::ErrorBody),
        (status = 500, description = "Error - Internal Server Error", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
async fn create_entity(
    State(state): State<AppState>,
    version: ApiVersion,
    body: Result<Json<Option<CreateEntityRequest>>, JsonRejection>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<EntityResponse>), AppError> {
    let draft = EntityDraft::from(extract_json(body)?);

    let entity = EntityResponse::from(state.backend.create(&draft)?);
    tracing::info!(entity_id = %entity.id, "entity created");

    let location = entity_location(version, entity.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(entity),
    ))
}

/// PUT /api/{version}/entities/{id}: Fully update an entity.
#[utoipa::path(
    put,
    path = "/api/v1.0/entities/{id}",
    params(("id" = Uuid, Path, description = "The unique identifier of the entity")),
    request_body = UpdateEntityRequest,
    responses(
        (status = 200, description = "Success - OK - The entity was successfully updated", body = EntityResponse),
        (status = 400, description = "Error - Bad Request - It was not possible to bind the request JSON", body = crate::error::ErrorBody),
        (status = 413, description = "Error - Payload Too Large - The request body exceeds 2 MiB", body = crate::error::ErrorBody),
        (status = 404, description = "Error - Not Found - No entity matched the given identifier", body = crate::error::ErrorBody),
        (status = 500, description = "Error - Internal Server Error", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
async fn replace_entity(
    State(state): State<AppState>,
    path: Result<Path<EntityPath>, PathRejection>,
    body: Result<Json<Option<UpdateEntityRequest>>, JsonRejection>,
) -> Result<Json<EntityResponse>, AppError> {
    let changes = EntityChanges::from(extract_json(body)?);
    let id = extract_entity_id(path)?;

    let entity = state.backend.replace(id, &changes)?;
    tracing::info!(entity_id = %id, "entity replaced");
    Ok(Json(entity.into()))
}

/// PATCH /api/{version}/entities/{id}: Fully or partially update an entity.
///
/// Sample request (updates the entity's first name):
///
/// ```text
/// PATCH /api/v1.0/entities/{id}
/// [
///     { "op": "replace", "path": "/firstname", "value": "Dave" }
/// ]
/// ```
#[utoipa::path(
    patch,
    path = "/api/v1.0/entities/{id}",
    params(("id" = Uuid, Path, description = "The unique identifier of the entity")),
    request_body(content = Vec<PatchOperationRequest>, content_type = "application/json-patch+json"),
    responses(
        (status = 200, description = "Success - OK - The entity was successfully updated", body = EntityResponse),
        (status = 400, description = "Error - Bad Request - It was not possible to bind the request JSON", body = crate::error::ErrorBody),
        (status = 413, description = "Error - Payload Too Large - The request body exceeds 2 MiB", body = crate::error::ErrorBody),
        (status = 404, description = "Error - Not Found - No entity matched the given identifier", body = crate::error::ErrorBody),
        (status = 422, description = "Error - Unprocessable Entity - Unable to process the contained instructions", body = crate::error::ErrorBody),
        (status = 500, description = "Error - Internal Server Error", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
async fn patch_entity(
    State(state): State<AppState>,
    path: Result<Path<EntityPath>, PathRejection>,
    body: Result<Json<Option<Vec<PatchOperationRequest>>>, JsonRejection>,
) -> Result<Json<EntityResponse>, AppError> {
    let document = patch_document(extract_json(body)?)?;
    let id = extract_entity_id(path)?;

    let entity = state.backend.patch(id, &document)?;
    tracing::info!(entity_id = %id, operations = document.len(), "entity patched");
    Ok(Json(entity.into()))
}

/// DELETE /api/{version}/entities/{id}: Delete an entity.
#[utoipa::path(
    delete,
    path = "/api/v1.0/entities/{id}",
    params(("id" = Uuid, Path, description = "The unique identifier of the entity")),
    responses(
        (status = 204, description = "Success - No Content - Entity was successfully deleted"),
        (status = 400, description = "Error - Bad Request - Missing or nil identifier", body = crate::error::ErrorBody),
        (status = 404, description = "Error - Not Found - No entity matched the given identifier", body = crate::error::ErrorBody),
        (status = 500, description = "Error - Internal Server Error", body = crate::error::ErrorBody),
    ),
    tag = "entities"
)]
async fn delete_entity(
    State(state): State<AppState>,
    path: Result<Path<EntityPath>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = extract_entity_id(path)?;

    state.backend.delete(id)?;
    tracing::info!(entity_id = %id, "entity deleted");
    Ok(StatusCode::NO_CONTENT)
}
