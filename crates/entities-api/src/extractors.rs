//! # Request Binding Helpers
//!
//! Handlers take extractor results as `Result<Extractor<T>, Rejection>` and
//! pass them through these helpers, so every binding failure becomes
//! [`AppError::BadRequest`] instead of Axum's default rejection response.
//!
//! ```ignore
//! async fn handler(body: Result<Json<Option<T>>, JsonRejection>) -> Result<..., AppError> {
//!     let req = extract_json(body)?;
//!     // use req...
//! }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::Json;
use entities_core::EntityId;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;

/// Path parameters of the single-entity routes.
#[derive(Debug, Deserialize)]
pub struct EntityPath {
    pub id: Uuid,
}

/// Extract a JSON body. A missing, malformed or `null` body is a bad request;
/// a body over the size limit is [`AppError::PayloadTooLarge`].
pub fn extract_json<T>(result: Result<Json<Option<T>>, JsonRejection>) -> Result<T, AppError> {
    match result {
        Ok(Json(Some(value))) => Ok(value),
        Ok(Json(None)) => Err(AppError::BadRequest("request body is null".to_string())),
        Err(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(AppError::PayloadTooLarge(err.body_text()))
        }
        Err(err) => Err(AppError::BadRequest(err.body_text())),
    }
}

/// Extract query-string parameters.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::BadRequest(err.body_text()))
}

/// Extract the `{id}` segment, rejecting the nil UUID.
pub fn extract_entity_id(result: Result<Path<EntityPath>, PathRejection>) -> Result<EntityId, AppError> {
    let Path(EntityPath { id }) = result.map_err(|err| AppError::BadRequest(err.body_text()))?;
    let id = EntityId::from(id);
    if id.is_nil() {
        return Err(AppError::BadRequest(
            "entity identifier must not be the nil UUID".to_string(),
        ));
    }
    Ok(id)
}
