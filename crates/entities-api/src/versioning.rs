//! # API Versioning
//!
//! Versions are carried in the URL: `/api/{version}/entities`, where the
//! segment is `v{major}` or `v{major}.{minor}`. A missing minor is `0`, so
//! `v1` and `v1.0` name the same version.
//!
//! [`ApiVersion`] doubles as an extractor. It reads the `version` path
//! parameter and rejects malformed or unsupported versions with
//! [`AppError::UnsupportedApiVersion`]. Every response carries the
//! supported versions in the `api-supported-versions` header.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{FromRequestParts, Path, Request};
use axum::http::header::HeaderName;
use axum::http::request::Parts;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::AppError;

/// Response header listing every supported version.
pub const SUPPORTED_VERSIONS_HEADER: HeaderName = HeaderName::from_static("api-supported-versions");

/// A `major.minor` API version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ApiVersion {
    pub major: u16,
    pub minor: u16,
}

impl ApiVersion {
    pub const V1_0: ApiVersion = ApiVersion { major: 1, minor: 0 };

    /// Versions served by this build, oldest first.
    pub const SUPPORTED: &'static [ApiVersion] = &[Self::V1_0];

    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(self)
    }

    /// The canonical route segment, e.g. `v1.0`.
    pub fn segment(&self) -> String {
        format!("v{self}")
    }

    /// Documentation group name, e.g. `v1`.
    pub fn group_name(&self) -> String {
        format!("v{}", self.major)
    }

    /// Comma-separated list of supported versions, e.g. `1.0`.
    pub fn supported_list() -> String {
        Self::SUPPORTED
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl std::fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ApiVersion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || AppError::UnsupportedApiVersion(format!("malformed version segment {s:?}"));
        let digits = s.strip_prefix('v').ok_or_else(malformed)?;
        let (major, minor) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, "0"),
        };
        // u16::from_str accepts a leading '+', which is not a version.
        if [major, minor]
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(malformed());
        }
        Ok(Self {
            major: major.parse().map_err(|_| malformed())?,
            minor: minor.parse().map_err(|_| malformed())?,
        })
    }
}

impl<S> FromRequestParts<S> for ApiVersion
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::UnsupportedApiVersion(e.body_text()))?;
        let segment = params
            .get("version")
            .ok_or_else(|| AppError::UnsupportedApiVersion("no version segment".to_string()))?;
        let version: ApiVersion = segment.parse()?;
        if !version.is_supported() {
            return Err(AppError::UnsupportedApiVersion(format!(
                "{version} (supported: {})",
                Self::supported_list()
            )));
        }
        Ok(version)
    }
}

/// Route-layer middleware rejecting requests for unsupported versions
/// before any handler extractor runs.
pub async fn require_supported_version(
    version: ApiVersion,
    request: Request,
    next: Next,
) -> Response {
    tracing::trace!(%version, "api version accepted");
    next.run(request).await
}

/// Middleware adding the `api-supported-versions` header to every response.
pub async fn report_api_versions(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&ApiVersion::supported_list()) {
        response
            .headers_mut()
            .insert(SUPPORTED_VERSIONS_HEADER, value);
    }
    response
}
