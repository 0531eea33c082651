//! HTTP handlers over `/api/content` (§6).
//!
//! Thin translation layer: decode the request, call into
//! [`crate::services::coordinator`] or [`crate::services::range`], and map
//! the result to a response. No business logic lives here.

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use teledrop_core::{DropSnapshot, ListParams};

use crate::auth::Auth;
use crate::error::{ApiError, ApiResult};
use crate::services::{coordinator, range};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub password: Option<String>,
    #[serde(default)]
    pub as_attachment: bool,
}

/// `POST /api/content` (§6, §4.4 Create): multipart upload, `file` required.
///
/// Fields are read in the order the client sends them and streaming begins
/// as soon as `file` is seen, so `file` must be the last part of the form —
/// the same ordering constraint any streaming multipart consumer imposes.
#[utoipa::path(post, path = "/api/content", tag = "Drops",
    responses((status = 201, description = "Created", body = DropSnapshot), (status = 409, description = "Slug taken")))]
pub async fn create(State(state): State<AppState>, auth: Auth, mut multipart: Multipart) -> ApiResult<Response> {
    let owner_id = match &auth.principal {
        teledrop_core::AuthPrincipal::Owner { identity } => identity.clone(),
        teledrop_core::AuthPrincipal::Anonymous => "anonymous".to_string(),
    };

    let mut slug = None;
    let mut title = None;
    let mut description = None;
    let mut passphrase = None;
    let mut private = false;
    let mut favorite = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| teledrop_core::Error::ValidationError(format!("malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                let media_type = field.content_type().unwrap_or("").to_string();
                let req = coordinator::CreateRequest {
                    owner_id,
                    slug,
                    title,
                    description,
                    passphrase,
                    private,
                    favorite,
                    file_name,
                    media_type,
                };
                let drop = coordinator::create(&state, req, field).await?;
                return Ok((StatusCode::CREATED, Json(DropSnapshot::from(drop))).into_response());
            }
            "slug" => slug = text_field(field).await?,
            "title" => title = text_field(field).await?,
            "description" => description = text_field(field).await?,
            "password" => passphrase = text_field(field).await?,
            "private" => private = text_field(field).await?.map(|v| v == "true" || v == "1").unwrap_or(false),
            "favorite" => favorite = text_field(field).await?.map(|v| v == "true" || v == "1").unwrap_or(false),
            _ => {}
        }
    }

    Err(teledrop_core::Error::ValidationError("multipart body is missing the required 'file' field".to_string()).into())
}

/// A missing blob behind a live File row is data corruption, not a routine
/// 404 — the slug and row resolved fine. Surfaced to the caller as
/// `NotFound` anyway (§7: "the latter is treated as NotFound at the API
/// while logged as corruption"), but logged at `error` level so it's not
/// silently indistinguishable from an unknown slug in the logs.
fn blob_missing_is_corruption(drop: &teledrop_core::Drop, err: teledrop_storage::StorageError) -> teledrop_core::Error {
    if matches!(err, teledrop_storage::StorageError::NotFound(_)) {
        tracing::error!(
            drop_id = %drop.id,
            slug = %drop.slug,
            storage_key = %drop.file.storage_key,
            "corruption: live file row has no backing blob"
        );
    }
    err.into()
}

async fn text_field(field: axum::extract::multipart::Field<'_>) -> ApiResult<Option<String>> {
    let text = field
        .text()
        .await
        .map_err(|e| teledrop_core::Error::ValidationError(format!("malformed form field: {e}")))?;
    Ok((!text.is_empty()).then_some(text))
}

/// `GET /api/content/{slug}/preview` (§6).
#[utoipa::path(get, path = "/api/content/{slug}/preview", tag = "Drops",
    params(("slug" = String, Path), ("password" = Option<String>, Query)),
    responses((status = 200, description = "Drop snapshot", body = DropSnapshot), (status = 404, description = "Not found")))]
pub async fn preview(
    State(state): State<AppState>,
    auth: Auth,
    Path(slug): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Json<DropSnapshot>> {
    let drop = coordinator::preview(&state, &slug, &auth.principal, query.password.as_deref()).await?;
    Ok(Json(DropSnapshot::from(drop)))
}

/// `GET /api/content/{slug}` (§6, §4.5): full or range download.
#[utoipa::path(get, path = "/api/content/{slug}", tag = "Drops",
    params(("slug" = String, Path), ("password" = Option<String>, Query), ("as_attachment" = Option<bool>, Query)),
    responses((status = 200, description = "Full content"), (status = 206, description = "Partial content"), (status = 416, description = "Range not satisfiable")))]
pub async fn download(
    State(state): State<AppState>,
    auth: Auth,
    Path(slug): Path<String>,
    Query(query): Query<DownloadQuery>,
    headers: axum::http::HeaderMap,
) -> ApiResult<Response> {
    let drop = coordinator::preview(&state, &slug, &auth.principal, query.password.as_deref()).await?;

    let stat = state
        .storage
        .stat(&drop.file.storage_key)
        .await
        .map_err(|e| blob_missing_is_corruption(&drop, e))?;

    let range_header = headers
        .get(axum::http::header::RANGE)
        .and_then(|v| v.to_str().ok());
    let outcome = range::resolve(range_header, stat.size);

    let stream = match &outcome {
        range::RangeOutcome::NotSatisfiable => None,
        range::RangeOutcome::Full => Some(
            state
                .storage
                .read(&drop.file.storage_key)
                .await
                .map_err(|e| blob_missing_is_corruption(&drop, e))?,
        ),
        range::RangeOutcome::Partial(byte_range) => Some(
            state
                .storage
                .read_range(&drop.file.storage_key, *byte_range)
                .await
                .map_err(|e| blob_missing_is_corruption(&drop, e))?,
        ),
    };

    let stream = stream.unwrap_or_else(|| Box::pin(futures::stream::empty()));
    Ok(range::respond(
        outcome,
        stat.size,
        &drop.file.media_type,
        &drop.file.name,
        query.as_attachment,
        stream,
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateDetailBody {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

/// `PATCH /api/content/{slug}/detail` (§6).
#[utoipa::path(patch, path = "/api/content/{slug}/detail", tag = "Drops",
    params(("slug" = String, Path)),
    responses((status = 200, description = "Updated", body = DropSnapshot), (status = 403, description = "Forbidden")))]
pub async fn update_detail(
    State(state): State<AppState>,
    auth: Auth,
    Path(slug): Path<String>,
    Json(body): Json<UpdateDetailBody>,
) -> ApiResult<Json<DropSnapshot>> {
    let drop = coordinator::update_detail(&state, &slug, &auth.principal, body.title, body.description).await?;
    Ok(Json(DropSnapshot::from(drop)))
}

#[derive(Debug, Deserialize)]
pub struct PermissionBody {
    pub private: bool,
}

/// `PATCH /api/content/{slug}/permission` (§6).
#[utoipa::path(patch, path = "/api/content/{slug}/permission", tag = "Drops",
    params(("slug" = String, Path)),
    responses((status = 200, description = "Updated", body = DropSnapshot), (status = 403, description = "Forbidden")))]
pub async fn update_permission(
    State(state): State<AppState>,
    auth: Auth,
    Path(slug): Path<String>,
    Json(body): Json<PermissionBody>,
) -> ApiResult<Json<DropSnapshot>> {
    let drop = coordinator::update_permission(&state, &slug, &auth.principal, body.private).await?;
    Ok(Json(DropSnapshot::from(drop)))
}

#[derive(Debug, Deserialize)]
pub struct FavoriteBody {
    pub favorite: bool,
}

/// `PATCH /api/content/{slug}/favorite` (§6).
#[utoipa::path(patch, path = "/api/content/{slug}/favorite", tag = "Drops",
    params(("slug" = String, Path)),
    responses((status = 200, description = "Updated", body = DropSnapshot), (status = 403, description = "Forbidden")))]
pub async fn update_favorite(
    State(state): State<AppState>,
    auth: Auth,
    Path(slug): Path<String>,
    Json(body): Json<FavoriteBody>,
) -> ApiResult<Json<DropSnapshot>> {
    let drop = coordinator::update_favorite(&state, &slug, &auth.principal, body.favorite).await?;
    Ok(Json(DropSnapshot::from(drop)))
}

#[derive(Debug, Deserialize)]
pub struct PasswordBody {
    pub new_password: String,
}

/// `PATCH /api/content/{slug}/password` (§6).
#[utoipa::path(patch, path = "/api/content/{slug}/password", tag = "Drops",
    params(("slug" = String, Path)),
    responses((status = 200, description = "Updated", body = DropSnapshot), (status = 403, description = "Forbidden")))]
pub async fn set_password(
    State(state): State<AppState>,
    auth: Auth,
    Path(slug): Path<String>,
    Json(body): Json<PasswordBody>,
) -> ApiResult<Json<DropSnapshot>> {
    let drop = coordinator::set_password(&state, &slug, &auth.principal, &body.new_password).await?;
    Ok(Json(DropSnapshot::from(drop)))
}

/// `PATCH /api/content/{slug}/reset` (§6): clears the passphrase.
#[utoipa::path(patch, path = "/api/content/{slug}/reset", tag = "Drops",
    params(("slug" = String, Path)),
    responses((status = 200, description = "Updated", body = DropSnapshot), (status = 403, description = "Forbidden")))]
pub async fn remove_password(
    State(state): State<AppState>,
    auth: Auth,
    Path(slug): Path<String>,
) -> ApiResult<Json<DropSnapshot>> {
    let drop = coordinator::remove_password(&state, &slug, &auth.principal).await?;
    Ok(Json(DropSnapshot::from(drop)))
}

/// `DELETE /api/content/{slug}` (§6). Owner-only; `password` is accepted for
/// interface symmetry with the read path but not consulted — ownership
/// alone gates a mutation (§4.3's closing paragraph).
#[utoipa::path(delete, path = "/api/content/{slug}", tag = "Drops",
    params(("slug" = String, Path)),
    responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden")))]
pub async fn delete(State(state): State<AppState>, auth: Auth, Path(slug): Path<String>) -> ApiResult<StatusCode> {
    coordinator::delete(&state, &slug, &auth.principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct KeycheckResponse {
    pub exists: bool,
}

/// `GET /api/content/keycheck/{slug}` (§6).
#[utoipa::path(get, path = "/api/content/keycheck/{slug}", tag = "Drops",
    params(("slug" = String, Path)),
    responses((status = 200, description = "Availability", body = KeycheckResponse)))]
pub async fn keycheck(State(state): State<AppState>, Path(slug): Path<String>) -> Json<KeycheckResponse> {
    let exists = coordinator::slug_exists(&state, &slug).await;
    Json(KeycheckResponse { exists })
}

/// `GET /api/content` (§4.2, §4.4): owner-only listing.
#[utoipa::path(get, path = "/api/content", tag = "Drops",
    responses((status = 200, description = "Owner's drops", body = [DropSnapshot]), (status = 401, description = "Authentication required")))]
pub async fn list(
    State(state): State<AppState>,
    auth: Auth,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<DropSnapshot>>> {
    let drops = coordinator::list(&state, &auth.principal, &params).await?;
    Ok(Json(drops.into_iter().map(DropSnapshot::from).collect()))
}

