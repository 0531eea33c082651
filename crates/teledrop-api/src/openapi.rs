//! OpenAPI schema and Swagger UI (§6's `/api/docs`, `/api/openapi.json`).

use utoipa::OpenApi;

use crate::auth;
use crate::handlers::{drops, health};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login,
        drops::create,
        drops::preview,
        drops::download,
        drops::list,
        drops::update_detail,
        drops::update_permission,
        drops::update_favorite,
        drops::set_password,
        drops::remove_password,
        drops::delete,
        drops::keycheck,
    ),
    components(schemas(
        teledrop_core::DropSnapshot,
        teledrop_core::ListSortKey,
        teledrop_core::SortOrder,
        auth::LoginRequest,
        auth::LoginResponse,
        drops::KeycheckResponse,
    )),
    tags(
        (name = "Drops", description = "Drop lifecycle: create, read, update, delete"),
        (name = "Auth", description = "Operator authentication"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;
