//! Core data models for teledrop.
//!
//! These types are shared across every teledrop crate and represent the two
//! persisted entities (§3), the caller identity the Access Evaluator reasons
//! about (§4.3), and the request/response shapes the HTTP surface exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A drop: one slug-addressed share backed by exactly one file (invariant 1, §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Drop {
    pub id: Uuid,
    pub slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Argon2id PHC string, or `None` if the drop has no passphrase.
    pub passphrase_hash: Option<String>,
    pub private: bool,
    pub favorite: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub file: File,
}

impl Drop {
    /// Whether presenting a passphrase is required to read this drop's content.
    pub fn has_passphrase(&self) -> bool {
        self.passphrase_hash.is_some()
    }
}

/// The single file backing a drop (invariant 1, §3: one file per drop).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct File {
    pub id: Uuid,
    pub drop_id: Uuid,
    pub name: String,
    pub media_type: String,
    pub size: i64,
    /// Lowercase hex SHA-256 digest of the file content. No algorithm prefix (§3).
    pub content_hash: String,
    /// Opaque key into the Blob Store; never exposed over HTTP.
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

/// The public projection of a [`Drop`] returned over HTTP (§6).
///
/// Omits `passphrase_hash` and `storage_key`: neither the verifier nor the
/// blob location is ever serialized to a caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DropSnapshot {
    pub id: Uuid,
    pub slug: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub has_passphrase: bool,
    pub private: bool,
    pub favorite: bool,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub file_name: String,
    pub media_type: String,
    pub file_size: i64,
}

impl From<&Drop> for DropSnapshot {
    fn from(drop: &Drop) -> Self {
        Self {
            id: drop.id,
            slug: drop.slug.clone(),
            title: drop.title.clone(),
            description: drop.description.clone(),
            has_passphrase: drop.has_passphrase(),
            private: drop.private,
            favorite: drop.favorite,
            owner_id: drop.owner_id.clone(),
            created_at: drop.created_at,
            updated_at: drop.updated_at,
            file_name: drop.file.name.clone(),
            media_type: drop.file.media_type.clone(),
            file_size: drop.file.size,
        }
    }
}

impl From<Drop> for DropSnapshot {
    fn from(drop: Drop) -> Self {
        DropSnapshot::from(&drop)
    }
}

/// The caller identity the Access Evaluator reasons about (§4.3).
///
/// Teledrop has exactly one owner identity. Anything that authenticates as
/// that owner — the bundled JWT verifier, or an API key resolved by an
/// external identity provider — collapses to `Owner` before it ever reaches
/// the evaluator; the evaluator itself never inspects scopes or key IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPrincipal {
    /// The single operator identity, authenticated via the bundled verifier.
    Owner { identity: String },
    /// No credentials were presented, or they did not verify.
    Anonymous,
}

impl AuthPrincipal {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, AuthPrincipal::Anonymous)
    }

    /// Whether this principal is the owner of `drop`.
    ///
    /// Teledrop has a single owner, so any authenticated principal owns
    /// every drop; this indirection exists so the evaluator reads the same
    /// way a multi-tenant version of the check would.
    pub fn owns(&self, drop: &Drop) -> bool {
        match self {
            AuthPrincipal::Owner { identity } => identity == &drop.owner_id,
            AuthPrincipal::Anonymous => false,
        }
    }
}

/// Outcome of the Access Evaluator (§4.3's five-rule decision table).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    DenyNotFound,
    DenyAuthRequired,
    DenyPasswordRequired,
    DenyPasswordInvalid,
    DenyForbidden,
}

impl Decision {
    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Field a drop listing may be sorted by (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ListSortKey {
    CreatedAt,
    Title,
    Size,
}

impl Default for ListSortKey {
    fn default() -> Self {
        ListSortKey::CreatedAt
    }
}

/// Sort direction for a drop listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Desc
    }
}

/// Pagination and sort parameters for listing the owner's drops (§4.2).
#[derive(Debug, Clone, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub sort: ListSortKey,
    #[serde(default)]
    pub order: SortOrder,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Fields accepted when creating a drop (§4.4).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDropRequest {
    /// Caller-chosen slug. `None` triggers auto-generation (§4.4 step 2).
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub passphrase: Option<String>,
    #[serde(default)]
    pub private: bool,
}

/// Fields accepted when updating a drop's metadata (§4.4).
///
/// Every field is independently optional: a field left absent is left
/// unchanged, while a field explicitly set to `null` clears it (the HTTP
/// layer distinguishes the two with `Option<Option<T>>` wrapping; this
/// struct models the already-disambiguated intent).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDropRequest {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub passphrase: Option<Option<String>>,
    pub private: Option<bool>,
    pub favorite: Option<bool>,
}
