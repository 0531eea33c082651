//! The Drop Lifecycle Coordinator (§4.4).
//!
//! Owns every operation that reads or mutates a drop: create, preview, list,
//! the detail/permission/favorite/password mutators, and delete. Mutating
//! operations are owner-only and use [`require_owner`]; reads go through
//! [`teledrop_core::evaluate`], which additionally accounts for passphrases
//! and drop privacy.

use axum::extract::multipart::Field;
use bytes::Bytes;
use chrono::Utc;
use sha2::{Digest, Sha256};
use teledrop_core::{AuthPrincipal, Drop, Error, File, ListParams, Result};
use teledrop_storage::StorageBackend;
use uuid::Uuid;

use crate::state::AppState;

/// Mutating operations require the caller to own the drop outright — unlike
/// [`teledrop_core::evaluate`], there is no passphrase escape hatch for a
/// non-owner here (§4.3's closing paragraph).
pub fn require_owner(drop: &Drop, caller: &AuthPrincipal) -> Result<()> {
    if caller.owns(drop) {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

fn validate_media_type(media_type: &str) -> Result<String> {
    if media_type.is_empty() {
        return Ok(teledrop_core::defaults::DEFAULT_MEDIA_TYPE.to_string());
    }
    if media_type.split('/').count() == 2 && !media_type.starts_with('/') && !media_type.ends_with('/') {
        Ok(media_type.to_string())
    } else {
        Err(Error::ValidationError(format!("invalid media type '{media_type}'")))
    }
}

fn validate_title(title: &Option<String>) -> Result<()> {
    if let Some(t) = title {
        if t.chars().count() > teledrop_core::defaults::TITLE_MAX_LENGTH {
            return Err(Error::ValidationError("title exceeds maximum length".to_string()));
        }
    }
    Ok(())
}

fn validate_description(description: &Option<String>) -> Result<()> {
    if let Some(d) = description {
        if d.chars().count() > teledrop_core::defaults::DESCRIPTION_MAX_LENGTH {
            return Err(Error::ValidationError("description exceeds maximum length".to_string()));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub struct CreateRequest {
    pub owner_id: String,
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub passphrase: Option<String>,
    pub private: bool,
    pub favorite: bool,
    pub file_name: String,
    pub media_type: String,
}

/// Create a drop from a streaming multipart field (§4.4 Create).
///
/// Streams the upload into the blob store under its final storage key
/// *before* any Metadata Store row exists, then inserts the fully-formed
/// `Drop`+`File` row in a single committed `create()` call. A crash or
/// failure at any point before that insert leaves only an orphan blob under
/// a content-addressed key nothing else references — never a committed row
/// pointing at missing or unfinished content, and re-running Create with the
/// same user-supplied slug always succeeds because no row for the failed
/// attempt was ever committed (§4.4 invariants 1/3/4, testable property #3).
pub async fn create(state: &AppState, req: CreateRequest, mut field: Field<'_>) -> Result<Drop> {
    validate_title(&req.title)?;
    validate_description(&req.description)?;
    let media_type = validate_media_type(&req.media_type)?;
    if let Some(slug) = &req.slug {
        teledrop_core::slug::validate_with_reserved(slug, &state.reserved_slugs)?;
    }
    if let Some(passphrase) = &req.passphrase {
        teledrop_crypto::validate_passphrase_length(passphrase)
            .map_err(|e| Error::ValidationError(e.to_string()))?;
    }

    let passphrase_hash = req
        .passphrase
        .as_deref()
        .map(|p| teledrop_crypto::hash_passphrase(p, state.argon2))
        .transpose()
        .map_err(|e| Error::ValidationError(e.to_string()))?;

    let drop_id = Uuid::now_v7();
    let file_id = Uuid::now_v7();
    let storage_key = teledrop_storage::derive_storage_key(file_id);
    let now = Utc::now();

    let (size, content_hash) = match stream_into_blob(state, &storage_key, &mut field).await {
        Ok(result) => result,
        Err(e) => {
            let _ = state.storage.delete(&storage_key).await;
            return Err(e);
        }
    };

    let finished = Drop {
        id: drop_id,
        slug: String::new(),
        title: req.title,
        description: req.description,
        passphrase_hash,
        private: req.private,
        favorite: req.favorite,
        owner_id: req.owner_id,
        created_at: now,
        updated_at: now,
        file: File {
            id: file_id,
            drop_id,
            name: req.file_name,
            media_type,
            size,
            content_hash,
            storage_key: storage_key.clone(),
            created_at: now,
        },
    };

    match resolve_slug_and_insert(state, finished, req.slug.as_deref()).await {
        Ok(drop) => Ok(drop),
        Err(e) => {
            let _ = state.storage.delete(&storage_key).await;
            Err(e)
        }
    }
}

async fn resolve_slug_and_insert(state: &AppState, mut finished: Drop, requested: Option<&str>) -> Result<Drop> {
    if let Some(slug) = requested {
        finished.slug = slug.to_string();
        return state.drops.create(finished).await;
    }

    for _ in 0..teledrop_core::defaults::AUTO_SLUG_MAX_ATTEMPTS {
        let candidate = teledrop_core::slug::generate_candidate_with(state.slug_length, &state.slug_alphabet);
        finished.slug = candidate;
        match state.drops.create(finished.clone()).await {
            Ok(drop) => return Ok(drop),
            Err(Error::SlugTaken(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Err(Error::SlugExhausted(teledrop_core::defaults::AUTO_SLUG_MAX_ATTEMPTS))
}

async fn stream_into_blob(state: &AppState, storage_key: &str, field: &mut Field<'_>) -> Result<(i64, String)> {
    let mut writer = state
        .storage
        .open_write(storage_key)
        .await
        .map_err(|e| Error::Storage(e.to_string()))?;

    let mut hasher = Sha256::new();
    let mut total: u64 = 0;

    loop {
        let chunk = field
            .chunk()
            .await
            .map_err(|e| Error::ValidationError(format!("malformed upload: {e}")))?;
        let Some(chunk) = chunk else { break };

        total += chunk.len() as u64;
        if state.max_upload_bytes > 0 && total > state.max_upload_bytes {
            let _ = writer.abort().await;
            return Err(Error::SizeLimitExceeded {
                limit: state.max_upload_bytes,
            });
        }

        hasher.update(&chunk);
        if let Err(e) = writer.write_chunk(chunk).await {
            let _ = writer.abort().await;
            return Err(Error::Storage(e.to_string()));
        }
    }

    writer.commit().await.map_err(|e| Error::Storage(e.to_string()))?;
    Ok((total as i64, hex::encode(hasher.finalize())))
}

/// Preview (§4.4 Read/List): resolve the drop by slug and run the Access
/// Evaluator. Returns the full [`Drop`] on `Allow`; handlers project it to
/// [`teledrop_core::DropSnapshot`] before serializing.
pub async fn preview(state: &AppState, slug: &str, caller: &AuthPrincipal, passphrase: Option<&str>) -> Result<Drop> {
    let drop = match state.drops.find_by_slug(slug).await {
        Ok(drop) => Some(drop),
        Err(Error::NotFound(_)) => None,
        Err(e) => return Err(e),
    };

    let decision = teledrop_core::evaluate(drop.as_ref(), caller, passphrase);
    match decision {
        teledrop_core::Decision::Allow => Ok(drop.expect("Allow implies a resolved drop")),
        teledrop_core::Decision::DenyNotFound => Err(Error::NotFound(slug.to_string())),
        teledrop_core::Decision::DenyAuthRequired => Err(Error::AuthRequired),
        teledrop_core::Decision::DenyForbidden => Err(Error::Forbidden),
        teledrop_core::Decision::DenyPasswordRequired => Err(Error::PasswordRequired),
        teledrop_core::Decision::DenyPasswordInvalid => Err(Error::PasswordInvalid),
    }
}

/// List (§4.2, §4.4): owner-only, scoped server-side to `caller`'s drops.
pub async fn list(state: &AppState, caller: &AuthPrincipal, params: &ListParams) -> Result<Vec<Drop>> {
    let AuthPrincipal::Owner { identity } = caller else {
        return Err(Error::AuthRequired);
    };
    state.drops.list(identity, params).await
}

async fn load_owned(state: &AppState, slug: &str, caller: &AuthPrincipal) -> Result<Drop> {
    let drop = state.drops.find_by_slug(slug).await?;
    require_owner(&drop, caller)?;
    Ok(drop)
}

/// Update detail (§4.4): partial `{title, description}` update, owner-only.
pub async fn update_detail(
    state: &AppState,
    slug: &str,
    caller: &AuthPrincipal,
    title: Option<Option<String>>,
    description: Option<Option<String>>,
) -> Result<Drop> {
    let mut drop = load_owned(state, slug, caller).await?;
    if let Some(title) = title {
        validate_title(&title)?;
        drop.title = title;
    }
    if let Some(description) = description {
        validate_description(&description)?;
        drop.description = description;
    }
    drop.updated_at = Utc::now();
    state.drops.update(drop).await
}

/// Update permission (§4.4): toggles `private`, owner-only.
pub async fn update_permission(state: &AppState, slug: &str, caller: &AuthPrincipal, private: bool) -> Result<Drop> {
    let mut drop = load_owned(state, slug, caller).await?;
    drop.private = private;
    drop.updated_at = Utc::now();
    state.drops.update(drop).await
}

/// Update favorite (§4.4): toggles `favorite` without touching `updated_at`
/// (§9's fixed policy — not a configurable behavior).
pub async fn update_favorite(state: &AppState, slug: &str, caller: &AuthPrincipal, favorite: bool) -> Result<Drop> {
    let mut drop = load_owned(state, slug, caller).await?;
    drop.favorite = favorite;
    state.drops.update(drop).await
}

/// Set/rotate password (§4.4): owner-only, recomputes the Argon2 verifier.
pub async fn set_password(state: &AppState, slug: &str, caller: &AuthPrincipal, new_password: &str) -> Result<Drop> {
    teledrop_crypto::validate_passphrase_length(new_password).map_err(|e| Error::ValidationError(e.to_string()))?;
    let mut drop = load_owned(state, slug, caller).await?;
    drop.passphrase_hash =
        Some(teledrop_crypto::hash_passphrase(new_password, state.argon2).map_err(|e| Error::ValidationError(e.to_string()))?);
    drop.updated_at = Utc::now();
    state.drops.update(drop).await
}

/// Remove password (§4.4): owner-only, clears `passphrase_hash`.
pub async fn remove_password(state: &AppState, slug: &str, caller: &AuthPrincipal) -> Result<Drop> {
    let mut drop = load_owned(state, slug, caller).await?;
    drop.passphrase_hash = None;
    drop.updated_at = Utc::now();
    state.drops.update(drop).await
}

/// Delete (§4.4): commits the Metadata Store delete first, then best-effort
/// reclaims the blob — a crash between the two steps leaves only a
/// recoverable orphan blob, never a dangling row.
pub async fn delete(state: &AppState, slug: &str, caller: &AuthPrincipal) -> Result<()> {
    let drop = load_owned(state, slug, caller).await?;
    let deleted = state.drops.delete(drop.id).await?;
    if let Err(e) = state.storage.delete(&deleted.file.storage_key).await {
        tracing::warn!(
            drop_id = %deleted.id,
            storage_key = %deleted.file.storage_key,
            error = %e,
            "coordinator: post-commit blob reclaim failed, orphan left for the startup sweep"
        );
    }
    Ok(())
}

/// Slug-availability check (§4.4): not authoritative, a UI convenience only.
pub async fn slug_exists(state: &AppState, slug: &str) -> bool {
    state.drops.find_by_slug(slug).await.is_ok()
}
