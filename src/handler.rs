//! HTTP request handlers for the media-portfolio API
//!
//! This module implements the request-handling surface:
//! - Uploading media through staging and the remote publisher
//! - Listing and tag-filtering media records
//! - Updating and deleting media records
//! - Admin profile lookup and update
//! - Visitor count and direct visitor recording

use axum::{
    body::Bytes,
    extract::{Multipart, Path, Request, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::database::{
    self, generate_id, AppState, TABLE_ADMINS, TABLE_MEDIA, TABLE_VISITORS,
};
use crate::error::ApiError;
use crate::middleware::client_ip;
use crate::model::{
    AdminProfile, MediaKind, MediaRecord, UpdateAdminRequest, UpdateFileRequest, VisitorRecord,
};

/// Uploads a new image or video.
///
/// The multipart form carries the binary under `file` plus `title`,
/// `tags` (comma-separated string) and `type` (`image` or `video`).
/// The file is staged locally, handed to the media host, and a
/// [`MediaRecord`] is created only after a durable URL came back — a
/// rejected or failed upload never leaves an orphan record.
///
/// # Response
///
/// - **201 Created** - the created record
/// - **400 Bad Request** - no file, missing title, or invalid type
/// - **415 Unsupported Media Type** - mime is not image/* or video/*
/// - **500 Internal Server Error** - the media host upload failed
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut file: Option<(String, String, Bytes)> = None;
    let mut title: Option<String> = None;
    let mut tags_raw: Option<String> = None;
    let mut kind_raw: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::Validation(format!("Invalid multipart payload: {err}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let original = field.file_name().unwrap_or("upload").to_string();
                let mime = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await.map_err(|err| {
                    ApiError::Validation(format!("Failed to read uploaded file: {err}"))
                })?;
                file = Some((original, mime, data));
            }
            "title" => title = Some(read_text_field(field).await?),
            "tags" => tags_raw = Some(read_text_field(field).await?),
            "type" => kind_raw = Some(read_text_field(field).await?),
            _ => {}
        }
    }

    let (original_name, mime_type, data) =
        file.ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;
    let title = title.ok_or_else(|| ApiError::Validation("title is required".to_string()))?;
    let kind = match kind_raw.as_deref() {
        Some("image") => MediaKind::Image,
        Some("video") => MediaKind::Video,
        _ => {
            return Err(ApiError::Validation(
                "type must be \"image\" or \"video\"".to_string(),
            ))
        }
    };

    // Mime validation happens inside staging, before any disk write
    let staged = state
        .staging
        .stage("file", &original_name, &mime_type, &data)
        .await?;

    let url = state
        .media_host
        .publish(&staged)
        .await
        .ok_or(ApiError::PublishFailed)?;

    let now = Utc::now();
    let record = MediaRecord {
        id: generate_id(),
        title,
        image_url: url,
        like_count: 0,
        tags: split_tags(tags_raw.as_deref()),
        kind,
        created_at: now,
        updated_at: now,
    };
    database::create(&state.db, TABLE_MEDIA, &record.id, &record)?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|err| ApiError::Validation(format!("Invalid multipart field: {err}")))
}

/// Splits the raw `tags` input on literal commas.
///
/// No trimming, no dedup: `"nature, dusk,"` becomes
/// `["nature", " dusk", ""]`. Whether trimming is intended is an open
/// question with the portfolio frontend; the historical behavior wins
/// for now.
fn split_tags(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(tags) if !tags.is_empty() => tags.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// Lists all media records, newest first.
pub async fn list_files(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let files = database::find_many(
        &state.db,
        TABLE_MEDIA,
        |_: &MediaRecord| true,
        |record| record.created_at,
    )?;

    Ok(Json(files))
}

/// Lists media records whose tag set contains the given tag, newest
/// first. Matching is case-sensitive and exact.
pub async fn list_files_by_tag(
    Path(tag): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let files = database::find_many(
        &state.db,
        TABLE_MEDIA,
        |record: &MediaRecord| record.tags.iter().any(|candidate| candidate == &tag),
        |record| record.created_at,
    )?;

    Ok(Json(files))
}

/// Updates title and/or tags of a media record.
///
/// The published URL and like count are immutable; absent fields are
/// left untouched.
///
/// # Response
///
/// - **200 OK** - the updated record
/// - **404 Not Found** - no record under this id
pub async fn update_file(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateFileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = database::update_by_id(&state.db, TABLE_MEDIA, &id, |record: &mut MediaRecord| {
        if let Some(title) = payload.title {
            record.title = title;
        }
        if let Some(tags) = payload.tags {
            record.tags = tags;
        }
        record.updated_at = Utc::now();
    })?
    .ok_or(ApiError::NotFound("File"))?;

    Ok(Json(updated))
}

/// Deletes a media record.
///
/// The remote-hosted file is not retracted; only the metadata record is
/// removed.
///
/// # Response
///
/// - **200 OK** - confirmation message
/// - **404 Not Found** - no record under this id
pub async fn delete_file(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    if !database::delete_by_id(&state.db, TABLE_MEDIA, &id)? {
        return Err(ApiError::NotFound("File"));
    }

    Ok(Json(json!({
        "message": "File deleted successfully"
    })))
}

/// Returns the operational admin profile.
///
/// Looks up the fixed email from the configuration; responds with JSON
/// `null` when no such record exists.
pub async fn get_admin(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let admin = database::find_one(&state.db, TABLE_ADMINS, |admin: &AdminProfile| {
        admin.email == state.config.admin_email
    })?;

    Ok(Json(admin))
}

/// Updates the admin profile. Guarded by the bearer-token middleware.
///
/// # Response
///
/// - **200 OK** - the updated profile
/// - **400 Bad Request** - the new email collides with another admin
/// - **404 Not Found** - no profile under this id
pub async fn update_admin(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateAdminRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Emails are unique across admin records; reject collisions with a
    // different record before touching anything.
    if let Some(email) = &payload.email {
        let collision = database::find_one(&state.db, TABLE_ADMINS, |admin: &AdminProfile| {
            &admin.email == email && admin.id != id
        })?;
        if collision.is_some() {
            return Err(ApiError::Validation(
                "Email is already used by another admin".to_string(),
            ));
        }
    }

    let updated =
        database::update_by_id(&state.db, TABLE_ADMINS, &id, |admin: &mut AdminProfile| {
            if let Some(name) = payload.name {
                admin.name = name;
            }
            if let Some(email) = payload.email {
                admin.email = email;
            }
            if let Some(contact_number) = payload.contact_number {
                admin.contact_number = contact_number;
            }
            if let Some(social_media) = payload.social_media {
                admin.social_media = social_media;
            }
            if let Some(description) = payload.description {
                admin.description = description;
            }
            admin.updated_at = Utc::now();
        })?
        .ok_or(ApiError::NotFound("Admin"))?;

    Ok(Json(updated))
}

/// Returns the total number of visitor records.
pub async fn visitor_count(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let total = database::count::<VisitorRecord, _>(&state.db, TABLE_VISITORS, |_| true)?;

    Ok(Json(json!({ "totalVisitors": total })))
}

/// Records a visit unconditionally.
///
/// Unlike the tracking middleware, this endpoint inserts a fresh record
/// on every call, even for an IP that already has one. The divergence is
/// intentional historical behavior; unifying the two paths is a pending
/// product decision.
pub async fn record_visitor(State(state): State<AppState>, request: Request) -> impl IntoResponse {
    let Some(ip) = client_ip(&request) else {
        return visitor_error();
    };

    let now = Utc::now();
    let record = VisitorRecord {
        id: generate_id(),
        ip,
        created_at: now,
        updated_at: now,
    };

    match database::create(&state.db, TABLE_VISITORS, &record.id, &record) {
        Ok(()) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "message": "Visitor recorded"
            })),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to record visitor");
            visitor_error()
        }
    }
}

fn visitor_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "success": false,
            "message": "Error recording visitor"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::split_tags;

    #[test]
    fn tags_split_verbatim_on_commas() {
        assert_eq!(split_tags(Some("nature,dusk")), vec!["nature", "dusk"]);
        // No trimming or dedup by design
        assert_eq!(
            split_tags(Some("nature, dusk,")),
            vec!["nature", " dusk", ""]
        );
        assert!(split_tags(Some("")).is_empty());
        assert!(split_tags(None).is_empty());
    }
}
