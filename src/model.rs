//! Data models for the media-portfolio backend
//!
//! Record structures for the three collections plus the request payloads
//! accepted by the mutation endpoints. Wire names are camelCase to keep
//! the JSON surface stable for existing portfolio frontends.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The site owner's profile record.
///
/// The schema permits many admins but exactly one conceptual record is
/// used operationally: `/admins` queries the configured fixed email.
/// Created out-of-band (seed), mutated via `PUT /admin/{id}`, never
/// deleted through the API.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    /// Record identifier
    pub id: String,

    pub name: String,

    /// Unique across admin records; collisions on update are rejected
    pub email: String,

    pub contact_number: String,

    /// Platform name to profile URL, e.g. {"instagram": "https://..."}
    #[serde(default)]
    pub social_media: HashMap<String, String>,

    /// Free-text bio shown on the site
    pub description: String,

    /// Opaque credential secret; stored as-is, never interpreted here
    pub password: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Discriminates images from videos in a [`MediaRecord`].
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// A published media item.
///
/// Created on successful upload; only `title` and `tags` are mutable
/// afterwards. Deleting the record does not retract the remote file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MediaRecord {
    /// Record identifier
    pub id: String,

    pub title: String,

    /// Durable URL returned by the media host; set once, immutable.
    /// Named `imageUrl` on the wire for both kinds, a quirk kept for
    /// frontend compatibility.
    pub image_url: String,

    /// Never modified by any exposed endpoint
    #[serde(default)]
    pub like_count: u64,

    /// Unordered; duplicates permitted, input is split on literal commas
    /// with no trimming
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(rename = "type")]
    pub kind: MediaKind,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One tracked visitor IP.
///
/// The middleware path upserts by IP (at most one record per address);
/// the `POST /visitor` endpoint inserts unconditionally. Both behaviors
/// are intentional — see the endpoint docs.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    /// Record identifier
    pub id: String,

    /// Client IP as reported by X-Forwarded-For or the connection
    pub ip: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `PUT /files/{id}`. Absent fields are left untouched.
///
/// # Example
/// ```json
/// { "title": "Sunset over the bay", "tags": ["nature", "dusk"] }
/// ```
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFileRequest {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Body of `PUT /admin/{id}`. Absent fields are left untouched.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
    pub social_media: Option<HashMap<String, String>>,
    pub description: Option<String>,
}

/// Claims carried by an admin bearer token.
///
/// Decoded by the access guard and attached to request extensions.
/// No handler currently consumes them; the guard is effectively a
/// shared-secret gate rather than per-identity authorization.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AdminClaims {
    /// Admin identity the token was issued for
    pub sub: String,

    /// Expiry as a unix timestamp, enforced during verification
    pub exp: usize,
}
