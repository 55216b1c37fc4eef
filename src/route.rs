//! Route definitions for the media-portfolio API
//!
//! Configures the Axum router: endpoint table, fully open CORS, the
//! always-on visitor-tracking layer, and the access guard around the
//! admin mutation.

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use axum::middleware;

use crate::database::AppState;
use crate::handler::{
    delete_file, get_admin, list_files, list_files_by_tag, record_visitor, update_admin,
    update_file, upload_file, visitor_count,
};
use crate::middleware::{auth_middleware, track_visitor};

/// Creates and configures the application router.
///
/// # Route Definitions
///
/// - `POST /upload` - multipart upload staged and published remotely
/// - `GET /files` - all media records, newest first
/// - `GET /files/tag/{tag}` - records carrying the tag, newest first
/// - `PUT /files/{id}` - update title/tags
/// - `DELETE /files/{id}` - delete a record
/// - `GET /admins` - fixed-email admin lookup
/// - `PUT /admin/{id}` - update the admin profile (bearer token required)
/// - `GET /visitors` - total visitor count
/// - `POST /visitor` - unconditional visitor insert
///
/// Every route passes through the visitor-tracking layer; CORS is wide
/// open for the portfolio frontend.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The admin mutation is the only guarded operation
    let admin_routes = Router::new()
        .route("/admin/{id}", put(update_admin))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/upload", post(upload_file))
        .route("/files", get(list_files))
        .route("/files/tag/{tag}", get(list_files_by_tag))
        .route("/files/{id}", put(update_file).delete(delete_file))
        .route("/admins", get(get_admin))
        .route("/visitors", get(visitor_count))
        .route("/visitor", post(record_visitor))
        .merge(admin_routes)
        // Track every inbound request, guarded or not
        .layer(middleware::from_fn_with_state(state.clone(), track_visitor))
        .layer(cors)
        .with_state(state)
}
