//! Process configuration
//!
//! All environment access happens here, once, at startup. The resulting
//! [`Config`] is shared through the application state so handlers and
//! middleware never read the environment themselves.

use std::env;
use std::path::PathBuf;

/// Runtime configuration assembled from environment variables.
///
/// # Environment Variables
///
/// - `PORT` - Server port number (default: 5000)
/// - `DATABASE_URL` - Path to the embedded database file (default: "portfolio.db")
/// - `JWT_SECRET` - Shared secret for verifying admin bearer tokens.
///   When unset, every guarded request fails with 401 at verify time.
/// - `MEDIA_HOST_URL` - Upload endpoint of the external media host.
///   When unset, every publish attempt fails and uploads return 500.
/// - `ADMIN_EMAIL` - Email of the operational admin profile
/// - `UPLOAD_DIR` - Transient staging directory for uploads (default: "uploads")
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP server binds to
    pub port: u16,

    /// File path of the embedded redb database
    pub database_path: String,

    /// HS256 secret for the access guard; `None` means verification
    /// can never succeed
    pub jwt_secret: Option<String>,

    /// Where staged files are forwarded to for durable hosting
    pub media_host_url: String,

    /// The fixed email `/admins` looks up
    pub admin_email: String,

    /// Local directory for temporarily staged uploads; contents are not
    /// durable and may be cleaned up by an external process
    pub upload_dir: PathBuf,
}

impl Config {
    /// Reads the configuration from the environment, applying defaults
    /// for everything that can reasonably have one.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        Config {
            port,
            database_path: env::var("DATABASE_URL").unwrap_or_else(|_| "portfolio.db".to_string()),
            jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            media_host_url: env::var("MEDIA_HOST_URL").unwrap_or_default(),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@portfolio.local".to_string()),
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("uploads")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        // Only checks the derived defaults; env vars set by the host
        // shell would make stronger assertions flaky.
        let config = Config::from_env();
        assert!(config.port > 0);
        assert!(!config.database_path.is_empty());
    }
}
