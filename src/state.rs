//! Application state shared across handlers.

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::CatalogStore;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Active catalog snapshot holder (reload swaps, readers never block)
    pub catalog: CatalogStore,

    /// Content root the catalog was built from; also served under /data
    pub content_root: PathBuf,

    /// Outbound client for the attribution-image proxy
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(catalog: CatalogStore, content_root: PathBuf) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (clipquiz)")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            catalog,
            content_root,
            http,
        }
    }
}
