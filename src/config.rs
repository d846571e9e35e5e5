//! Application configuration constants.
//!
//! Centralizes the values the server and quiz engine share, plus the
//! content-root loader with its priority chain.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Content Root Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    content: Option<ContentConfig>,
}

#[derive(Debug, Deserialize)]
struct ContentConfig {
    root: Option<String>,
}

/// Load the content root with priority: config.toml > DATA_ROOT env > default.
///
/// The env override allows pointing isolated server instances at disposable
/// content roots, e.g. `DATA_ROOT=data/test PORT=5175 cargo run`.
pub fn load_content_root() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    if let Ok(contents) = std::fs::read_to_string("config.toml") {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            if let Some(content) = config.content {
                if let Some(root) = content.root {
                    tracing::info!("Using content root from config.toml: {}", root);
                    return PathBuf::from(root);
                }
            }
        }
    }

    // Priority 2: DATA_ROOT env
    if let Ok(root) = std::env::var("DATA_ROOT") {
        tracing::info!("Using content root from DATA_ROOT env: {}", root);
        return PathBuf::from(root);
    }

    // Default
    let default = PathBuf::from("data");
    tracing::info!("Using default content root: {}", default.display());
    default
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Default server port
pub const SERVER_PORT: u16 = 5174;

/// Server port with PORT env override
pub fn server_port() -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(SERVER_PORT)
}

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, server_port())
}

// ==================== Media Configuration ====================

/// Clip file extension scanned for under the content root
pub const MEDIA_EXT: &str = "mp4";

/// URL prefix the content root is served under
pub const MEDIA_URL_PREFIX: &str = "/data";

// ==================== Quiz Configuration ====================

/// Questions per quiz session; smaller pools run short
pub const SESSION_QUESTION_COUNT: usize = 10;

// ==================== Attribution Proxy Configuration ====================

/// Hosts the profile-picture proxy will fetch from
pub const PROFILE_PIC_ALLOWED_HOSTS: [&str; 3] =
    ["instagram.com", "cdninstagram.com", "fbcdn.net"];

/// Cache lifetime advertised on proxied profile pictures, in seconds
pub const PROFILE_PIC_CACHE_SECONDS: u32 = 86_400;
