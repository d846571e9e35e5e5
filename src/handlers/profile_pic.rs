//! Attribution-image proxy.
//!
//! Streams a clip's external avatar through the server so the client never
//! talks to the CDN directly. Only known-safe hosts are fetched; everything
//! else is rejected before any outbound request.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};

use super::entries::EntryQuery;
use super::error_response;
use crate::config;
use crate::state::AppState;

/// GET /api/profile-pic?id=...
pub async fn profile_pic(
    State(state): State<AppState>,
    Query(query): Query<EntryQuery>,
) -> Response {
    let Some(id) = query.id else {
        return error_response(StatusCode::BAD_REQUEST, "Missing id query param");
    };

    let url = state
        .catalog
        .snapshot()
        .get(&id)
        .and_then(|entry| entry.ig_meta.as_ref()?.profile_pic_url.clone());
    let Some(url) = url else {
        return error_response(StatusCode::NOT_FOUND, "Profile picture not found");
    };

    if !is_allowed_profile_host(&url) {
        return error_response(StatusCode::BAD_REQUEST, "Profile host not permitted");
    }

    let upstream = match state
        .http
        .get(&url)
        .header(header::ACCEPT, "image/*")
        .send()
        .await
    {
        Ok(resp) => resp,
        Err(e) => {
            tracing::error!("Profile picture proxy failed for {}: {}", id, e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Proxy failed");
        }
    };

    if !upstream.status().is_success() {
        let status = StatusCode::from_u16(upstream.status().as_u16())
            .unwrap_or(StatusCode::BAD_GATEWAY);
        return error_response(status, "Failed to load image");
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    match upstream.bytes().await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (
                    header::CACHE_CONTROL,
                    format!("public, max-age={}", config::PROFILE_PIC_CACHE_SECONDS),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Profile picture body read failed for {}: {}", id, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Proxy failed")
        }
    }
}

/// Exact or dot-suffix hostname match against the allow-list.
fn is_allowed_profile_host(url: &str) -> bool {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    config::PROFILE_PIC_ALLOWED_HOSTS
        .iter()
        .any(|safe| host == *safe || host.ends_with(&format!(".{safe}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_hosts() {
        assert!(is_allowed_profile_host("https://instagram.com/pic.jpg"));
        assert!(is_allowed_profile_host("https://www.instagram.com/pic.jpg"));
        assert!(is_allowed_profile_host(
            "https://scontent-lhr8-1.cdninstagram.com/v/t51/pic.jpg"
        ));
        assert!(is_allowed_profile_host("https://scontent.xx.fbcdn.net/pic.jpg"));
    }

    #[test]
    fn test_disallowed_hosts() {
        assert!(!is_allowed_profile_host("https://evil.example.com/pic.jpg"));
        assert!(!is_allowed_profile_host("https://notinstagram.com/pic.jpg"));
        assert!(!is_allowed_profile_host("https://instagram.com.evil.net/pic.jpg"));
    }

    #[test]
    fn test_unparseable_urls_rejected() {
        assert!(!is_allowed_profile_host(""));
        assert!(!is_allowed_profile_host("not a url"));
        assert!(!is_allowed_profile_host("/relative/path.jpg"));
    }
}
