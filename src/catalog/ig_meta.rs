//! Attribution metadata extracted from the `<clip>.mp4.json` sidecar.
//!
//! The sidecar is a scrape dump whose shape varies by scraper version, so
//! every field is resolved through a fallback chain. An entry with no usable
//! attribution simply has no block.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribution block for a clip's original poster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IgMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_pic_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Pull an attribution block out of a raw sidecar document.
///
/// Returns `None` when the document is not an object or carries none of the
/// fields worth displaying (username, avatar, date, description).
pub fn extract_ig_meta(raw: &Value) -> Option<IgMeta> {
    let map = raw.as_object()?;
    let owner = map.get("owner").and_then(Value::as_object);

    let username = str_at(map, "username")
        .or_else(|| owner.and_then(|o| str_at(o, "username")));
    let full_name = str_at(map, "fullname")
        .or_else(|| str_at(map, "full_name"))
        .or_else(|| owner.and_then(|o| str_at(o, "full_name")));
    let post_url = str_at(map, "post_url")
        .or_else(|| str_at(map, "postUrl"))
        .or_else(|| str_at(map, "permalink"));
    let profile_pic_url = str_at(map, "profile_pic_url")
        .or_else(|| owner.and_then(|o| nested_url(o, "hd_profile_pic_url_info")))
        .or_else(|| owner.and_then(|o| str_at(o, "profile_pic_url")))
        .or_else(|| owner.and_then(|o| nested_url(o, "profile_pic_url_info")));
    let post_date = display_at(map, "post_date")
        .or_else(|| display_at(map, "date"))
        .or_else(|| display_at(map, "taken_at_timestamp"))
        .or_else(|| display_at(map, "timestamp"));
    let description = str_at(map, "description").or_else(|| str_at(map, "caption"));

    if username.is_none() && profile_pic_url.is_none() && post_date.is_none()
        && description.is_none()
    {
        return None;
    }

    let profile_url = username
        .as_deref()
        .map(|u| format!("https://www.instagram.com/{}/", u));

    Some(IgMeta {
        username,
        full_name,
        profile_pic_url,
        post_url,
        profile_url,
        post_date,
        description,
    })
}

fn str_at(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

/// Timestamps arrive as strings or epoch numbers; either displays as text.
fn display_at(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn nested_url(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_object)
        .and_then(|info| str_at(info, "url"))
}
