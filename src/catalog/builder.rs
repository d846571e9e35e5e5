//! Catalog building - pairing clips with their annotation sidecars.
//!
//! Scans the content root recursively for `*.mp4` files. Each clip needs a
//! sibling `<stem>.json` annotation to become an entry; a `<name>.mp4.json`
//! sidecar contributes attribution when present. No single bad file aborts
//! the scan: unreadable or malformed annotations produce a fully-defaulted
//! entry, anything else is skipped with a warning.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use super::ig_meta::extract_ig_meta;
use super::normalize::normalize;
use super::store::Catalog;
use super::{Counts, Entry, IgMeta};
use crate::config;

/// Build a fresh catalog snapshot from the content root.
///
/// A missing root is not an error: it yields an empty catalog so the server
/// still comes up and reports zero entries.
pub fn build_catalog(content_root: &Path) -> Catalog {
    let root = match fs::canonicalize(content_root) {
        Ok(root) => root,
        Err(_) => {
            tracing::warn!("Content root not found at {}", content_root.display());
            return Catalog::default();
        }
    };

    let mut media = Vec::new();
    collect_media(&root, &mut media);
    media.sort();

    let mut entries: HashMap<String, Arc<Entry>> = HashMap::new();
    for video_path in media {
        if let Some(entry) = load_entry(&root, &video_path) {
            entries.insert(entry.id.clone(), Arc::new(entry));
        }
    }

    tracing::info!("Loaded {} entries from {}", entries.len(), root.display());
    Catalog::new(entries)
}

/// Recursively gather `*.mp4` paths under `dir`. Unreadable directories are
/// skipped, not fatal.
fn collect_media(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Cannot read directory {}: {}", dir.display(), e);
            return;
        }
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            collect_media(&path, out);
        } else if has_media_extension(&path) {
            out.push(path);
        }
    }
}

fn has_media_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(config::MEDIA_EXT))
}

/// Resolve one clip into an entry, or `None` when it has no annotation or
/// any of its files escapes the content root.
fn load_entry(root: &Path, video_path: &Path) -> Option<Entry> {
    // Re-resolve through symlinks; a clip pointing outside the root is
    // rejected, not just warned about.
    let video_path = contained_path(root, video_path)?;

    let dir = video_path.parent()?;
    let stem = video_path.file_stem()?.to_str()?;
    let file_name = video_path.file_name()?.to_str()?;

    let annotation_path = dir.join(format!("{stem}.json"));
    if !annotation_path.exists() {
        return None;
    }
    let annotation_path = contained_path(root, &annotation_path)?;

    let normalized = match read_json(&annotation_path) {
        Ok(raw) => normalize(&raw),
        Err(e) => {
            tracing::warn!(
                "Failed to parse {}: {}; entry keeps defaults",
                annotation_path.display(),
                e
            );
            normalize(&Value::Null)
        }
    };

    let ig_meta = load_attribution(root, &dir.join(format!("{file_name}.json")));

    let rel = video_path.strip_prefix(root).ok()?;
    let id = derive_id(rel);
    let title = normalized
        .meta
        .title_en
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .unwrap_or_else(|| stem.to_string());

    let counts = Counts::derive(&normalized.items, &normalized.quiz);

    Some(Entry {
        video_url: build_video_url(&id),
        id,
        title,
        meta: normalized.meta,
        items: normalized.items,
        quiz: normalized.quiz,
        ui_hints: normalized.ui_hints,
        ig_meta,
        counts,
        video_path,
        annotation_path,
    })
}

/// Attribution sidecar is best-effort: missing, escaping, or malformed files
/// just mean no attribution block.
fn load_attribution(root: &Path, sidecar: &Path) -> Option<IgMeta> {
    if !sidecar.exists() {
        return None;
    }
    let sidecar = contained_path(root, sidecar)?;
    match read_json(&sidecar) {
        Ok(raw) => extract_ig_meta(&raw),
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", sidecar.display(), e);
            None
        }
    }
}

/// Canonicalize `path` and require it to still lie under `root`.
fn contained_path(root: &Path, path: &Path) -> Option<PathBuf> {
    let resolved = fs::canonicalize(path).ok()?;
    if resolved.starts_with(root) {
        Some(resolved)
    } else {
        tracing::warn!("Skipping {} outside the content root", path.display());
        None
    }
}

fn read_json(path: &Path) -> Result<Value, String> {
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map_err(|e| e.to_string())
}

/// Stable entry id: the clip's root-relative path, extension stripped,
/// separators canonicalized to `/`.
fn derive_id(rel: &Path) -> String {
    let mut segments: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if let Some(last) = segments.last_mut() {
        let suffix = format!(".{}", config::MEDIA_EXT);
        let cut = last.len().saturating_sub(suffix.len());
        if cut > 0
            && last.is_char_boundary(cut)
            && last[cut..].eq_ignore_ascii_case(&suffix)
        {
            last.truncate(cut);
        }
    }
    segments.join("/")
}

/// Media URL with each path segment percent-encoded, so ids containing `/`
/// stay addressable.
pub fn build_video_url(id: &str) -> String {
    let encoded: Vec<String> = id
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}.{}", config::MEDIA_URL_PREFIX, encoded.join("/"), config::MEDIA_EXT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;
    use serde_json::json;

    #[test]
    fn test_missing_root_yields_empty_catalog() {
        let catalog = build_catalog(Path::new("/nonexistent/clipquiz-data"));
        assert_eq!(catalog.len(), 0);
    }

    #[test]
    fn test_pairs_clip_with_annotation() {
        let env = TestEnv::new().unwrap();
        env.add_clip(
            "lesson/ramen",
            &json!({
                "meta": {"title_en": " Ordering ramen "},
                "items": {"grammar": [{"id": "g1"}], "vocab": [{"id": "v1"}, {"id": "v2"}]},
                "quiz": [{"type": "cloze", "payload": {"blanked": "ください"}}]
            }),
        );

        let catalog = build_catalog(env.root());
        assert_eq!(catalog.len(), 1);

        let entry = catalog.get("lesson/ramen").unwrap();
        assert_eq!(entry.title, "Ordering ramen");
        assert_eq!(entry.video_url, "/data/lesson/ramen.mp4");
        assert_eq!(entry.counts.grammar, 1);
        assert_eq!(entry.counts.vocab, 2);
        assert_eq!(entry.counts.quiz, 1);
        assert_eq!(entry.counts.quiz, entry.quiz.len());
    }

    #[test]
    fn test_title_falls_back_to_file_stem() {
        let env = TestEnv::new().unwrap();
        env.add_clip("solo", &json!({}));

        let catalog = build_catalog(env.root());
        assert_eq!(catalog.get("solo").unwrap().title, "solo");
    }

    #[test]
    fn test_skips_clip_without_annotation() {
        let env = TestEnv::new().unwrap();
        env.add_media_only("orphan");
        env.add_clip("paired", &json!({}));

        let catalog = build_catalog(env.root());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("orphan").is_none());
    }

    #[test]
    fn test_malformed_annotation_keeps_defaulted_entry() {
        let env = TestEnv::new().unwrap();
        env.add_media_only("broken");
        env.add_raw_annotation("broken", "{ not json !");

        let catalog = build_catalog(env.root());
        let entry = catalog.get("broken").unwrap();
        assert_eq!(entry.counts, Counts::default());
        assert!(entry.quiz.is_empty());
        assert_eq!(entry.title, "broken");
    }

    #[test]
    fn test_attribution_sidecar_merged() {
        let env = TestEnv::new().unwrap();
        env.add_clip("clip", &json!({}));
        env.add_attribution("clip", &json!({"username": "sensei"}));

        let catalog = build_catalog(env.root());
        let entry = catalog.get("clip").unwrap();
        assert_eq!(
            entry.ig_meta.as_ref().unwrap().username.as_deref(),
            Some("sensei")
        );
    }

    #[test]
    fn test_malformed_attribution_is_not_fatal() {
        let env = TestEnv::new().unwrap();
        env.add_clip("clip", &json!({}));
        std::fs::write(env.root().join("clip.mp4.json"), "not json").unwrap();

        let catalog = build_catalog(env.root());
        let entry = catalog.get("clip").unwrap();
        assert!(entry.ig_meta.is_none());
    }

    #[test]
    fn test_video_url_percent_encodes_segments() {
        let env = TestEnv::new().unwrap();
        env.add_clip("week 1/cafe talk", &json!({}));

        let catalog = build_catalog(env.root());
        let entry = catalog.get("week 1/cafe talk").unwrap();
        assert_eq!(entry.video_url, "/data/week%201/cafe%20talk.mp4");
    }

    #[test]
    fn test_derive_id_strips_extension_case_insensitively() {
        assert_eq!(derive_id(Path::new("a/b/clip.MP4")), "a/b/clip");
        assert_eq!(derive_id(Path::new("clip.mp4")), "clip");
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escaping_root_is_excluded() {
        let outside = tempfile::TempDir::new().unwrap();
        std::fs::write(outside.path().join("evil.mp4"), b"x").unwrap();
        std::fs::write(outside.path().join("evil.json"), "{}").unwrap();

        let env = TestEnv::new().unwrap();
        env.add_clip("good", &json!({}));
        std::os::unix::fs::symlink(
            outside.path().join("evil.mp4"),
            env.root().join("evil.mp4"),
        )
        .unwrap();
        std::os::unix::fs::symlink(
            outside.path().join("evil.json"),
            env.root().join("evil.json"),
        )
        .unwrap();

        let catalog = build_catalog(env.root());
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("evil").is_none());
    }
}
