//! Test fixtures for catalog and quiz tests.
//!
//! `TestEnv` builds a disposable content root with clip/annotation/sidecar
//! files; the entry builders construct in-memory entries without touching
//! the filesystem. Compiled for tests (and the `testing` feature) only.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::catalog::{Counts, Entry, Items, Meta, QuizItem, UiHints};

/// Disposable content root mirroring the on-disk layout the catalog
/// builder scans: `<name>.mp4` + `<name>.json` (+ `<name>.mp4.json`).
pub struct TestEnv {
    /// Temporary directory, kept alive until drop.
    pub temp: TempDir,
}

impl TestEnv {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {
            temp: TempDir::new()?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    /// Write a clip and its annotation. `rel` is the extension-less
    /// root-relative path, e.g. `lesson1/ramen`.
    pub fn add_clip(&self, rel: &str, annotation: &Value) {
        self.add_media_only(rel);
        self.write(&format!("{rel}.json"), annotation.to_string().as_bytes());
    }

    /// Write a clip with no annotation sibling.
    pub fn add_media_only(&self, rel: &str) {
        self.write(&format!("{rel}.mp4"), b"\x00\x00\x00\x18ftypmp42");
    }

    /// Write annotation bytes verbatim, for malformed-JSON cases.
    pub fn add_raw_annotation(&self, rel: &str, text: &str) {
        self.write(&format!("{rel}.json"), text.as_bytes());
    }

    /// Write the attribution sidecar for a clip.
    pub fn add_attribution(&self, rel: &str, sidecar: &Value) {
        self.write(&format!("{rel}.mp4.json"), sidecar.to_string().as_bytes());
    }

    fn write(&self, rel: &str, bytes: &[u8]) {
        let path = self.root().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        fs::write(&path, bytes).expect("Failed to write fixture file");
    }
}

/// In-memory entry with a fixed pair of study items and the given quiz.
pub fn entry_with_quiz(id: &str, quiz: Vec<QuizItem>) -> Arc<Entry> {
    let items: Items = serde_json::from_value(json!({
        "grammar": [{"id": "g1", "jp": "〜ます"}],
        "vocab": [{"id": "v1", "jp": "猫"}],
        "key_phrases": [],
        "conversation": []
    }))
    .expect("Fixture items deserialize");
    let counts = Counts::derive(&items, &quiz);
    Arc::new(Entry {
        id: id.to_string(),
        title: format!("Entry {id}"),
        meta: Meta::default(),
        items,
        quiz,
        ui_hints: UiHints::default(),
        ig_meta: None,
        video_url: format!("/data/{id}.mp4"),
        counts,
        video_path: PathBuf::new(),
        annotation_path: PathBuf::new(),
    })
}

/// Multiple-choice quiz item with string options.
pub fn mc_item(options: &[&str], correct: usize) -> QuizItem {
    QuizItem {
        qtype: "mc_meaning".to_string(),
        payload: json!({"options": options})
            .as_object()
            .expect("Fixture payload is an object")
            .clone(),
        answer: json!({"correct_index": correct})
            .as_object()
            .expect("Fixture answer is an object")
            .clone(),
        ..Default::default()
    }
}
