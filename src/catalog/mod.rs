//! Entry catalog: discovery, normalization, and read-only queries.
//!
//! One **entry** pairs a video clip with its annotation JSON (grammar,
//! vocabulary, key phrases, conversation lines, and quiz questions) and an
//! optional attribution sidecar. Entries are built once per catalog load,
//! held immutably behind `Arc`, and replaced wholesale on reload.

pub mod builder;
pub mod ig_meta;
pub mod normalize;
pub mod store;

pub use builder::build_catalog;
pub use ig_meta::IgMeta;
pub use store::{Catalog, CatalogStore};

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Free-form classification block from the annotation file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
}

/// One grammar/vocabulary/phrase/conversation unit.
///
/// Annotation authors attach arbitrary display fields (`jp`, `kana`,
/// `meaning_en`, `register`, example blocks, ...); none is required, so the
/// item stays an opaque JSON object with an optional `id` used for
/// cross-referencing from quiz questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudyItem(pub serde_json::Map<String, Value>);

impl StudyItem {
    /// Cross-reference id, stringified and trimmed. Authors use both string
    /// and numeric ids.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// The four named study collections. Always present, possibly empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Items {
    pub grammar: Vec<StudyItem>,
    pub vocab: Vec<StudyItem>,
    pub key_phrases: Vec<StudyItem>,
    pub conversation: Vec<StudyItem>,
}

/// One question definition from an entry's quiz list.
///
/// `payload` and `answer` are type-specific and loosely authored, so they
/// stay as JSON maps; the quiz module reads them through lenient accessors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub targets: Vec<String>,
    #[serde(rename = "type")]
    pub qtype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_en: Option<String>,
    pub payload: serde_json::Map<String, Value>,
    pub answer: serde_json::Map<String, Value>,
}

/// Presentation hints passed through to the client untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiHints {
    pub recommended_order: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain_on_fail: Option<bool>,
}

/// Derived collection sizes, recomputed on every catalog load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub grammar: usize,
    pub vocab: usize,
    pub key_phrases: usize,
    pub conversation: usize,
    pub quiz: usize,
}

impl Counts {
    /// Counts must always equal the live collection lengths; this is the
    /// only constructor.
    pub fn derive(items: &Items, quiz: &[QuizItem]) -> Self {
        Self {
            grammar: items.grammar.len(),
            vocab: items.vocab.len(),
            key_phrases: items.key_phrases.len(),
            conversation: items.conversation.len(),
            quiz: quiz.len(),
        }
    }
}

/// One lesson unit: a clip plus everything learned from its sidecar files.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub id: String,
    pub title: String,
    pub meta: Meta,
    pub items: Items,
    pub quiz: Vec<QuizItem>,
    pub ui_hints: UiHints,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ig_meta: Option<IgMeta>,
    pub video_url: String,
    pub counts: Counts,
    /// Resolved absolute path of the clip. Internal bookkeeping only.
    #[serde(skip)]
    pub video_path: PathBuf,
    /// Resolved absolute path of the annotation file. Internal only.
    #[serde(skip)]
    pub annotation_path: PathBuf,
}

/// Listing-view projection of an entry: classification and counts without
/// the item/quiz bodies.
#[derive(Debug, Clone, Serialize)]
pub struct EntrySummary {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub counts: Counts,
    pub video_url: String,
}

impl EntrySummary {
    pub fn of(entry: &Entry) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            mode: entry.meta.mode.clone(),
            kind: entry.meta.kind.clone(),
            counts: entry.counts,
            video_url: entry.video_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_study_item_id_string() {
        let item: StudyItem = serde_json::from_value(json!({"id": " g1 "})).unwrap();
        assert_eq!(item.id(), Some("g1".to_string()));
    }

    #[test]
    fn test_study_item_id_numeric() {
        let item: StudyItem = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(item.id(), Some("3".to_string()));
    }

    #[test]
    fn test_study_item_id_missing_or_wrong_type() {
        let item: StudyItem = serde_json::from_value(json!({"jp": "猫"})).unwrap();
        assert_eq!(item.id(), None);

        let item: StudyItem = serde_json::from_value(json!({"id": [1, 2]})).unwrap();
        assert_eq!(item.id(), None);
    }

    #[test]
    fn test_counts_derive_matches_live_lengths() {
        let items = Items {
            grammar: vec![StudyItem::default(), StudyItem::default()],
            vocab: vec![StudyItem::default()],
            key_phrases: vec![],
            conversation: vec![StudyItem::default()],
        };
        let quiz = vec![QuizItem::default(), QuizItem::default(), QuizItem::default()];

        let counts = Counts::derive(&items, &quiz);
        assert_eq!(counts.grammar, items.grammar.len());
        assert_eq!(counts.vocab, items.vocab.len());
        assert_eq!(counts.key_phrases, items.key_phrases.len());
        assert_eq!(counts.conversation, items.conversation.len());
        assert_eq!(counts.quiz, quiz.len());
    }

    #[test]
    fn test_quiz_item_serializes_type_field() {
        let item = QuizItem {
            qtype: "mc_meaning".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["type"], "mc_meaning");
    }
}
