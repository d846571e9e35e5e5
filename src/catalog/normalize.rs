//! Annotation schema normalization.
//!
//! Annotation files are hand- or pipeline-authored and frequently
//! incomplete, so normalization is a total function: every expected field
//! that is absent, wrong-typed, or malformed is replaced by its default and
//! logged, and the well-formed remainder of the document is kept.
//! Downstream code never re-checks optionality that this pass resolved.

use serde_json::{Map, Value};

use super::{Items, Meta, QuizItem, StudyItem, UiHints};

/// Annotation payload with every field populated.
#[derive(Debug, Clone, Default)]
pub struct NormalizedEntry {
    pub meta: Meta,
    pub items: Items,
    pub quiz: Vec<QuizItem>,
    pub ui_hints: UiHints,
}

/// Normalize an arbitrary parsed JSON document into a fully-defaulted
/// annotation payload. Never fails: a scalar, array, or `null` document
/// yields the all-empty payload.
pub fn normalize(raw: &Value) -> NormalizedEntry {
    let Some(doc) = raw.as_object() else {
        if !raw.is_null() {
            tracing::warn!("Annotation document is not an object; using defaults");
        }
        return NormalizedEntry::default();
    };

    NormalizedEntry {
        meta: normalize_meta(doc.get("meta")),
        items: normalize_items(doc.get("items")),
        quiz: normalize_quiz(doc.get("quiz")),
        ui_hints: normalize_ui_hints(doc.get("ui_hints")),
    }
}

fn normalize_meta(value: Option<&Value>) -> Meta {
    let Some(map) = value.and_then(Value::as_object) else {
        return Meta::default();
    };
    Meta {
        mode: string_field(map, "mode"),
        kind: string_field(map, "type"),
        title_en: string_field(map, "title_en"),
    }
}

fn normalize_items(value: Option<&Value>) -> Items {
    let Some(map) = value.and_then(Value::as_object) else {
        return Items::default();
    };
    Items {
        grammar: item_group(map, "grammar"),
        vocab: item_group(map, "vocab"),
        key_phrases: item_group(map, "key_phrases"),
        conversation: item_group(map, "conversation"),
    }
}

fn item_group(map: &Map<String, Value>, key: &str) -> Vec<StudyItem> {
    let Some(list) = map.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|element| match element.as_object() {
            Some(obj) => Some(StudyItem(obj.clone())),
            None => {
                tracing::debug!("Skipping non-object study item in `{}`", key);
                None
            }
        })
        .collect()
}

fn normalize_quiz(value: Option<&Value>) -> Vec<QuizItem> {
    let Some(list) = value.and_then(Value::as_array) else {
        return Vec::new();
    };
    list.iter()
        .filter_map(|element| match element.as_object() {
            Some(obj) => Some(normalize_quiz_item(obj)),
            None => {
                tracing::debug!("Skipping non-object quiz item");
                None
            }
        })
        .collect()
}

fn normalize_quiz_item(map: &Map<String, Value>) -> QuizItem {
    QuizItem {
        id: map.get("id").and_then(id_string),
        targets: map
            .get("targets")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(id_string).collect())
            .unwrap_or_default(),
        qtype: string_field(map, "type").unwrap_or_default(),
        prompt_en: string_field(map, "prompt_en"),
        payload: object_field(map, "payload"),
        answer: object_field(map, "answer"),
    }
}

fn normalize_ui_hints(value: Option<&Value>) -> UiHints {
    let Some(map) = value.and_then(Value::as_object) else {
        return UiHints::default();
    };
    UiHints {
        recommended_order: map
            .get("recommended_order")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(id_string).collect())
            .unwrap_or_default(),
        show_first: string_field(map, "show_first"),
        explain_on_fail: map.get("explain_on_fail").and_then(Value::as_bool),
    }
}

/// String field accessor; wrong-typed values count as absent.
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(String::from)
}

/// Object field accessor defaulting to the empty map.
fn object_field(map: &Map<String, Value>, key: &str) -> Map<String, Value> {
    map.get(key)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Ids and target references may be authored as strings or numbers.
fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
