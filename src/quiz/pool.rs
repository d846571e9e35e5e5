//! Question pool assembly.
//!
//! Questions are drawn from one or more entries into a flat, shuffled pool
//! capped at the session length. Each drawn question is a self-contained
//! snapshot copy carrying its source entry's study items, media locator,
//! and attribution, so grading and explanation lookup never reach back into
//! the catalog.

use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::Serialize;
use serde_json::{Map, Value};

use super::QuestionKind;
use crate::catalog::{Entry, IgMeta, Items, StudyItem};
use crate::config;

/// A quiz item denormalized with its source entry's context.
#[derive(Debug, Clone, Serialize)]
pub struct Question {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub targets: Vec<String>,
    #[serde(rename = "type")]
    pub qtype: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_en: Option<String>,
    pub payload: Map<String, Value>,
    pub answer: Map<String, Value>,
    pub entry_id: String,
    pub entry_title: String,
    pub items: Items,
    pub video_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ig_meta: Option<IgMeta>,
}

/// One left/right pairing from a match question's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchPair {
    pub left: String,
    pub right: String,
}

/// Which study collection a resolved target came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemGroup {
    Grammar,
    Vocabulary,
    KeyPhrases,
    Conversation,
}

impl ItemGroup {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Grammar => "Grammar",
            Self::Vocabulary => "Vocabulary",
            Self::KeyPhrases => "Key Phrases",
            Self::Conversation => "Conversation",
        }
    }
}

/// A study item matched by a question's `targets` list.
#[derive(Debug, Clone, Copy)]
pub struct TargetHit<'a> {
    pub group: ItemGroup,
    pub item: &'a StudyItem,
}

impl Question {
    fn from_entry(item: &crate::catalog::QuizItem, entry: &Entry) -> Self {
        Self {
            id: item.id.clone(),
            targets: item.targets.clone(),
            qtype: item.qtype.clone(),
            prompt_en: item.prompt_en.clone(),
            payload: item.payload.clone(),
            answer: item.answer.clone(),
            entry_id: entry.id.clone(),
            entry_title: entry.title.clone(),
            items: entry.items.clone(),
            video_url: entry.video_url.clone(),
            ig_meta: entry.ig_meta.clone(),
        }
    }

    pub fn kind(&self) -> QuestionKind {
        QuestionKind::parse(&self.qtype)
    }

    pub fn options(&self) -> Option<&Vec<Value>> {
        self.payload.get("options").and_then(Value::as_array)
    }

    /// Numeric correct index from the answer key. Non-integer or negative
    /// values count as absent.
    pub fn correct_index(&self) -> Option<usize> {
        self.answer
            .get("correct_index")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
    }

    /// Left/right pairs for match questions. Elements missing a side get
    /// the empty string rather than being dropped, so pair indices stay
    /// aligned with the authored payload.
    pub fn pairs(&self) -> Vec<MatchPair> {
        let Some(list) = self.payload.get("pairs").and_then(Value::as_array) else {
            return Vec::new();
        };
        list.iter()
            .map(|pair| MatchPair {
                left: pair_side(pair, "left"),
                right: pair_side(pair, "right"),
            })
            .collect()
    }

    /// Study items this question exercises, for the post-answer
    /// explanation panel. Lookup only; never affects grading.
    pub fn resolve_targets(&self) -> Vec<TargetHit<'_>> {
        let wanted: Vec<&str> = self.targets.iter().map(|t| t.trim()).collect();
        if wanted.is_empty() {
            return Vec::new();
        }

        let groups = [
            (ItemGroup::Grammar, &self.items.grammar),
            (ItemGroup::Vocabulary, &self.items.vocab),
            (ItemGroup::KeyPhrases, &self.items.key_phrases),
            (ItemGroup::Conversation, &self.items.conversation),
        ];

        let mut hits = Vec::new();
        for (group, items) in groups {
            for item in items {
                if let Some(id) = item.id() {
                    if wanted.contains(&id.as_str()) {
                        hits.push(TargetHit { group, item });
                    }
                }
            }
        }
        hits
    }
}

fn pair_side(pair: &Value, key: &str) -> String {
    match pair.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Flatten, shuffle, and cap the quiz items of the given entries.
pub fn assemble_pool(entries: &[Arc<Entry>]) -> Vec<Question> {
    let mut pool: Vec<Question> = entries
        .iter()
        .flat_map(|entry| entry.quiz.iter().map(|item| Question::from_entry(item, entry)))
        .collect();

    let mut rng = rand::rng();
    for question in &mut pool {
        shuffle_options(question, &mut rng);
    }
    pool.shuffle(&mut rng);
    pool.truncate(config::SESSION_QUESTION_COUNT);
    pool
}

/// Permute a choice question's presented options, keeping `correct_index`
/// pointed at the originally-correct value. An original index outside the
/// options range is left untouched.
fn shuffle_options(question: &mut Question, rng: &mut impl rand::Rng) {
    let Some(options) = question.options() else {
        return;
    };
    if options.is_empty() {
        return;
    }

    let mut decorated: Vec<(usize, Value)> = options.iter().cloned().enumerate().collect();
    decorated.shuffle(rng);

    if let Some(original) = question.correct_index() {
        if let Some(new_index) = decorated.iter().position(|(idx, _)| *idx == original) {
            question
                .answer
                .insert("correct_index".to_string(), Value::from(new_index as u64));
        }
    }

    let shuffled: Vec<Value> = decorated.into_iter().map(|(_, opt)| opt).collect();
    question
        .payload
        .insert("options".to_string(), Value::Array(shuffled));
}
