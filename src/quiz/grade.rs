//! Answer grading and feedback text derivation.
//!
//! Grading is deterministic and pure: the same question and response always
//! produce the same verdict, and nothing here touches I/O or session state.
//! Display helpers (`correct_display_text`, `format_user_response`) derive
//! feedback strings for the UI and are never consulted for correctness.

use serde_json::Value;

use super::pool::Question;
use super::{QuestionKind, QuizResponse};

/// Grade a response against a question. Unknown-typed questions grade as
/// multiple-choice when their answer key carries a numeric correct index,
/// and as incorrect otherwise.
pub fn grade(question: &Question, response: &QuizResponse) -> bool {
    match question.kind() {
        QuestionKind::MultipleChoice | QuestionKind::ChooseBestReply => {
            grade_choice(question, response)
        }
        QuestionKind::Cloze => match response {
            QuizResponse::Text(text) => grade_cloze(question, text),
            _ => false,
        },
        QuestionKind::Match => match response {
            QuizResponse::Matches(chosen) => grade_match(question, chosen),
            _ => false,
        },
        QuestionKind::Unknown => {
            question.correct_index().is_some() && grade_choice(question, response)
        }
    }
}

/// Submit-eligibility gate. Rejection here is a UI-level no-op, not an
/// incorrect verdict.
pub fn can_submit(question: &Question, response: &QuizResponse) -> bool {
    match question.kind() {
        QuestionKind::Cloze => {
            matches!(response, QuizResponse::Text(text) if !text.trim().is_empty())
        }
        QuestionKind::Match => match response {
            QuizResponse::Matches(chosen) => question
                .pairs()
                .iter()
                .enumerate()
                .all(|(idx, _)| chosen.get(&idx).is_some_and(|v| !v.trim().is_empty())),
            _ => false,
        },
        QuestionKind::MultipleChoice | QuestionKind::ChooseBestReply => {
            matches!(response, QuizResponse::Choice(_))
        }
        QuestionKind::Unknown => {
            if question.correct_index().is_some() {
                matches!(response, QuizResponse::Choice(_))
            } else {
                true
            }
        }
    }
}

fn grade_choice(question: &Question, response: &QuizResponse) -> bool {
    match (response, question.correct_index()) {
        (QuizResponse::Choice(chosen), Some(correct)) => *chosen == correct,
        _ => false,
    }
}

/// Cloze: trimmed, case-insensitive equality against any non-empty
/// candidate from the answer key or the blanked text itself.
fn grade_cloze(question: &Question, raw: &str) -> bool {
    let response = raw.trim();
    if response.is_empty() {
        return false;
    }

    cloze_candidates(question).iter().any(|candidate| {
        candidate.as_str() == response || candidate.to_lowercase() == response.to_lowercase()
    })
}

fn cloze_candidates(question: &Question) -> Vec<String> {
    [
        question.answer.get("correct_text"),
        question.answer.get("correct"),
        question.payload.get("blanked"),
    ]
    .into_iter()
    .flatten()
    .map(normalized_text)
    .filter(|c| !c.is_empty())
    .collect()
}

/// Match: every authored pair must have a trimmed-equal response at its
/// index. A pairless question is defined as incorrect.
fn grade_match(
    question: &Question,
    chosen: &std::collections::BTreeMap<usize, String>,
) -> bool {
    let pairs = question.pairs();
    if pairs.is_empty() {
        return false;
    }
    pairs.iter().enumerate().all(|(idx, pair)| {
        let picked = chosen.get(&idx).map(|v| v.trim()).unwrap_or("");
        picked == pair.right.trim()
    })
}

/// Stringify-and-trim, the normalization both graders share.
fn normalized_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Option values are usually strings but authors occasionally use numbers.
fn value_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// The "Answer: ..." line shown after grading. Priority per question type:
/// chosen option text, match pair diff/listing, explicit correct-text
/// field, blanked text, pair listing. Empty when nothing applies.
pub fn correct_display_text(question: &Question, response: Option<&QuizResponse>) -> String {
    if let (Some(correct), Some(options)) = (question.correct_index(), question.options()) {
        if let Some(option) = options.get(correct) {
            return value_display(option);
        }
    }

    if question.kind() == QuestionKind::Match {
        let pairs = question.pairs();
        if pairs.is_empty() {
            return String::new();
        }
        let chosen = match response {
            Some(QuizResponse::Matches(map)) => Some(map),
            _ => None,
        };
        let mut misses = Vec::new();
        for (idx, pair) in pairs.iter().enumerate() {
            let picked = chosen.and_then(|m| m.get(&idx));
            if picked.map(String::as_str) != Some(pair.right.as_str()) {
                match picked {
                    Some(p) => misses.push(format!(
                        "{} → {} (you picked {})",
                        pair.left, pair.right, p
                    )),
                    None => misses.push(format!("{} → {}", pair.left, pair.right)),
                }
            }
        }
        if misses.is_empty() {
            return pair_listing(&pairs);
        }
        return misses.join(" | ");
    }

    if let Some(text) = question.answer.get("correct_text").and_then(Value::as_str) {
        if !text.is_empty() {
            return text.to_string();
        }
    }
    if let Some(text) = question.payload.get("blanked").and_then(Value::as_str) {
        if !text.is_empty() {
            return text.to_string();
        }
    }
    let pairs = question.pairs();
    if !pairs.is_empty() {
        return pair_listing(&pairs);
    }
    String::new()
}

/// The "You: ..." line in the finish summary.
pub fn format_user_response(question: &Question, response: Option<&QuizResponse>) -> String {
    const NO_ANSWER: &str = "No answer";

    match question.kind() {
        QuestionKind::Cloze => match response {
            Some(QuizResponse::Text(text)) if !text.is_empty() => text.clone(),
            _ => NO_ANSWER.to_string(),
        },
        QuestionKind::Match => {
            let pairs = question.pairs();
            if pairs.is_empty() {
                return NO_ANSWER.to_string();
            }
            let chosen = match response {
                Some(QuizResponse::Matches(map)) => Some(map),
                _ => None,
            };
            pairs
                .iter()
                .enumerate()
                .map(|(idx, pair)| {
                    let picked = chosen
                        .and_then(|m| m.get(&idx))
                        .map(String::as_str)
                        .filter(|p| !p.is_empty())
                        .unwrap_or("—");
                    format!("{} → {}", pair.left, picked)
                })
                .collect::<Vec<_>>()
                .join(" | ")
        }
        _ => match response {
            Some(QuizResponse::Choice(idx)) => question
                .options()
                .and_then(|options| options.get(*idx))
                .map(value_display)
                .unwrap_or_else(|| format!("Option {idx}")),
            Some(QuizResponse::Text(text)) if !text.is_empty() => text.clone(),
            _ => NO_ANSWER.to_string(),
        },
    }
}

fn pair_listing(pairs: &[super::pool::MatchPair]) -> String {
    pairs
        .iter()
        .map(|pair| format!("{} → {}", pair.left, pair.right))
        .collect::<Vec<_>>()
        .join(" | ")
}
