//! Quiz session state machine.
//!
//! One session runs one pool from setup to finished:
//!
//! ```text
//! Setup --start--> Loading --pool ready--> Running --past last--> Finished
//!   ^                 |                      ^  |                    |
//!   +--- no entries / +                      +--+ submit/next/prev   |
//!        empty pool                          +--- resume_last -------+
//!                                            Loading <-- play_again -+
//! ```
//!
//! Answers live in a history arena with one slot per question, so moving
//! backward and forward re-displays recorded results instead of re-grading.

use std::sync::Arc;

use serde::Serialize;

use super::grade;
use super::pool::{assemble_pool, Question};
use super::QuizResponse;
use crate::catalog::{Catalog, Entry};

/// Where session entries come from. The catalog service implements this;
/// tests substitute fixed fixtures.
pub trait EntrySource {
    /// Every selectable entry id, in listing order.
    fn entry_ids(&self) -> Vec<String>;

    /// Full entry detail for one id.
    fn entry(&self, id: &str) -> Result<Arc<Entry>, SessionError>;
}

impl EntrySource for Catalog {
    fn entry_ids(&self) -> Vec<String> {
        self.ids()
    }

    fn entry(&self, id: &str) -> Result<Arc<Entry>, SessionError> {
        self.get(id)
            .ok_or_else(|| SessionError::EntryUnavailable(id.to_string()))
    }
}

/// Which entries feed the session's pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Every entry in the source.
    All,
    /// One entry's quiz only.
    Single(String),
    /// An explicit selection; duplicates collapse, order is preserved.
    Selected(Vec<String>),
}

/// Surfaced session failures. These revert the session to `Setup`; they
/// never panic or wedge it in `Loading`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    NoEntriesSelected,
    NoQuestions,
    EntryUnavailable(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::NoEntriesSelected => {
                write!(f, "Pick at least one entry to quiz on")
            }
            SessionError::NoQuestions => {
                write!(f, "No quiz questions found in the selected entries")
            }
            SessionError::EntryUnavailable(id) => write!(f, "Entry {} is unavailable", id),
        }
    }
}

impl std::error::Error for SessionError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Setup,
    Loading,
    Running,
    Finished,
}

/// One answered slot in the history arena.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRecord {
    pub response: Option<QuizResponse>,
    pub correct: bool,
    pub skipped: bool,
    /// Explanation panel visibility, persisted so navigation restores it.
    pub show_explanation: bool,
}

/// Tallies for the finish screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub score: usize,
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub skipped: usize,
}

/// A single run through a question pool.
///
/// Owned by exactly one consumer; all operations are synchronous and no
/// operation leaves the session in an inconsistent intermediate state.
pub struct QuizSession {
    mode: SessionMode,
    phase: SessionPhase,
    questions: Vec<Question>,
    history: Vec<Option<AnswerRecord>>,
    current: usize,
    score: usize,
    last_error: Option<SessionError>,
}

impl QuizSession {
    pub fn new(mode: SessionMode) -> Self {
        Self {
            mode,
            phase: SessionPhase::Setup,
            questions: Vec::new(),
            history: Vec::new(),
            current: 0,
            score: 0,
            last_error: None,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn last_error(&self) -> Option<&SessionError> {
        self.last_error.as_ref()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Recorded answer for the current question, if it was submitted.
    pub fn current_record(&self) -> Option<&AnswerRecord> {
        self.history.get(self.current)?.as_ref()
    }

    pub fn record(&self, index: usize) -> Option<&AnswerRecord> {
        self.history.get(index)?.as_ref()
    }

    /// Assemble a pool and enter `Running`.
    ///
    /// A `start` while a previous one is still loading is a no-op; a failed
    /// assembly reverts to `Setup` with the error kept for display.
    pub fn start(&mut self, source: &impl EntrySource) -> Result<(), SessionError> {
        if self.phase == SessionPhase::Loading {
            return Ok(());
        }
        self.phase = SessionPhase::Loading;
        self.last_error = None;

        match self.assemble(source) {
            Ok(questions) => {
                self.history = vec![None; questions.len()];
                self.questions = questions;
                self.current = 0;
                self.score = 0;
                self.phase = SessionPhase::Running;
                Ok(())
            }
            Err(e) => {
                self.phase = SessionPhase::Setup;
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn assemble(&self, source: &impl EntrySource) -> Result<Vec<Question>, SessionError> {
        let ids = match &self.mode {
            SessionMode::All => source.entry_ids(),
            SessionMode::Single(id) => vec![id.clone()],
            SessionMode::Selected(ids) => dedup_preserving_order(ids),
        };
        if ids.is_empty() {
            return Err(SessionError::NoEntriesSelected);
        }

        let mut entries = Vec::with_capacity(ids.len());
        for id in &ids {
            entries.push(source.entry(id)?);
        }

        let pool = assemble_pool(&entries);
        if pool.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        Ok(pool)
    }

    /// Grade and record the current question.
    ///
    /// Idempotent: an already-answered question returns its stored record
    /// untouched. An ineligible response (see [`grade::can_submit`]) is a
    /// no-op returning `None`.
    pub fn submit(&mut self, response: QuizResponse) -> Option<&AnswerRecord> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        if self.history.get(self.current)?.is_some() {
            return self.current_record();
        }

        let question = self.questions.get(self.current)?;
        if !grade::can_submit(question, &response) {
            return None;
        }

        let correct = grade::grade(question, &response);
        if correct {
            self.score += 1;
        }
        self.history[self.current] = Some(AnswerRecord {
            response: Some(response),
            correct,
            skipped: false,
            show_explanation: !correct,
        });
        self.current_record()
    }

    /// Record the current question as skipped. Never credits a point.
    pub fn skip(&mut self) -> Option<&AnswerRecord> {
        if self.phase != SessionPhase::Running {
            return None;
        }
        if self.history.get(self.current)?.is_some() {
            return self.current_record();
        }
        self.history[self.current] = Some(AnswerRecord {
            response: None,
            correct: false,
            skipped: true,
            show_explanation: true,
        });
        self.current_record()
    }

    /// Persist explanation-panel visibility into the current record so
    /// navigation restores it.
    pub fn set_explanation_visible(&mut self, visible: bool) {
        if let Some(Some(record)) = self.history.get_mut(self.current) {
            record.show_explanation = visible;
        }
    }

    /// Advance; past the last question the session finishes.
    pub fn next(&mut self) {
        if self.phase != SessionPhase::Running {
            return;
        }
        if self.current + 1 >= self.questions.len() {
            self.phase = SessionPhase::Finished;
        } else {
            self.current += 1;
        }
    }

    /// Step back, clamped at the first question.
    pub fn prev(&mut self) {
        if self.phase == SessionPhase::Running {
            self.current = self.current.saturating_sub(1);
        }
    }

    /// Re-enter `Running` at the last question from the finish screen.
    /// History is untouched.
    pub fn resume_last(&mut self) {
        if self.phase == SessionPhase::Finished && !self.questions.is_empty() {
            self.current = self.questions.len() - 1;
            self.phase = SessionPhase::Running;
        }
    }

    /// Build a fresh pool from the same mode and run again.
    pub fn play_again(&mut self, source: &impl EntrySource) -> Result<(), SessionError> {
        self.start(source)
    }

    pub fn summary(&self) -> SessionSummary {
        let answered: Vec<&AnswerRecord> = self.history.iter().flatten().collect();
        let correct = answered.iter().filter(|r| r.correct).count();
        let skipped = answered.iter().filter(|r| r.skipped).count();
        SessionSummary {
            score: self.score,
            total: self.questions.len(),
            correct,
            wrong: answered.len().saturating_sub(correct + skipped),
            skipped,
        }
    }
}

fn dedup_preserving_order(ids: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect()
}
