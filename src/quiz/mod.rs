//! Quiz engine: pool assembly, grading, and the session state machine.
//!
//! Everything here is synchronous and pure apart from the RNG used for
//! shuffling; the HTTP layer and any future client surface consume it
//! through [`session::QuizSession`].

pub mod grade;
pub mod pool;
pub mod session;

pub use pool::{assemble_pool, Question};
pub use session::{EntrySource, QuizSession, SessionError, SessionMode, SessionPhase};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Question family derived from the authored `type` string.
///
/// Authors write variants like `mc_meaning` or `mc_usage`; anything with the
/// `mc` prefix is multiple-choice. Unrecognized or absent types fall into
/// `Unknown`, which still grades as a choice question when the answer key
/// carries a numeric correct index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestionKind {
    MultipleChoice,
    ChooseBestReply,
    Cloze,
    Match,
    Unknown,
}

impl QuestionKind {
    pub fn parse(qtype: &str) -> Self {
        match qtype {
            "choose_best_reply" => Self::ChooseBestReply,
            "cloze" => Self::Cloze,
            "match" => Self::Match,
            s if s.starts_with("mc") => Self::MultipleChoice,
            _ => Self::Unknown,
        }
    }

    /// Choice-family questions answer with an option index.
    pub fn is_choice(&self) -> bool {
        matches!(self, Self::MultipleChoice | Self::ChooseBestReply)
    }
}

/// A user's answer to one question.
///
/// Serialized untagged so the JSON forms stay what a client would naturally
/// send: an option index, a typed string, or a pair-index → chosen-text map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuizResponse {
    Choice(usize),
    Text(String),
    Matches(BTreeMap<usize, String>),
}
