//! Quiz sessions: building a question sequence and running it.

mod builder;
mod runner;

pub use builder::build_session;
pub use runner::{Advance, AnswerFeedback, QuizRunner, QuizSummary, RunnerState, StudyContext};

use thiserror::Error;

use crate::models::{UserRecord, WordPair};

/// Questions per session.
pub const QUIZ_TOTAL: usize = 10;
/// Multiple-choice questions per session.
pub const CHOICE_COUNT: usize = 8;
/// Typed questions per session.
pub const TYPED_COUNT: usize = 2;
/// Smallest level that can fill a full session.
pub const MIN_POOL_SIZE: usize = 8;
/// Wrong options offered next to the correct one.
pub const DISTRACTOR_COUNT: usize = 3;

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("unknown level '{0}'")]
    UnknownLevel(String),
    #[error("level '{level}' has {found} distinct words, at least {required} are needed")]
    NotEnoughWords {
        level: String,
        found: usize,
        required: usize,
    },
    #[error("no missed words to review yet")]
    EmptyReviewList,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    /// Pick one of the listed options.
    Choice { choices: Vec<String> },
    /// Type the source term for the shown target term.
    Typed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub kind: QuestionKind,
    pub prompt: String,
    pub expected: String,
    pub word: WordPair,
}

impl Question {
    pub fn is_typed(&self) -> bool {
        matches!(self.kind, QuestionKind::Typed)
    }

    pub fn choices(&self) -> &[String] {
        match &self.kind {
            QuestionKind::Choice { choices } => choices,
            QuestionKind::Typed => &[],
        }
    }
}

/// One quiz attempt. Never persisted.
#[derive(Debug, Clone)]
pub struct QuizSession {
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub correct_count: usize,
    /// Every wrong answer in order, duplicates included.
    pub wrong_answers: Vec<WordPair>,
    pub is_review: bool,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>, is_review: bool) -> Self {
        Self {
            questions,
            current_index: 0,
            correct_count: 0,
            wrong_answers: Vec::new(),
            is_review,
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Words to drill in review mode: most missed first, then most recently missed.
pub fn review_pool(record: &UserRecord) -> Result<Vec<WordPair>, QuizError> {
    let mut entries: Vec<_> = record.misses.values().collect();
    if entries.is_empty() {
        return Err(QuizError::EmptyReviewList);
    }

    entries.sort_by(|a, b| {
        b.miss_count
            .cmp(&a.miss_count)
            .then(b.last_miss_at.cmp(&a.last_miss_at))
    });

    Ok(entries.into_iter().map(|e| e.word()).collect())
}
