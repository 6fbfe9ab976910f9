//! Drives a built session question by question.
//!
//! The runner is a small state machine:
//! `AwaitingAnswer(i)` → `AnswerCommitted(i)` → `AwaitingAnswer(i + 1)` or `Finished`.
//! Calling an operation from the wrong state is an integration bug and panics.

use tracing::{debug, info};

use super::{Question, QuizSession};
use crate::clock::Clock;
use crate::models::{normalize, WordPair};
use crate::storage::{StoreError, UserStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    AwaitingAnswer(usize),
    AnswerCommitted(usize),
    Finished,
}

/// The active user and where their progress goes.
pub struct StudyContext<'a> {
    store: &'a mut UserStore,
    user: String,
    clock: Clock,
}

impl<'a> StudyContext<'a> {
    /// Bind a user to the store, creating their record if needed.
    pub fn new(store: &'a mut UserStore, user: &str, clock: Clock) -> Result<Self, StoreError> {
        let user = store.ensure_user(user)?;
        Ok(Self { store, user, clock })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    fn record_answer(&mut self, word: &WordPair, correct: bool) {
        let today = self.clock.today();
        let now_ms = self.clock.now_millis();
        if let Err(e) = self
            .store
            .update(&self.user, |record| record.record_answer(word, correct, today, now_ms))
        {
            panic!("answer committed for unregistered user '{}': {}", self.user, e);
        }
    }
}

/// Result of committing one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub expected: String,
    pub word: WordPair,
}

/// What happened on `advance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Next(usize),
    Finished(QuizSummary),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub correct_count: usize,
    pub total_count: usize,
    pub wrong_count: usize,
    /// Missed words, one per source term, last occurrence wins.
    pub unique_misses: Vec<WordPair>,
    pub is_review: bool,
}

pub struct QuizRunner {
    session: QuizSession,
    state: RunnerState,
}

impl QuizRunner {
    pub fn new(session: QuizSession) -> Self {
        assert!(!session.is_empty(), "cannot run a session without questions");
        Self {
            session,
            state: RunnerState::AwaitingAnswer(0),
        }
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            RunnerState::AwaitingAnswer(i) | RunnerState::AnswerCommitted(i) => {
                self.session.questions.get(i)
            }
            RunnerState::Finished => None,
        }
    }

    fn awaiting(&self, op: &str) -> usize {
        match self.state {
            RunnerState::AwaitingAnswer(i) => i,
            other => panic!("{} called in state {:?}", op, other),
        }
    }

    /// Answer a multiple-choice question; exact string match.
    pub fn submit_choice(&mut self, ctx: &mut StudyContext<'_>, choice: &str) -> AnswerFeedback {
        let index = self.awaiting("submit_choice");
        let question = &self.session.questions[index];
        assert!(
            !question.is_typed(),
            "submit_choice called on typed question {}",
            index
        );
        let correct = choice == question.expected;
        self.commit(ctx, index, correct)
    }

    /// Answer a typed question; case and surrounding whitespace are ignored.
    pub fn submit_typed(&mut self, ctx: &mut StudyContext<'_>, text: &str) -> AnswerFeedback {
        let index = self.awaiting("submit_typed");
        let question = &self.session.questions[index];
        assert!(
            question.is_typed(),
            "submit_typed called on multiple-choice question {}",
            index
        );
        let correct = normalize(text) == normalize(&question.expected);
        self.commit(ctx, index, correct)
    }

    fn commit(&mut self, ctx: &mut StudyContext<'_>, index: usize, correct: bool) -> AnswerFeedback {
        let question = &self.session.questions[index];
        let word = question.word.clone();
        let expected = question.expected.clone();

        ctx.record_answer(&word, correct);

        if correct {
            self.session.correct_count += 1;
        } else {
            self.session.wrong_answers.push(word.clone());
        }
        self.state = RunnerState::AnswerCommitted(index);

        debug!(user = %ctx.user(), index, correct, word = %word.source, "answer committed");

        AnswerFeedback {
            correct,
            expected,
            word,
        }
    }

    /// Move past a committed answer.
    pub fn advance(&mut self) -> Advance {
        let index = match self.state {
            RunnerState::AnswerCommitted(i) => i,
            other => panic!("advance called in state {:?}", other),
        };

        let next = index + 1;
        if next < self.session.len() {
            self.session.current_index = next;
            self.state = RunnerState::AwaitingAnswer(next);
            return Advance::Next(next);
        }

        self.state = RunnerState::Finished;
        let summary = self.summary();
        info!(
            correct = summary.correct_count,
            total = summary.total_count,
            misses = summary.unique_misses.len(),
            review = summary.is_review,
            "quiz finished"
        );
        Advance::Finished(summary)
    }

    /// Final figures; only available once finished.
    pub fn summary(&self) -> QuizSummary {
        assert_eq!(
            self.state,
            RunnerState::Finished,
            "summary requested before the quiz finished"
        );

        let mut unique_misses: Vec<WordPair> = Vec::new();
        for word in &self.session.wrong_answers {
            match unique_misses.iter().position(|w| w.key() == word.key()) {
                Some(pos) => unique_misses[pos] = word.clone(),
                None => unique_misses.push(word.clone()),
            }
        }

        QuizSummary {
            correct_count: self.session.correct_count,
            total_count: self.session.len(),
            wrong_count: self.session.len() - self.session.correct_count,
            unique_misses,
            is_review: self.session.is_review,
        }
    }
}
