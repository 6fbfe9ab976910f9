//! Data models for words, levels and per-user progress.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::streak;

/// Normalize a term for comparison: trimmed and lowercased.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Which side of a word pair is shown for multiple-choice questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Show the source term, answer with the target term.
    #[default]
    EnToJa,
    /// Show the target term, answer with the source term.
    JaToEn,
}

impl Direction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::EnToJa => "EN → JA",
            Self::JaToEn => "JA → EN",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::EnToJa => Self::JaToEn,
            Self::JaToEn => Self::EnToJa,
        }
    }

    /// The term shown to the learner.
    pub fn prompt_of<'a>(&self, word: &'a WordPair) -> &'a str {
        match self {
            Self::EnToJa => &word.source,
            Self::JaToEn => &word.target,
        }
    }

    /// The term the learner has to pick.
    pub fn answer_of<'a>(&self, word: &'a WordPair) -> &'a str {
        match self {
            Self::EnToJa => &word.target,
            Self::JaToEn => &word.source,
        }
    }
}

/// A single vocabulary entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPair {
    #[serde(rename = "en")]
    pub source: String,
    #[serde(rename = "ja")]
    pub target: String,
}

impl WordPair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Key used for miss tracking and de-duplication.
    pub fn key(&self) -> String {
        normalize(&self.source)
    }
}

/// A named group of words in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub words: Vec<WordPair>,
}

/// The static word list, loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub levels: Vec<Level>,
}

/// Record of a word the user got wrong and has not answered correctly since.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MissEntry {
    #[serde(rename = "en")]
    pub source: String,
    #[serde(rename = "ja")]
    pub target: String,
    pub miss_count: u32,
    /// Epoch milliseconds of the most recent miss.
    pub last_miss_at: i64,
}

impl MissEntry {
    pub fn word(&self) -> WordPair {
        WordPair::new(self.source.clone(), self.target.clone())
    }
}

/// Cumulative progress for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "totalAns", default)]
    pub total_answered: u32,
    #[serde(rename = "totalOk", default)]
    pub total_correct: u32,
    /// Keyed by the normalized source term.
    #[serde(rename = "miss", default)]
    pub misses: BTreeMap<String, MissEntry>,
    #[serde(rename = "lastStudyDate", default)]
    pub last_study_date: Option<NaiveDate>,
    #[serde(default)]
    pub streak: u32,
}

impl UserRecord {
    /// Apply one committed answer: totals, miss list and streak.
    pub fn record_answer(&mut self, word: &WordPair, correct: bool, today: NaiveDate, now_ms: i64) {
        self.total_answered += 1;

        if correct {
            self.total_correct += 1;
            self.clear_miss(word);
        } else {
            self.mark_miss(word, now_ms);
        }

        streak::update_streak(self, today);
    }

    pub fn mark_miss(&mut self, word: &WordPair, now_ms: i64) {
        let miss_count = self
            .misses
            .get(&word.key())
            .map_or(0, |prev| prev.miss_count)
            + 1;

        self.misses.insert(
            word.key(),
            MissEntry {
                source: word.source.clone(),
                target: word.target.clone(),
                miss_count,
                last_miss_at: now_ms,
            },
        );
    }

    pub fn clear_miss(&mut self, word: &WordPair) -> Option<MissEntry> {
        self.misses.remove(&word.key())
    }

    /// Accuracy as a rounded percentage, 0 when nothing was answered yet.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_answered == 0 {
            return 0;
        }
        (f64::from(self.total_correct) * 100.0 / f64::from(self.total_answered)).round() as u32
    }

    pub fn overview(&self) -> ProgressOverview {
        ProgressOverview {
            total_answered: self.total_answered,
            total_correct: self.total_correct,
            accuracy_percent: self.accuracy_percent(),
            miss_count: self.misses.len(),
            streak: self.streak,
            badge: streak::Badge::for_total_correct(self.total_correct),
        }
    }
}

/// Display figures derived from a user's record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressOverview {
    pub total_answered: u32,
    pub total_correct: u32,
    pub accuracy_percent: u32,
    pub miss_count: usize,
    pub streak: u32,
    pub badge: streak::Badge,
}
