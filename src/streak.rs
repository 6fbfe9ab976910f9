//! Day streaks and achievement badges.

use chrono::NaiveDate;

use crate::models::UserRecord;

/// Count `today` toward the user's run of consecutive study days.
///
/// Calendar days only; a gap of more than one day restarts the streak at 1.
pub fn update_streak(record: &mut UserRecord, today: NaiveDate) {
    let Some(last) = record.last_study_date else {
        record.streak = 1;
        record.last_study_date = Some(today);
        return;
    };

    if last == today {
        return;
    }

    if (today - last).num_days() == 1 {
        record.streak += 1;
    } else {
        record.streak = 1;
    }
    record.last_study_date = Some(today);
}

/// Tiered achievement label earned from cumulative correct answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Badge {
    FirstStep,
    Consistency,
    WordMaster,
    OneSetChampion,
    VocabularyChampion,
}

impl Badge {
    /// Thresholds in ascending order; the highest one reached wins.
    const TIERS: [(u32, Badge); 5] = [
        (0, Badge::FirstStep),
        (50, Badge::Consistency),
        (150, Badge::WordMaster),
        (300, Badge::OneSetChampion),
        (600, Badge::VocabularyChampion),
    ];

    pub fn for_total_correct(total_correct: u32) -> Self {
        Self::TIERS
            .iter()
            .rev()
            .find(|(threshold, _)| total_correct >= *threshold)
            .map_or(Badge::FirstStep, |(_, badge)| *badge)
    }

    pub fn threshold(&self) -> u32 {
        Self::TIERS
            .iter()
            .find(|(_, badge)| badge == self)
            .map_or(0, |(threshold, _)| *threshold)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::FirstStep => "first step",
            Self::Consistency => "consistency",
            Self::WordMaster => "word master",
            Self::OneSetChampion => "one-set champion",
            Self::VocabularyChampion => "vocabulary champion",
        }
    }
}
