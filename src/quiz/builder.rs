//! Builds the fixed question sequence for one quiz attempt.

use std::collections::HashSet;

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use tracing::debug;

use super::{
    Question, QuestionKind, QuizSession, CHOICE_COUNT, DISTRACTOR_COUNT, MIN_POOL_SIZE,
    TYPED_COUNT,
};
use crate::models::{Direction, WordPair};

/// Build a shuffled session of typed and multiple-choice questions.
///
/// The pool is expected to hold at least [`MIN_POOL_SIZE`] distinct words for a
/// regular quiz (callers check via `Catalog::pool_for`), or at least one for a
/// review quiz. Smaller review pools yield a shorter session.
///
/// Typed questions always show the target term and expect the source term,
/// whatever `direction` says.
pub fn build_session<R: Rng + ?Sized>(
    pool: &[WordPair],
    direction: Direction,
    is_review: bool,
    rng: &mut R,
) -> QuizSession {
    debug_assert!(!pool.is_empty(), "cannot build a quiz from an empty pool");

    let pool = distinct_words(pool);

    let typed_words: Vec<&WordPair> = pool.choose_multiple(rng, TYPED_COUNT).copied().collect();
    let typed_keys: HashSet<String> = typed_words.iter().map(|w| w.key()).collect();

    let remaining: Vec<&WordPair> = pool
        .iter()
        .copied()
        .filter(|w| !typed_keys.contains(&w.key()))
        .collect();
    let choice_source = if remaining.len() >= MIN_POOL_SIZE {
        &remaining
    } else {
        &pool
    };
    let choice_words: Vec<&WordPair> = choice_source
        .choose_multiple(rng, CHOICE_COUNT)
        .copied()
        .collect();

    let mut questions: Vec<Question> = choice_words
        .into_iter()
        .map(|w| make_choice(w, direction, &pool, rng))
        .chain(typed_words.into_iter().map(make_typed))
        .collect();
    questions.shuffle(rng);

    debug!(
        questions = questions.len(),
        pool = pool.len(),
        is_review,
        "built quiz session"
    );

    QuizSession::new(questions, is_review)
}

/// Drop repeated source terms, keeping the first occurrence.
fn distinct_words(pool: &[WordPair]) -> Vec<&WordPair> {
    let mut seen = HashSet::new();
    pool.iter().filter(|w| seen.insert(w.key())).collect()
}

fn make_choice<R: Rng + ?Sized>(
    word: &WordPair,
    direction: Direction,
    pool: &[&WordPair],
    rng: &mut R,
) -> Question {
    let answer = direction.answer_of(word);

    // Distinct wrong translations only, so no option looks like a duplicate.
    let mut seen = HashSet::new();
    let candidates: Vec<&str> = pool
        .iter()
        .map(|w| direction.answer_of(w))
        .filter(|t| *t != answer && seen.insert(*t))
        .collect();

    let mut choices: Vec<String> = std::iter::once(answer)
        .chain(candidates.choose_multiple(rng, DISTRACTOR_COUNT).copied())
        .map(str::to_string)
        .collect();
    choices.shuffle(rng);

    Question {
        kind: QuestionKind::Choice { choices },
        prompt: direction.prompt_of(word).to_string(),
        expected: answer.to_string(),
        word: word.clone(),
    }
}

fn make_typed(word: &WordPair) -> Question {
    Question {
        kind: QuestionKind::Typed,
        prompt: word.target.clone(),
        expected: word.source.clone(),
        word: word.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::QUIZ_TOTAL;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn words(n: usize) -> Vec<WordPair> {
        (0..n)
            .map(|i| WordPair::new(format!("word{}", i), format!("語{}", i)))
            .collect()
    }

    fn count_typed(session: &QuizSession) -> usize {
        session.questions.iter().filter(|q| q.is_typed()).count()
    }

    #[test]
    fn session_shape_is_fixed() {
        for n in [8, 9, 10, 12, 40] {
            let pool = words(n);
            for seed in 0..25 {
                for direction in [Direction::EnToJa, Direction::JaToEn] {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let session = build_session(&pool, direction, false, &mut rng);
                    assert_eq!(session.len(), QUIZ_TOTAL);
                    assert_eq!(count_typed(&session), TYPED_COUNT);
                    assert_eq!(session.len() - count_typed(&session), CHOICE_COUNT);
                    assert_eq!(session.current_index, 0);
                    assert!(!session.is_review);
                }
            }
        }
    }

    #[test]
    fn typed_questions_ignore_direction() {
        let pool = words(12);
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let session = build_session(&pool, Direction::EnToJa, false, &mut rng);
            for q in session.questions.iter().filter(|q| q.is_typed()) {
                assert_eq!(q.prompt, q.word.target);
                assert_eq!(q.expected, q.word.source);
                assert!(q.choices().is_empty());
            }
        }
    }

    #[test]
    fn choice_questions_follow_direction() {
        let pool = words(12);
        let mut rng = StdRng::seed_from_u64(7);

        let session = build_session(&pool, Direction::EnToJa, false, &mut rng);
        for q in session.questions.iter().filter(|q| !q.is_typed()) {
            assert_eq!(q.prompt, q.word.source);
            assert_eq!(q.expected, q.word.target);
        }

        let session = build_session(&pool, Direction::JaToEn, false, &mut rng);
        for q in session.questions.iter().filter(|q| !q.is_typed()) {
            assert_eq!(q.prompt, q.word.target);
            assert_eq!(q.expected, q.word.source);
        }
    }

    #[test]
    fn choices_hold_answer_once_and_no_duplicates() {
        let pool = words(10);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let session = build_session(&pool, Direction::EnToJa, false, &mut rng);
            for q in session.questions.iter().filter(|q| !q.is_typed()) {
                let choices = q.choices();
                assert_eq!(choices.len(), DISTRACTOR_COUNT + 1);
                assert_eq!(choices.iter().filter(|c| **c == q.expected).count(), 1);
                let unique: HashSet<_> = choices.iter().collect();
                assert_eq!(unique.len(), choices.len());
            }
        }
    }

    #[test]
    fn distractors_skip_identical_translations() {
        // Only two distinct translations exist, so every question degrades to two options.
        let pool: Vec<WordPair> = (0..8)
            .map(|i| WordPair::new(format!("w{}", i), if i % 2 == 0 { "even" } else { "odd" }))
            .collect();
        let mut rng = StdRng::seed_from_u64(3);

        let session = build_session(&pool, Direction::EnToJa, false, &mut rng);
        assert_eq!(session.len(), QUIZ_TOTAL);
        for q in session.questions.iter().filter(|q| !q.is_typed()) {
            let choices = q.choices();
            assert_eq!(choices.len(), 2);
            assert!(choices.contains(&q.expected));
        }
    }

    #[test]
    fn large_pool_keeps_typed_words_out_of_choices() {
        let pool = words(30);
        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let session = build_session(&pool, Direction::JaToEn, false, &mut rng);
            let typed: HashSet<_> = session
                .questions
                .iter()
                .filter(|q| q.is_typed())
                .map(|q| q.word.key())
                .collect();
            let chosen: HashSet<_> = session
                .questions
                .iter()
                .filter(|q| !q.is_typed())
                .map(|q| q.word.key())
                .collect();
            assert!(typed.is_disjoint(&chosen));
            assert_eq!(chosen.len(), CHOICE_COUNT);
        }
    }

    #[test]
    fn review_session_draws_only_from_pool() {
        let pool = vec![
            WordPair::new("alpha", "ア"),
            WordPair::new("beta", "ベ"),
            WordPair::new("gamma", "ガ"),
        ];
        let keys: HashSet<_> = pool.iter().map(WordPair::key).collect();

        for seed in 0..25 {
            let mut rng = StdRng::seed_from_u64(seed);
            let session = build_session(&pool, Direction::EnToJa, true, &mut rng);
            assert!(session.is_review);
            assert_eq!(count_typed(&session), TYPED_COUNT);
            assert_eq!(session.len(), TYPED_COUNT + pool.len());
            for q in &session.questions {
                assert!(keys.contains(&q.word.key()));
                for choice in q.choices() {
                    assert!(pool.iter().any(|w| &w.target == choice));
                }
            }
        }
    }

    #[test]
    fn duplicate_sources_count_once() {
        let mut pool = words(9);
        pool.push(WordPair::new(" WORD0 ", "語0"));
        let mut rng = StdRng::seed_from_u64(11);

        let session = build_session(&pool, Direction::EnToJa, false, &mut rng);
        assert_eq!(session.len(), QUIZ_TOTAL);
        assert!(session.questions.iter().all(|q| q.word.source != " WORD0 "));
    }
}
