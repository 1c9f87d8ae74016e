//! Grown-up check: small arithmetic or comparison puzzles

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

/// Redraws allowed when a new puzzle repeats the previous answer
const MAX_REDRAWS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleKind {
    Addition,
    Subtraction,
    Largest,
    Smallest,
}

impl PuzzleKind {
    pub const ALL: [PuzzleKind; 4] = [
        PuzzleKind::Addition,
        PuzzleKind::Subtraction,
        PuzzleKind::Largest,
        PuzzleKind::Smallest,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    pub kind: PuzzleKind,
    pub question: String,
    pub answer: u32,
    /// Four distinct values in display order, `answer` among them
    pub candidates: Vec<u32>,
}

impl Puzzle {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let kind = *PuzzleKind::ALL.choose(rng).unwrap_or(&PuzzleKind::Addition);
        Self::of_kind(rng, kind)
    }

    /// A fresh puzzle whose answer differs from the one in `previous`
    pub fn generate_after<R: Rng>(rng: &mut R, previous: Option<&Puzzle>) -> Self {
        let mut puzzle = Self::generate(rng);
        let Some(previous) = previous else {
            return puzzle;
        };
        for _ in 0..MAX_REDRAWS {
            if puzzle.answer != previous.answer {
                break;
            }
            puzzle = Self::generate(rng);
        }
        puzzle
    }

    pub fn of_kind<R: Rng>(rng: &mut R, kind: PuzzleKind) -> Self {
        let (question, answer, mut candidates) = match kind {
            PuzzleKind::Addition => {
                let a = rng.random_range(1..=10);
                let b = rng.random_range(1..=10);
                let answer = a + b;
                (format!("What is {a} + {b}?"), answer, neighbours(rng, answer))
            }
            PuzzleKind::Subtraction => {
                let a = rng.random_range(5..=19);
                let b = rng.random_range(1..a);
                let answer = a - b;
                (format!("What is {a} − {b}?"), answer, neighbours(rng, answer))
            }
            PuzzleKind::Largest | PuzzleKind::Smallest => {
                let values: Vec<u32> = rand::seq::index::sample(rng, 20, 4)
                    .iter()
                    .map(|i| i as u32 + 1)
                    .collect();
                let (answer, question) = if kind == PuzzleKind::Largest {
                    (values.iter().copied().max(), "Tap the largest number:")
                } else {
                    (values.iter().copied().min(), "Tap the smallest number:")
                };
                (question.to_string(), answer.unwrap_or(1), values)
            }
        };
        candidates.shuffle(rng);
        Self {
            kind,
            question,
            answer,
            candidates,
        }
    }

    pub fn is_correct(&self, value: u32) -> bool {
        value == self.answer
    }
}

/// The answer plus three distinct positive values within three of it
fn neighbours<R: Rng>(rng: &mut R, answer: u32) -> Vec<u32> {
    let nearby: Vec<u32> = (answer.saturating_sub(3)..=answer + 3)
        .filter(|&v| v > 0 && v != answer)
        .collect();
    let mut values = vec![answer];
    values.extend(nearby.choose_multiple(rng, 3).copied());
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_smallest_answer_still_has_three_neighbours() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut values = neighbours(&mut rng, 1);
        values.sort_unstable();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_comparison_answers() {
        let mut rng = Pcg32::seed_from_u64(2);
        let p = Puzzle::of_kind(&mut rng, PuzzleKind::Largest);
        assert_eq!(Some(&p.answer), p.candidates.iter().max());
        let p = Puzzle::of_kind(&mut rng, PuzzleKind::Smallest);
        assert_eq!(Some(&p.answer), p.candidates.iter().min());
        assert!(p.question.contains("smallest"));
    }

    #[test]
    fn test_arithmetic_question_matches_answer() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let p = Puzzle::of_kind(&mut rng, PuzzleKind::Subtraction);
            let nums: Vec<u32> = p
                .question
                .split(|c: char| !c.is_ascii_digit())
                .filter_map(|s| s.parse().ok())
                .collect();
            assert_eq!(nums.len(), 2);
            assert_eq!(nums[0] - nums[1], p.answer);
            assert!(p.answer >= 1);
        }
    }

    #[test]
    fn test_follow_up_differs_from_previous() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut previous = Puzzle::generate(&mut rng);
        for _ in 0..100 {
            let next = Puzzle::generate_after(&mut rng, Some(&previous));
            assert_ne!(next.answer, previous.answer);
            previous = next;
        }
    }

    proptest! {
        #[test]
        fn prop_candidates_distinct_and_contain_answer(seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            for kind in PuzzleKind::ALL {
                let p = Puzzle::of_kind(&mut rng, kind);
                prop_assert_eq!(p.candidates.len(), 4);
                prop_assert!(p.candidates.contains(&p.answer));
                prop_assert!(p.candidates.iter().all(|&v| v > 0));
                let mut sorted = p.candidates.clone();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(sorted.len(), 4);
            }
        }
    }
}
