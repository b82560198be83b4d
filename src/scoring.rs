// Scoring: pixel difference -> correct-pixel ratio -> 1..=3 stars.
// Stroke count vs. the per-letter budget travels alongside the ratio but is
// not folded into it.

use std::collections::HashMap;

/// `(area - difference) / area`, or `None` when there is no character to score
/// against or the surface is empty.
pub fn calculate_score(c: Option<char>, difference: usize, area: usize) -> Option<f64> {
    c?;
    if area == 0 {
        return None;
    }
    let correct = area.saturating_sub(difference);
    Some(correct as f64 / area as f64)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarThresholds {
    pub three: f64,
    pub two: f64,
}

impl Default for StarThresholds {
    fn default() -> Self {
        Self { three: 0.9, two: 0.8 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Stars(u8);

impl Stars {
    pub const MIN: Stars = Stars(1);
    pub const MAX: Stars = Stars(3);

    pub fn from_ratio(ratio: f64, thresholds: StarThresholds) -> Self {
        if ratio >= thresholds.three {
            Stars(3)
        } else if ratio >= thresholds.two {
            Stars(2)
        } else {
            Stars(1)
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Maximum strokes each letter should take.
#[derive(Clone, Debug, Default)]
pub struct StrokeBudget {
    budgets: HashMap<char, u32>,
}

impl StrokeBudget {
    pub fn new(budgets: HashMap<char, u32>) -> Self {
        Self { budgets }
    }

    pub fn max_strokes(&self, c: char) -> Option<u32> {
        self.budgets.get(&c).copied()
    }
}

/// Everything one evaluation measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub character: char,
    pub difference: usize,
    pub area: usize,
    pub ratio: f64,
    pub strokes: u32,
    pub max_strokes: Option<u32>,
    pub stars: Stars,
}

impl Evaluation {
    pub fn over_budget(&self) -> bool {
        self.max_strokes.is_some_and(|max| self.strokes > max)
    }
}

pub struct ScoringPolicy {
    thresholds: StarThresholds,
    budget: StrokeBudget,
}

impl ScoringPolicy {
    pub fn new(thresholds: StarThresholds, budget: StrokeBudget) -> Self {
        Self { thresholds, budget }
    }

    pub fn budget(&self) -> &StrokeBudget {
        &self.budget
    }

    pub fn thresholds(&self) -> StarThresholds {
        self.thresholds
    }

    pub fn evaluate(&self, c: char, difference: usize, area: usize, strokes: u32) -> Option<Evaluation> {
        let ratio = calculate_score(Some(c), difference, area)?;
        Some(Evaluation {
            character: c,
            difference,
            area,
            ratio,
            strokes,
            max_strokes: self.budget.max_strokes(c),
            stars: Stars::from_ratio(ratio, self.thresholds),
        })
    }
}
