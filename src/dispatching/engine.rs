//! Subject ordering engine.
//!
//! Every rule is scored once per subject; the resulting score rows are then
//! compared lexicographically (sequential mode) or summed with the rule
//! weights (weighted mode).
//!
//! # Complexity
//! O(n * r) rule evaluations plus O(n log n * r) comparisons for `n`
//! subjects and `r` rules.

use std::cmp::Ordering;
use std::sync::Arc;

use super::{rules, RuleScore, SchedulingContext, SubjectRule};
use crate::models::Subject;

/// How the rule scores of a subject are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvaluationMode {
    /// Later rules only decide ties left by earlier ones.
    #[default]
    Sequential,
    /// Rules are summed with their weights; tie-breaker rules weigh zero.
    Weighted,
}

/// Final ordering once every rule ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TieBreaker {
    /// Input order is kept.
    #[default]
    NextRule,
    /// Subject code, ascending.
    ById,
}

/// Scores closer than this count as a tie.
const TIE_EPSILON: f64 = 1e-9;

/// Orders subjects for placement.
///
/// # Example
/// ```
/// use u_timetable::dispatching::RuleEngine;
/// use u_timetable::dispatching::rules;
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::HighestPriority)
///     .with_tie_breaker(rules::MostRemaining);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<(Arc<dyn SubjectRule>, f64)>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
}

impl RuleEngine {
    /// An engine without rules; every subject ties.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::NextRule,
        }
    }

    /// Priority descending, session length descending, remaining sessions
    /// descending, then subject code.
    pub fn timetabling() -> Self {
        Self::new()
            .with_rule(rules::HighestPriority)
            .with_tie_breaker(rules::LongestSession)
            .with_tie_breaker(rules::MostRemaining)
            .with_final_tie_breaker(TieBreaker::ById)
    }

    /// Appends a rule with weight 1.
    pub fn with_rule<R: SubjectRule + 'static>(self, rule: R) -> Self {
        self.push(rule, 1.0)
    }

    /// Appends a rule with an explicit weight.
    pub fn with_weighted_rule<R: SubjectRule + 'static>(self, rule: R, weight: f64) -> Self {
        self.push(rule, weight)
    }

    /// Appends a rule that only matters in sequential mode.
    pub fn with_tie_breaker<R: SubjectRule + 'static>(self, rule: R) -> Self {
        self.push(rule, 0.0)
    }

    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    fn push<R: SubjectRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push((Arc::new(rule), weight));
        self
    }

    /// Placement order as indices into `subjects`.
    pub fn sort_indices(&self, subjects: &[Subject], context: &SchedulingContext) -> Vec<usize> {
        let rows: Vec<Vec<RuleScore>> = subjects
            .iter()
            .map(|subject| self.score_row(subject, context))
            .collect();

        let mut order: Vec<usize> = (0..subjects.len()).collect();
        order.sort_by(|&a, &b| {
            self.compare_rows(&rows[a], &rows[b])
                .then_with(|| self.final_tie(&subjects[a], &subjects[b]))
        });
        order
    }

    fn score_row(&self, subject: &Subject, context: &SchedulingContext) -> Vec<RuleScore> {
        let scores = self
            .rules
            .iter()
            .map(|(rule, weight)| (rule.evaluate(subject, context), *weight));
        match self.mode {
            EvaluationMode::Sequential => scores.map(|(score, _)| score).collect(),
            EvaluationMode::Weighted => vec![scores.map(|(score, w)| score * w).sum()],
        }
    }

    fn compare_rows(&self, a: &[RuleScore], b: &[RuleScore]) -> Ordering {
        a.iter()
            .zip(b)
            .find(|(x, y)| (*x - *y).abs() > TIE_EPSILON)
            .map_or(Ordering::Equal, |(x, y)| x.total_cmp(y))
    }

    fn final_tie(&self, a: &Subject, b: &Subject) -> Ordering {
        match self.tie_breaker {
            TieBreaker::NextRule => Ordering::Equal,
            TieBreaker::ById => a.code.cmp(&b.code),
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::timetabling()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules: Vec<String> = self
            .rules
            .iter()
            .map(|(rule, weight)| format!("{}(w={weight})", rule.name()))
            .collect();
        f.debug_struct("RuleEngine")
            .field("rules", &rules)
            .field("mode", &self.mode)
            .field("tie_breaker", &self.tie_breaker)
            .finish()
    }
}
