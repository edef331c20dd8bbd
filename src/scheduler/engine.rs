//! Assignment engine: deterministic greedy placement with bounded repair.
//!
//! # Algorithm
//!
//! 1. Order subjects with the rule engine (priority, session length,
//!    remaining sessions, code).
//! 2. For each required session, enumerate every (qualified teacher,
//!    compatible classroom, slot) tuple, keep the feasible ones and pick
//!    the highest score. Ties go to the smallest (teacher, classroom,
//!    slot) identifiers.
//! 3. If nothing is feasible, repair: undo the most recent entry of
//!    another subject that competes for the same teachers or rooms, place
//!    the stuck session, then re-place the undone session from scratch.
//!    A failed attempt is reverted completely. Each attempt costs one unit
//!    of the subject's retry budget.
//! 4. Sessions still unplaced when the budget or the candidate victims run
//!    out are reported as unscheduled.
//!
//! # Complexity
//! O(n * t * r * s * e) per pass where n = sessions, t = teachers,
//! r = rooms, s = slots and e = entries already placed.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", §3 (direct heuristics)

use std::cmp::Ordering;

use tracing::{debug, info, warn};

use crate::config::SchedulingConfig;
use crate::dispatching::{RuleEngine, SchedulingContext};
use crate::error::Result;
use crate::evaluator::{Candidate, ConstraintEvaluator, Preferences};
use crate::models::{Schedule, ScheduleEntry, Subject, UnscheduledSession};
use crate::registry::Registry;
use crate::workload::WorkloadTracker;

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    /// Placed sessions.
    pub schedule: Schedule,
    /// Required sessions that could not be placed.
    pub unscheduled: Vec<UnscheduledSession>,
    /// Successful repairs performed.
    pub repairs: u32,
}

impl GenerationResult {
    /// Whether every required session was placed.
    pub fn is_complete(&self) -> bool {
        self.unscheduled.is_empty()
    }

    /// Total number of missing sessions.
    pub fn missing_sessions(&self) -> u32 {
        self.unscheduled.iter().map(|u| u.missing).sum()
    }
}

/// A ranked feasible placement for one more session.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// Entry the placement would add.
    pub entry: ScheduleEntry,
    /// Soft-preference score (higher is better).
    pub score: f64,
}

/// Working state of one run: the private schedule copy and its tracker.
struct Placement<'r> {
    evaluator: ConstraintEvaluator<'r>,
    schedule: Schedule,
    tracker: WorkloadTracker,
}

impl<'r> Placement<'r> {
    fn registry(&self) -> &'r Registry {
        self.evaluator.registry()
    }

    fn best(&self, subject: &'r Subject) -> Option<Candidate<'r>> {
        best_candidate(&self.evaluator, subject, &self.schedule, &self.tracker)
    }

    fn commit(&mut self, candidate: &Candidate<'r>) {
        self.schedule.push(candidate.to_entry());
        self.tracker.commit(
            &candidate.teacher.employee_code,
            candidate.slot,
            candidate.subject.duration_minutes,
        );
    }

    /// Removes the entry at `index` and releases its workload.
    fn undo(&mut self, index: usize) -> Result<Option<ScheduleEntry>> {
        let Some(entry) = self.schedule.remove(index) else {
            return Ok(None);
        };
        let registry = self.registry();
        let subject = registry.subject(&entry.subject)?;
        let slot = registry.slot(entry.slot)?;
        self.tracker
            .rollback(&entry.teacher, slot, subject.duration_minutes)?;
        Ok(Some(entry))
    }

    /// Puts an undone entry back at its original position.
    fn restore(&mut self, index: usize, entry: ScheduleEntry) -> Result<()> {
        let registry = self.registry();
        let subject = registry.subject(&entry.subject)?;
        let slot = registry.slot(entry.slot)?;
        self.tracker
            .commit(&entry.teacher, slot, subject.duration_minutes);
        self.schedule.insert(index, entry);
        Ok(())
    }

    /// Entries a stuck subject may displace, most recent first.
    fn victims(&self, stuck: &Subject) -> Vec<usize> {
        let registry = self.registry();
        self.schedule
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, e)| e.subject != stuck.code)
            .filter(|(_, e)| {
                let teacher_competes = registry
                    .teachers
                    .find(e.teacher.as_str())
                    .is_some_and(|t| t.can_teach(&stuck.code));
                let room_competes = registry
                    .classrooms
                    .find(e.classroom.as_str())
                    .is_some_and(|c| c.suits(stuck));
                teacher_competes || room_competes
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// One atomic repair attempt. On failure the state is left as it was.
    fn try_repair(&mut self, stuck: &'r Subject, victim: usize) -> Result<bool> {
        let Some(entry) = self.undo(victim)? else {
            return Ok(false);
        };
        let displaced = self.registry().subject(&entry.subject)?;

        let Some(placed) = self.best(stuck) else {
            self.restore(victim, entry)?;
            return Ok(false);
        };
        self.commit(&placed);

        match self.best(displaced) {
            Some(replacement) => {
                self.commit(&replacement);
                Ok(true)
            }
            None => {
                let last = self.schedule.len() - 1;
                self.undo(last)?;
                self.restore(victim, entry)?;
                Ok(false)
            }
        }
    }
}

/// Ranks two scored candidates: higher score first, then smallest ids.
fn rank(a: (f64, &Candidate<'_>), b: (f64, &Candidate<'_>)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| candidate_key(a.1).cmp(&candidate_key(b.1)))
}

fn candidate_key<'c>(c: &Candidate<'c>) -> (&'c str, &'c str, u32) {
    (
        c.teacher.employee_code.as_str(),
        c.classroom.room_number.as_str(),
        c.slot.id,
    )
}

/// Feasible candidates for one more session of `subject`, with scores.
fn feasible_candidates<'r, 'a>(
    evaluator: &'a ConstraintEvaluator<'r>,
    subject: &'r Subject,
    schedule: &'a Schedule,
    tracker: &'a WorkloadTracker,
) -> impl Iterator<Item = (f64, Candidate<'r>)> + 'a
where
    'r: 'a,
{
    let registry = evaluator.registry();
    registry.qualified_teachers(subject).flat_map(move |teacher| {
        registry
            .compatible_classrooms(subject)
            .flat_map(move |classroom| {
                registry
                    .slots
                    .list()
                    .map(move |slot| Candidate::new(subject, teacher, classroom, slot))
            })
            .filter(move |c| evaluator.is_feasible(c, schedule, tracker))
            .map(move |c| (evaluator.score(&c, schedule, tracker), c))
    })
}

fn best_candidate<'r>(
    evaluator: &ConstraintEvaluator<'r>,
    subject: &'r Subject,
    schedule: &Schedule,
    tracker: &WorkloadTracker,
) -> Option<Candidate<'r>> {
    feasible_candidates(evaluator, subject, schedule, tracker)
        .min_by(|a, b| rank((a.0, &a.1), (b.0, &b.1)))
        .map(|(_, c)| c)
}

/// Deterministic timetable generator.
///
/// # Example
///
/// ```
/// use u_timetable::config::SchedulingConfig;
/// use u_timetable::models::{Classroom, RoomType, Subject, Teacher};
/// use u_timetable::registry::Registry;
/// use u_timetable::scheduler::AssignmentEngine;
///
/// let config = SchedulingConfig::default();
/// let mut registry = Registry::with_slots_from(&config).unwrap();
/// registry.add_subject(Subject::new("MATH", "Math").with_sessions(3)).unwrap();
/// registry.add_teacher(Teacher::new("T1", "Ada").qualified_for("MATH")).unwrap();
/// registry.add_classroom(Classroom::new("R1", 30, RoomType::Classroom)).unwrap();
///
/// let result = AssignmentEngine::new(config).generate(&registry).unwrap();
/// assert_eq!(result.schedule.len(), 3);
/// assert!(result.is_complete());
/// ```
#[derive(Debug, Clone)]
pub struct AssignmentEngine {
    config: SchedulingConfig,
    rule_engine: RuleEngine,
    preferences: Option<Preferences>,
}

impl AssignmentEngine {
    /// Creates an engine with the default subject order and the built-in
    /// preferences weighted by `config.weights`.
    pub fn new(config: SchedulingConfig) -> Self {
        Self {
            config,
            rule_engine: RuleEngine::timetabling(),
            preferences: None,
        }
    }

    /// Sets a rule engine for subject ordering.
    pub fn with_rule_engine(mut self, engine: RuleEngine) -> Self {
        self.rule_engine = engine;
        self
    }

    /// Replaces the soft preferences.
    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    fn evaluator<'r>(&'r self, registry: &'r Registry) -> ConstraintEvaluator<'r> {
        let evaluator = ConstraintEvaluator::new(registry, &self.config);
        match &self.preferences {
            Some(p) => evaluator.with_preferences(p.clone()),
            None => evaluator,
        }
    }

    /// Generates a schedule for every subject in the registry.
    ///
    /// Best-effort: sessions that cannot be placed are reported in
    /// [`GenerationResult::unscheduled`], never as an error.
    ///
    /// # Errors
    /// `InfeasibleConfiguration` if the configuration contradicts itself.
    pub fn generate(&self, registry: &Registry) -> Result<GenerationResult> {
        self.config.check()?;

        info!(
            event = "generation_start",
            subjects = registry.subjects.len(),
            teachers = registry.teachers.len(),
            classrooms = registry.classrooms.len(),
            slots = registry.slots.len(),
        );

        let subjects: Vec<Subject> = registry.subjects.list().cloned().collect();
        let context = SchedulingContext::from_registry(registry, &Schedule::new());
        let order = self.rule_engine.sort_indices(&subjects, &context);

        let mut state = Placement {
            evaluator: self.evaluator(registry),
            schedule: Schedule::new(),
            tracker: WorkloadTracker::new(self.config.consecutive_gap_minutes),
        };
        let mut unscheduled = Vec::new();
        let mut repairs = 0u32;

        for index in order {
            let subject = registry.subject(&subjects[index].code)?;
            let mut budget = self.config.max_repair_attempts;
            let mut placed = 0u32;

            while placed < subject.sessions_per_week {
                if let Some(candidate) = state.best(subject) {
                    debug!(
                        event = "session_placed",
                        subject = %subject.code,
                        teacher = %candidate.teacher.employee_code,
                        classroom = %candidate.classroom.room_number,
                        slot = %candidate.slot,
                    );
                    state.commit(&candidate);
                    placed += 1;
                    continue;
                }

                let mut repaired = false;
                for victim in state.victims(subject) {
                    if budget == 0 {
                        break;
                    }
                    budget -= 1;
                    debug!(
                        event = "repair_attempt",
                        subject = %subject.code,
                        victim_index = victim,
                        budget_left = budget,
                    );
                    if state.try_repair(subject, victim)? {
                        debug!(event = "repair_succeeded", subject = %subject.code);
                        repaired = true;
                        break;
                    }
                }
                if !repaired {
                    break;
                }
                repairs += 1;
                placed += 1;
            }

            let missing = subject.sessions_per_week - placed;
            if missing > 0 {
                warn!(
                    event = "subject_unscheduled",
                    subject = %subject.code,
                    missing = missing,
                    budget_left = budget,
                );
                unscheduled.push(UnscheduledSession::new(&subject.code, missing));
            }
        }

        info!(
            event = "generation_end",
            placed = state.schedule.len(),
            unscheduled = unscheduled.iter().map(|u| u.missing).sum::<u32>(),
            repairs = repairs,
        );

        Ok(GenerationResult {
            schedule: state.schedule,
            unscheduled,
            repairs,
        })
    }

    /// Ranked feasible placements for one more session of `subject` on top
    /// of an existing schedule.
    ///
    /// # Errors
    /// `NotFound` if the subject is unknown.
    pub fn suggest(
        &self,
        registry: &Registry,
        schedule: &Schedule,
        subject: &str,
        limit: usize,
    ) -> Result<Vec<Suggestion>> {
        let subject = registry.subject(subject)?;
        let evaluator = self.evaluator(registry);
        let tracker =
            WorkloadTracker::from_schedule(schedule, registry, self.config.consecutive_gap_minutes);

        let mut ranked: Vec<(f64, Candidate<'_>)> =
            feasible_candidates(&evaluator, subject, schedule, &tracker).collect();
        ranked.sort_by(|a, b| rank((a.0, &a.1), (b.0, &b.1)));

        Ok(ranked
            .into_iter()
            .take(limit)
            .map(|(score, c)| Suggestion {
                entry: c.to_entry(),
                score,
            })
            .collect())
    }
}
