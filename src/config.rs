//! Scheduling configuration.
//!
//! An explicit value object handed to the engine, evaluator and
//! validator at construction time. The core never reads environment
//! variables or files; callers may build a config in code or parse one
//! from TOML with [`SchedulingConfig::from_toml_str`].
//!
//! # Example
//!
//! ```
//! use u_timetable::config::SchedulingConfig;
//!
//! let config = SchedulingConfig::from_toml_str(r#"
//!     day_start = "08:00"
//!     day_end = "16:00"
//!     max_consecutive_hours = 2
//!
//!     [weights]
//!     morning = 4.0
//! "#).unwrap();
//!
//! assert_eq!(config.max_consecutive_hours, 2);
//! assert_eq!(config.max_weekly_hours_per_teacher, 40); // default
//! ```

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Result, TimetableError};
use crate::models::{daily_layout, minute_of_day, Day};

/// Hours in a week; no hour cap may exceed it.
const HOURS_PER_WEEK: u32 = 7 * 24;

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Infeasible(#[from] TimetableError),
}

/// Weights of the soft preferences.
///
/// Higher total score = better candidate. Weights only rank feasible
/// candidates; they never make a candidate infeasible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Bonus for slots starting before noon (when morning sessions are preferred).
    pub morning: f64,
    /// Penalty per hour of load above the mean of the qualified teachers.
    pub workload_balance: f64,
    /// Penalty for an isolated session in a teacher's day.
    pub fragmentation: f64,
    /// Penalty per session of the same subject already on that day.
    pub subject_spread: f64,
    /// Penalty scaled by the unused seat fraction of the room.
    pub room_fit: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            morning: 10.0,
            workload_balance: 1.0,
            fragmentation: 5.0,
            subject_spread: 25.0,
            room_fit: 2.0,
        }
    }
}

/// Scheduling configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingConfig {
    /// Days on which slots are generated.
    pub working_days: Vec<Day>,
    /// First slot start.
    #[serde(with = "hhmm")]
    pub day_start: NaiveTime,
    /// Latest slot end.
    #[serde(with = "hhmm")]
    pub day_end: NaiveTime,
    /// Lunch break start (equal to `lunch_end` = no lunch break).
    #[serde(with = "hhmm")]
    pub lunch_start: NaiveTime,
    /// Lunch break end.
    #[serde(with = "hhmm")]
    pub lunch_end: NaiveTime,
    /// Length of generated slots (minutes).
    pub session_minutes: u32,
    /// Longest allowed run of consecutive teaching (hours).
    pub max_consecutive_hours: u32,
    /// Weekly teaching cap for every teacher (hours).
    pub max_weekly_hours_per_teacher: u32,
    /// Reward slots that start before noon.
    pub prefer_morning_sessions: bool,
    /// How much longer than the session a slot may be (minutes).
    pub duration_slack_minutes: u32,
    /// Gaps shorter than this (minutes) do not break a consecutive run.
    ///
    /// A gap of exactly this length ends the run, so with the defaults
    /// 45-minute sessions in 60-minute slots never form a run.
    pub consecutive_gap_minutes: u32,
    /// Repair attempts per subject before sessions are reported unscheduled.
    pub max_repair_attempts: u32,
    /// Soft preference weights.
    pub weights: ScoringWeights,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            working_days: Day::WEEKDAYS.to_vec(),
            day_start: hm(9, 0),
            day_end: hm(17, 0),
            lunch_start: hm(12, 0),
            lunch_end: hm(13, 0),
            session_minutes: 60,
            max_consecutive_hours: 3,
            max_weekly_hours_per_teacher: 40,
            prefer_morning_sessions: true,
            duration_slack_minutes: 30,
            consecutive_gap_minutes: 15,
            max_repair_attempts: 50,
            weights: ScoringWeights::default(),
        }
    }
}

impl SchedulingConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and checks a configuration from TOML. Missing keys take defaults.
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.check()?;
        Ok(config)
    }

    /// Sets the daily bounds.
    pub fn with_day(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.day_start = start;
        self.day_end = end;
        self
    }

    /// Sets the lunch break.
    pub fn with_lunch(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.lunch_start = start;
        self.lunch_end = end;
        self
    }

    /// Removes the lunch break.
    pub fn without_lunch(mut self) -> Self {
        self.lunch_end = self.lunch_start;
        self
    }

    /// Sets the working days.
    pub fn with_working_days(mut self, days: impl IntoIterator<Item = Day>) -> Self {
        self.working_days = days.into_iter().collect();
        self
    }

    /// Sets the consecutive-hours cap.
    pub fn with_max_consecutive_hours(mut self, hours: u32) -> Self {
        self.max_consecutive_hours = hours;
        self
    }

    /// Sets the weekly-hours cap.
    pub fn with_max_weekly_hours(mut self, hours: u32) -> Self {
        self.max_weekly_hours_per_teacher = hours;
        self
    }

    /// Enables or disables the morning preference.
    pub fn with_prefer_morning(mut self, prefer: bool) -> Self {
        self.prefer_morning_sessions = prefer;
        self
    }

    /// Sets the repair budget per subject.
    pub fn with_max_repair_attempts(mut self, attempts: u32) -> Self {
        self.max_repair_attempts = attempts;
        self
    }

    /// Sets how much longer than a session its slot may be.
    pub fn with_duration_slack(mut self, minutes: u32) -> Self {
        self.duration_slack_minutes = minutes;
        self
    }

    /// Whether a lunch break is configured.
    pub fn has_lunch_break(&self) -> bool {
        self.lunch_start < self.lunch_end
    }

    /// Checks the configuration for self-contradictions.
    ///
    /// # Errors
    /// `InfeasibleConfiguration` naming the first offending field.
    pub fn check(&self) -> Result<()> {
        if self.working_days.is_empty() {
            return Err(TimetableError::infeasible(
                "working_days",
                "at least one working day is required",
            ));
        }
        if self.day_end <= self.day_start {
            return Err(TimetableError::infeasible(
                "day_end",
                format!("{} is not after day_start {}", self.day_end, self.day_start),
            ));
        }
        if self.lunch_end < self.lunch_start {
            return Err(TimetableError::infeasible(
                "lunch_end",
                format!(
                    "{} is before lunch_start {}",
                    self.lunch_end, self.lunch_start
                ),
            ));
        }
        if self.has_lunch_break()
            && (self.lunch_start < self.day_start || self.lunch_end > self.day_end)
        {
            return Err(TimetableError::infeasible(
                "lunch_start",
                "lunch break lies outside the daily bounds",
            ));
        }
        if self.session_minutes == 0 {
            return Err(TimetableError::infeasible(
                "session_minutes",
                "must be greater than zero",
            ));
        }
        let span = minute_of_day(self.day_end) - minute_of_day(self.day_start);
        if self.session_minutes > span {
            return Err(TimetableError::infeasible(
                "session_minutes",
                format!("{} exceeds the {span}-minute day", self.session_minutes),
            ));
        }
        if self.max_consecutive_hours == 0 || self.max_consecutive_hours > HOURS_PER_WEEK {
            return Err(TimetableError::infeasible(
                "max_consecutive_hours",
                format!("must be between 1 and {HOURS_PER_WEEK}"),
            ));
        }
        if self.max_weekly_hours_per_teacher == 0
            || self.max_weekly_hours_per_teacher > HOURS_PER_WEEK
        {
            return Err(TimetableError::infeasible(
                "max_weekly_hours_per_teacher",
                format!("must be between 1 and {HOURS_PER_WEEK}"),
            ));
        }
        if self.slots_per_day() == 0 {
            return Err(TimetableError::infeasible(
                "session_minutes",
                format!(
                    "no {}-minute slot fits between {} and {}",
                    self.session_minutes, self.day_start, self.day_end
                ),
            ));
        }
        Ok(())
    }

    /// Number of slots generated per working day.
    pub fn slots_per_day(&self) -> usize {
        daily_layout(
            minute_of_day(self.day_start),
            minute_of_day(self.day_end),
            (minute_of_day(self.lunch_start), minute_of_day(self.lunch_end)),
            self.session_minutes,
        )
        .len()
    }

    /// Teaching hours per day (daily span minus lunch).
    pub fn working_hours_per_day(&self) -> f64 {
        let span = minute_of_day(self.day_end).saturating_sub(minute_of_day(self.day_start));
        let lunch = minute_of_day(self.lunch_end).saturating_sub(minute_of_day(self.lunch_start));
        span.saturating_sub(lunch) as f64 / 60.0
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

/// `"HH:MM"` (de)serialization for clock times.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(t: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&t.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_consistent() {
        let c = SchedulingConfig::default();
        assert!(c.check().is_ok());
        assert_eq!(c.slots_per_day(), 7);
        assert!((c.working_hours_per_day() - 7.0).abs() < 1e-10);
        assert!(c.has_lunch_break());
    }

    #[test]
    fn test_lunch_outside_bounds_rejected() {
        let c = SchedulingConfig::default().with_lunch(hm(7, 0), hm(8, 0));
        let err = c.check().unwrap_err();
        assert!(matches!(
            err,
            TimetableError::InfeasibleConfiguration {
                field: "lunch_start",
                ..
            }
        ));
    }

    #[test]
    fn test_inverted_day_rejected() {
        let c = SchedulingConfig::default().with_day(hm(17, 0), hm(9, 0));
        assert!(matches!(
            c.check(),
            Err(TimetableError::InfeasibleConfiguration { field: "day_end", .. })
        ));
    }

    #[test]
    fn test_zero_caps_rejected() {
        let c = SchedulingConfig::default().with_max_consecutive_hours(0);
        assert!(matches!(
            c.check(),
            Err(TimetableError::InfeasibleConfiguration {
                field: "max_consecutive_hours",
                ..
            })
        ));

        let c = SchedulingConfig::default().with_max_weekly_hours(0);
        assert!(c.check().is_err());

        let c = SchedulingConfig::default().with_working_days([]);
        assert!(c.check().is_err());
    }

    #[test]
    fn test_no_slot_fits_rejected() {
        let c = SchedulingConfig {
            session_minutes: 120,
            ..SchedulingConfig::default()
        }
        .with_day(hm(9, 0), hm(10, 30))
        .without_lunch();
        assert!(c.check().is_err());
    }

    #[test]
    fn test_extreme_values_rejected() {
        let c = SchedulingConfig {
            session_minutes: u32::MAX,
            ..SchedulingConfig::default()
        };
        assert!(matches!(
            c.check(),
            Err(TimetableError::InfeasibleConfiguration {
                field: "session_minutes",
                ..
            })
        ));
        assert_eq!(c.slots_per_day(), 0);

        let c = SchedulingConfig::default().with_max_consecutive_hours(100_000_000);
        assert!(matches!(
            c.check(),
            Err(TimetableError::InfeasibleConfiguration {
                field: "max_consecutive_hours",
                ..
            })
        ));

        let c = SchedulingConfig::default().with_max_weekly_hours(u32::MAX);
        assert!(matches!(
            c.check(),
            Err(TimetableError::InfeasibleConfiguration {
                field: "max_weekly_hours_per_teacher",
                ..
            })
        ));

        let c = SchedulingConfig::default().with_max_weekly_hours(168);
        assert!(c.check().is_ok());
    }

    #[test]
    fn test_without_lunch() {
        let c = SchedulingConfig::default().without_lunch();
        assert!(!c.has_lunch_break());
        assert_eq!(c.slots_per_day(), 8);
    }

    #[test]
    fn test_from_toml_str() {
        let c = SchedulingConfig::from_toml_str(
            r#"
            working_days = ["Monday", "Wednesday"]
            day_start = "08:30"
            lunch_start = "12:30"
            lunch_end = "13:30"
            prefer_morning_sessions = false

            [weights]
            subject_spread = 40.0
            "#,
        )
        .unwrap();

        assert_eq!(c.working_days, vec![Day::Monday, Day::Wednesday]);
        assert_eq!(c.day_start, hm(8, 30));
        assert_eq!(c.day_end, hm(17, 0));
        assert!(!c.prefer_morning_sessions);
        assert!((c.weights.subject_spread - 40.0).abs() < 1e-10);
        assert!((c.weights.morning - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_from_toml_str_errors() {
        let bad_time = SchedulingConfig::from_toml_str(r#"day_start = "9 o'clock""#);
        assert!(matches!(bad_time, Err(ConfigError::Toml(_))));

        let infeasible = SchedulingConfig::from_toml_str("max_consecutive_hours = 0");
        assert!(matches!(infeasible, Err(ConfigError::Infeasible(_))));
    }

    #[test]
    fn test_toml_roundtrip() {
        let c = SchedulingConfig::default();
        let text = toml::to_string(&c).unwrap();
        assert!(text.contains("day_start = \"09:00\""));
        let back: SchedulingConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, c);
    }
}
