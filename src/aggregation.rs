// Module for turning logged sets into per-muscle training volume
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::muscles::{ALL_MUSCLE_GROUPS, MuscleGroup};
use crate::tag_resolver::TagResolver;
use crate::tag_source::TagSource;

/// A single logged set as handed over by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601 date or date-time.
    pub date: String,
    pub exercise: String,
    pub reps: u32,
    pub weight: f64,
    /// `reps * weight`, kept as logged.
    pub volume: f64,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

impl LogEntry {
    pub fn new(date: impl Into<String>, exercise: impl Into<String>, reps: u32, weight: f64) -> Self {
        Self {
            date: date.into(),
            exercise: exercise.into(),
            reps,
            weight,
            volume: reps as f64 * weight,
            custom_fields: BTreeMap::new(),
        }
    }

    /// Parsed timestamp, or `None` when the date is not ISO-8601.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        parse_entry_date(&self.date)
    }
}

fn parse_entry_date(date: &str) -> Option<NaiveDateTime> {
    let date = date.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Look-back window applied before aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Week,
    Month,
    Year,
}

pub const ALL_TIME_FRAMES: [TimeFrame; 3] = [TimeFrame::Week, TimeFrame::Month, TimeFrame::Year];

impl TimeFrame {
    pub fn days(self) -> i64 {
        match self {
            TimeFrame::Week => 7,
            TimeFrame::Month => 30,
            TimeFrame::Year => 365,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeFrame::Week => "Week",
            TimeFrame::Month => "Month",
            TimeFrame::Year => "Year",
        }
    }
}

/// Keep the entries logged within `frame` of the current local time.
pub fn filter_by_time_frame(entries: &[LogEntry], frame: TimeFrame) -> Vec<LogEntry> {
    filter_by_time_frame_at(entries, frame, Local::now().naive_local())
}

/// Same as [`filter_by_time_frame`] with an explicit notion of "now".
///
/// Entries with an unparseable date never match.
pub fn filter_by_time_frame_at(
    entries: &[LogEntry],
    frame: TimeFrame,
    now: NaiveDateTime,
) -> Vec<LogEntry> {
    let cutoff = now - Duration::days(frame.days());
    entries
        .iter()
        .filter(|e| e.timestamp().is_some_and(|t| t >= cutoff))
        .cloned()
        .collect()
}

/// Training volume attributed to one muscle group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MuscleGroupRecord {
    pub name: MuscleGroup,
    pub volume: f64,
    pub exercises: BTreeSet<String>,
    /// `volume` relative to the busiest muscle group, in `[0, 1]`.
    pub intensity: f64,
}

impl MuscleGroupRecord {
    fn empty(name: MuscleGroup) -> Self {
        Self {
            name,
            volume: 0.0,
            exercises: BTreeSet::new(),
            intensity: 0.0,
        }
    }
}

pub type MuscleVolumes = BTreeMap<MuscleGroup, MuscleGroupRecord>;

/// Sum volume per muscle group.
///
/// Every muscle group is present in the result. An exercise resolving to
/// several groups adds its full volume to each of them; volume is never split.
/// Entries are resolved one after another so each exercise hits the tag
/// source at most once per resolver cache lifetime.
pub fn aggregate<S: TagSource>(entries: &[LogEntry], resolver: &mut TagResolver<S>) -> MuscleVolumes {
    let mut volumes: MuscleVolumes = ALL_MUSCLE_GROUPS
        .iter()
        .map(|m| (*m, MuscleGroupRecord::empty(*m)))
        .collect();

    for e in entries {
        if !e.volume.is_finite() || e.volume < 0.0 {
            log::warn!("Skipping '{}' on {}: invalid volume {}", e.exercise, e.date, e.volume);
            continue;
        }
        for muscle in resolver.resolve_muscle_groups(&e.exercise) {
            if let Some(record) = volumes.get_mut(&muscle) {
                record.volume += e.volume;
                record.exercises.insert(e.exercise.clone());
            }
        }
    }

    let max = volumes.values().map(|r| r.volume).fold(0.0_f64, f64::max).max(1.0);
    for record in volumes.values_mut() {
        record.intensity = (record.volume / max).clamp(0.0, 1.0);
    }

    log::debug!("Aggregated {} entries", entries.len());
    volumes
}

/// Total volume across a set of muscle groups. Missing groups count as zero.
pub fn total_volume(volumes: &MuscleVolumes, muscles: &[MuscleGroup]) -> f64 {
    muscles
        .iter()
        .filter_map(|m| volumes.get(m))
        .map(|r| r.volume)
        .sum()
}
