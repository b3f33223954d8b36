use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical muscle groups a tag can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Abs,
    Core,
    Traps,
    RearDelts,
}

pub const ALL_MUSCLE_GROUPS: [MuscleGroup; 14] = [
    MuscleGroup::Chest,
    MuscleGroup::Back,
    MuscleGroup::Shoulders,
    MuscleGroup::Biceps,
    MuscleGroup::Triceps,
    MuscleGroup::Forearms,
    MuscleGroup::Quads,
    MuscleGroup::Hamstrings,
    MuscleGroup::Glutes,
    MuscleGroup::Calves,
    MuscleGroup::Abs,
    MuscleGroup::Core,
    MuscleGroup::Traps,
    MuscleGroup::RearDelts,
];

impl MuscleGroup {
    /// Identifier used in tag tables and CSV overrides.
    pub fn as_str(self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Forearms => "forearms",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Calves => "calves",
            MuscleGroup::Abs => "abs",
            MuscleGroup::Core => "core",
            MuscleGroup::Traps => "traps",
            MuscleGroup::RearDelts => "rear_delts",
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMuscleGroup(pub String);

impl fmt::Display for UnknownMuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown muscle group: {}", self.0)
    }
}

impl std::error::Error for UnknownMuscleGroup {}

impl FromStr for MuscleGroup {
    type Err = UnknownMuscleGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        ALL_MUSCLE_GROUPS
            .iter()
            .copied()
            .find(|m| m.as_str() == normalized)
            .ok_or(UnknownMuscleGroup(s.to_string()))
    }
}

/// Trim and lowercase a tag or exercise name before comparing it.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Compiled-in tag table, English and Italian.
///
/// Movement-pattern tags (`push`, `row`, `curl`, ...) map to the muscle group
/// they mostly load so that loosely tagged exercises still show up.
pub static DEFAULT_TAG_MAP: phf::Map<&'static str, MuscleGroup> = phf_map! {
    // chest
    "chest" => MuscleGroup::Chest,
    "petto" => MuscleGroup::Chest,
    "pettorale" => MuscleGroup::Chest,
    "pettoralesuperior" => MuscleGroup::Chest,
    "pettoraleinferior" => MuscleGroup::Chest,
    "pettoralemedio" => MuscleGroup::Chest,
    // back
    "back" => MuscleGroup::Back,
    "schiena" => MuscleGroup::Back,
    "dorsale" => MuscleGroup::Back,
    // shoulders
    "shoulders" => MuscleGroup::Shoulders,
    "spalle" => MuscleGroup::Shoulders,
    "deltoidi" => MuscleGroup::Shoulders,
    "deltoideanteriore" => MuscleGroup::Shoulders,
    "deltoidilaterale" => MuscleGroup::Shoulders,
    // arms
    "biceps" => MuscleGroup::Biceps,
    "bicipiti" => MuscleGroup::Biceps,
    "triceps" => MuscleGroup::Triceps,
    "tricipiti" => MuscleGroup::Triceps,
    // legs
    "legs" => MuscleGroup::Quads,
    "gambe" => MuscleGroup::Quads,
    "quads" => MuscleGroup::Quads,
    "quadricipiti" => MuscleGroup::Quads,
    "hamstrings" => MuscleGroup::Hamstrings,
    "ischiocrurali" => MuscleGroup::Hamstrings,
    "femorali" => MuscleGroup::Hamstrings,
    // glutes
    "glutes" => MuscleGroup::Glutes,
    "glutei" => MuscleGroup::Glutes,
    "gluteo" => MuscleGroup::Glutes,
    "grandegluteo" => MuscleGroup::Glutes,
    "abduttori" => MuscleGroup::Glutes,
    "adduttori" => MuscleGroup::Glutes,
    // calves
    "calves" => MuscleGroup::Calves,
    "polpacci" => MuscleGroup::Calves,
    // core
    "abs" => MuscleGroup::Abs,
    "addominali" => MuscleGroup::Abs,
    "core" => MuscleGroup::Core,
    "cardio" => MuscleGroup::Core,
    // secondary
    "forearms" => MuscleGroup::Forearms,
    "avambracci" => MuscleGroup::Forearms,
    "traps" => MuscleGroup::Traps,
    "trapezi" => MuscleGroup::Traps,
    "rear_delts" => MuscleGroup::RearDelts,
    "deltoidi_posteriori" => MuscleGroup::RearDelts,
    "deltoidiposteriori" => MuscleGroup::RearDelts,
    // movement patterns
    "push" => MuscleGroup::Chest,
    "pull" => MuscleGroup::Back,
    "squat" => MuscleGroup::Quads,
    "deadlift" => MuscleGroup::Back,
    "press" => MuscleGroup::Shoulders,
    "curl" => MuscleGroup::Biceps,
    "extension" => MuscleGroup::Triceps,
    "fly" => MuscleGroup::Chest,
    "row" => MuscleGroup::Back,
    "spintaanca" => MuscleGroup::Glutes,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        assert_eq!("rear_delts".parse::<MuscleGroup>(), Ok(MuscleGroup::RearDelts));
        assert_eq!(" Chest ".parse::<MuscleGroup>(), Ok(MuscleGroup::Chest));
        assert!("legs".parse::<MuscleGroup>().is_err());
    }

    #[test]
    fn names_round_trip_through_display() {
        for m in ALL_MUSCLE_GROUPS {
            assert_eq!(m.to_string().parse::<MuscleGroup>(), Ok(m));
        }
    }

    #[test]
    fn default_table_covers_every_group() {
        assert_eq!(DEFAULT_TAG_MAP.len(), 54);
        for m in ALL_MUSCLE_GROUPS {
            assert!(
                DEFAULT_TAG_MAP.values().any(|v| *v == m),
                "no tag for {m}"
            );
        }
        assert_eq!(DEFAULT_TAG_MAP.get("gambe"), Some(&MuscleGroup::Quads));
    }
}
