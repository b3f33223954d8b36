//! Per-region volumes feeding the anatomical views.
//!
//! Every body part shares one record type, [`BodyPartData`]. Its layout comes
//! from a static [`BodyPartConfig`]: ordered groups of labelled parts plus a
//! table resolving field names to `(group, part)` positions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregation::MuscleVolumes;
use crate::muscles::MuscleGroup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyPart {
    Shoulders,
    Chest,
    Back,
    Arms,
    Legs,
    Core,
}

pub const ALL_BODY_PARTS: [BodyPart; 6] = [
    BodyPart::Shoulders,
    BodyPart::Chest,
    BodyPart::Back,
    BodyPart::Arms,
    BodyPart::Legs,
    BodyPart::Core,
];

#[derive(Debug, PartialEq)]
pub struct GroupConfig {
    pub title: &'static str,
    pub labels: &'static [&'static str],
}

#[derive(Debug, PartialEq)]
pub struct BodyPartConfig {
    pub part: BodyPart,
    pub groups: &'static [GroupConfig],
    pub fields: &'static [(&'static str, (usize, usize))],
}

const LR: &[&str] = &["R", "L"];

pub static SHOULDERS_CONFIG: BodyPartConfig = BodyPartConfig {
    part: BodyPart::Shoulders,
    groups: &[
        GroupConfig { title: "Front delts", labels: LR },
        GroupConfig { title: "Side delts", labels: LR },
        GroupConfig { title: "Rear delts", labels: LR },
    ],
    fields: &[
        ("front_right", (0, 0)),
        ("front_left", (0, 1)),
        ("lateral_right", (1, 0)),
        ("lateral_left", (1, 1)),
        ("rear_right", (2, 0)),
        ("rear_left", (2, 1)),
    ],
};

pub static CHEST_CONFIG: BodyPartConfig = BodyPartConfig {
    part: BodyPart::Chest,
    groups: &[GroupConfig {
        title: "Chest",
        labels: &["Upper", "Middle", "Lower"],
    }],
    fields: &[("upper", (0, 0)), ("middle", (0, 1)), ("lower", (0, 2))],
};

pub static BACK_CONFIG: BodyPartConfig = BodyPartConfig {
    part: BodyPart::Back,
    groups: &[GroupConfig {
        title: "Back",
        labels: &["Traps", "Mid traps", "Lats", "Lower"],
    }],
    fields: &[
        ("traps", (0, 0)),
        ("traps_middle", (0, 1)),
        ("lats", (0, 2)),
        ("lower_back", (0, 3)),
    ],
};

pub static ARMS_CONFIG: BodyPartConfig = BodyPartConfig {
    part: BodyPart::Arms,
    groups: &[
        GroupConfig { title: "Biceps", labels: LR },
        GroupConfig { title: "Triceps", labels: LR },
        GroupConfig { title: "Forearms", labels: LR },
    ],
    fields: &[
        ("biceps_right", (0, 0)),
        ("biceps_left", (0, 1)),
        ("triceps_right", (1, 0)),
        ("triceps_left", (1, 1)),
        ("forearms_right", (2, 0)),
        ("forearms_left", (2, 1)),
    ],
};

pub static LEGS_CONFIG: BodyPartConfig = BodyPartConfig {
    part: BodyPart::Legs,
    groups: &[
        GroupConfig { title: "Quads", labels: LR },
        GroupConfig { title: "Hamstrings", labels: LR },
        GroupConfig { title: "Glutes", labels: LR },
        GroupConfig { title: "Calves", labels: LR },
    ],
    fields: &[
        ("quads_right", (0, 0)),
        ("quads_left", (0, 1)),
        ("hamstrings_right", (1, 0)),
        ("hamstrings_left", (1, 1)),
        ("glutes_right", (2, 0)),
        ("glutes_left", (2, 1)),
        ("calves_right", (3, 0)),
        ("calves_left", (3, 1)),
    ],
};

pub static CORE_CONFIG: BodyPartConfig = BodyPartConfig {
    part: BodyPart::Core,
    groups: &[GroupConfig {
        title: "Core",
        labels: &["Abs", "Obliques"],
    }],
    fields: &[("abs", (0, 0)), ("obliques", (0, 1))],
};

impl BodyPart {
    pub fn config(self) -> &'static BodyPartConfig {
        match self {
            BodyPart::Shoulders => &SHOULDERS_CONFIG,
            BodyPart::Chest => &CHEST_CONFIG,
            BodyPart::Back => &BACK_CONFIG,
            BodyPart::Arms => &ARMS_CONFIG,
            BodyPart::Legs => &LEGS_CONFIG,
            BodyPart::Core => &CORE_CONFIG,
        }
    }
}

/// Share of a muscle group's volume assigned to one region field.
pub struct VolumeSplit {
    pub part: BodyPart,
    pub field: &'static str,
    pub muscle: MuscleGroup,
    pub factor: f64,
}

const fn split(part: BodyPart, field: &'static str, muscle: MuscleGroup, factor: f64) -> VolumeSplit {
    VolumeSplit {
        part,
        field,
        muscle,
        factor,
    }
}

/// How muscle-group volume is spread over the drawn regions.
///
/// Bilateral muscles are halved between sides. Lats and traps receive their
/// group's full volume while the lower back and mid traps get a fraction on
/// top, so region totals do not sum back to group totals.
pub static VOLUME_SPLITS: &[VolumeSplit] = &[
    split(BodyPart::Shoulders, "front_left", MuscleGroup::Shoulders, 0.5),
    split(BodyPart::Shoulders, "front_right", MuscleGroup::Shoulders, 0.5),
    split(BodyPart::Shoulders, "rear_left", MuscleGroup::RearDelts, 0.5),
    split(BodyPart::Shoulders, "rear_right", MuscleGroup::RearDelts, 0.5),
    split(BodyPart::Chest, "upper", MuscleGroup::Chest, 0.4),
    split(BodyPart::Chest, "middle", MuscleGroup::Chest, 0.4),
    split(BodyPart::Chest, "lower", MuscleGroup::Chest, 0.2),
    split(BodyPart::Back, "traps", MuscleGroup::Traps, 1.0),
    split(BodyPart::Back, "lats", MuscleGroup::Back, 1.0),
    split(BodyPart::Back, "lower_back", MuscleGroup::Back, 0.3),
    split(BodyPart::Back, "traps_middle", MuscleGroup::Traps, 0.5),
    split(BodyPart::Arms, "biceps_left", MuscleGroup::Biceps, 0.5),
    split(BodyPart::Arms, "biceps_right", MuscleGroup::Biceps, 0.5),
    split(BodyPart::Arms, "triceps_left", MuscleGroup::Triceps, 0.5),
    split(BodyPart::Arms, "triceps_right", MuscleGroup::Triceps, 0.5),
    split(BodyPart::Arms, "forearms_left", MuscleGroup::Forearms, 0.5),
    split(BodyPart::Arms, "forearms_right", MuscleGroup::Forearms, 0.5),
    split(BodyPart::Legs, "quads_left", MuscleGroup::Quads, 0.5),
    split(BodyPart::Legs, "quads_right", MuscleGroup::Quads, 0.5),
    split(BodyPart::Legs, "hamstrings_left", MuscleGroup::Hamstrings, 0.5),
    split(BodyPart::Legs, "hamstrings_right", MuscleGroup::Hamstrings, 0.5),
    split(BodyPart::Legs, "glutes_left", MuscleGroup::Glutes, 0.5),
    split(BodyPart::Legs, "glutes_right", MuscleGroup::Glutes, 0.5),
    split(BodyPart::Legs, "calves_left", MuscleGroup::Calves, 0.5),
    split(BodyPart::Legs, "calves_right", MuscleGroup::Calves, 0.5),
    split(BodyPart::Core, "abs", MuscleGroup::Abs, 1.0),
    split(BodyPart::Core, "obliques", MuscleGroup::Core, 0.5),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPart {
    pub label: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionGroup {
    pub title: &'static str,
    pub parts: Vec<RegionPart>,
}

/// Region values of one body part, laid out by its config.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyPartData {
    config: &'static BodyPartConfig,
    groups: Vec<RegionGroup>,
}

impl BodyPartData {
    pub fn zeroed(config: &'static BodyPartConfig) -> Self {
        let groups = config
            .groups
            .iter()
            .map(|g| RegionGroup {
                title: g.title,
                parts: g
                    .labels
                    .iter()
                    .map(|label| RegionPart {
                        label: *label,
                        value: 0.0,
                    })
                    .collect(),
            })
            .collect();
        Self { config, groups }
    }

    pub fn groups(&self) -> &[RegionGroup] {
        &self.groups
    }

    fn position(&self, field: &str) -> Option<(usize, usize)> {
        self.config
            .fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, pos)| *pos)
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        let (g, p) = self.position(field)?;
        self.groups.get(g)?.parts.get(p).map(|part| part.value)
    }

    /// Set a named field. Returns `false` when the field is unknown.
    pub fn set(&mut self, field: &str, value: f64) -> bool {
        let Some((g, p)) = self.position(field) else {
            return false;
        };
        match self.groups.get_mut(g).and_then(|group| group.parts.get_mut(p)) {
            Some(part) => {
                part.value = value;
                true
            }
            None => false,
        }
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.groups.iter().flat_map(|g| g.parts.iter().map(|p| p.value))
    }
}

/// Partial update for [`BodyData::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyDataPatch {
    updates: Vec<(BodyPart, String, f64)>,
}

impl BodyDataPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, part: BodyPart, field: impl Into<String>, value: f64) -> Self {
        self.updates.push((part, field.into(), value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

/// Region values for the whole body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyData {
    parts: BTreeMap<BodyPart, BodyPartData>,
}

impl Default for BodyData {
    fn default() -> Self {
        Self {
            parts: ALL_BODY_PARTS
                .iter()
                .map(|p| (*p, BodyPartData::zeroed(p.config())))
                .collect(),
        }
    }
}

impl BodyData {
    /// Spread muscle-group volumes over the drawn regions using [`VOLUME_SPLITS`].
    pub fn from_muscle_volumes(volumes: &MuscleVolumes) -> Self {
        let mut data = Self::default();
        for s in VOLUME_SPLITS {
            let volume = volumes.get(&s.muscle).map_or(0.0, |r| r.volume);
            data.set_field(s.part, s.field, volume * s.factor);
        }
        data
    }

    pub fn part(&self, part: BodyPart) -> Option<&BodyPartData> {
        self.parts.get(&part)
    }

    pub fn get_field(&self, part: BodyPart, field: &str) -> Option<f64> {
        self.parts.get(&part)?.get(field)
    }

    /// Value of a field, zero when it is unknown.
    pub fn value(&self, part: BodyPart, field: &str) -> f64 {
        self.get_field(part, field).unwrap_or(0.0)
    }

    pub fn set_field(&mut self, part: BodyPart, field: &str, value: f64) -> bool {
        self.parts
            .get_mut(&part)
            .is_some_and(|data| data.set(field, value))
    }

    /// Apply a partial update, leaving untouched fields as they are.
    pub fn merge(&mut self, patch: &BodyDataPatch) {
        for (part, field, value) in &patch.updates {
            if !self.set_field(*part, field, *value) {
                log::warn!("Ignoring unknown body field {part:?}.{field}");
            }
        }
    }

    /// Largest region value, never below 1.
    pub fn max_value(&self) -> f64 {
        self.parts
            .values()
            .flat_map(BodyPartData::values)
            .fold(1.0_f64, f64::max)
    }
}
