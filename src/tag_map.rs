use std::collections::BTreeMap;
use std::io;
use std::path::Path;

use crate::muscles::{DEFAULT_TAG_MAP, MuscleGroup, normalize};

#[derive(Debug, thiserror::Error)]
pub enum TagMapError {
    #[error("failed to read tag map: {0}")]
    Io(#[from] io::Error),
    #[error("malformed tag map csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Lookup table from a normalized tag to the muscle group it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct TagMap {
    tags: BTreeMap<String, MuscleGroup>,
}

impl Default for TagMap {
    fn default() -> Self {
        Self {
            tags: DEFAULT_TAG_MAP
                .entries()
                .map(|(tag, muscle)| (tag.to_string(), *muscle))
                .collect(),
        }
    }
}

impl TagMap {
    /// Build a map from host-supplied pairs. Tags are normalized on insert.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, MuscleGroup)>,
        S: AsRef<str>,
    {
        Self {
            tags: pairs
                .into_iter()
                .map(|(tag, muscle)| (normalize(tag.as_ref()), muscle))
                .filter(|(tag, _)| !tag.is_empty())
                .collect(),
        }
    }

    /// Parse a `tag,muscleGroup[,language]` override.
    ///
    /// Rows in another language than `language` (or `en`) are ignored, as are
    /// rows naming a muscle group outside the canonical set. When nothing
    /// usable remains the compiled-in table is returned instead.
    pub fn from_csv_reader<R: io::Read>(reader: R, language: &str) -> Result<Self, TagMapError> {
        let language = normalize(language);
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut tags = BTreeMap::new();
        for (idx, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    log::warn!("Skipping malformed tag map row {}: {e}", idx + 1);
                    continue;
                }
            };
            let tag = record.get(0).map(normalize).unwrap_or_default();
            if idx == 0 && tag == "tag" {
                continue;
            }
            let group = record.get(1).map(normalize).unwrap_or_default();
            let lang = record
                .get(2)
                .map(normalize)
                .filter(|l| !l.is_empty())
                .unwrap_or_else(|| "en".to_string());
            if tag.is_empty() || group.is_empty() {
                continue;
            }
            if lang != language && lang != "en" {
                continue;
            }
            match group.parse::<MuscleGroup>() {
                Ok(muscle) => {
                    tags.insert(tag, muscle);
                }
                Err(e) => log::warn!("Skipping tag '{tag}': {e}"),
            }
        }
        if tags.is_empty() {
            return Ok(Self::default());
        }
        Ok(Self { tags })
    }

    /// Load the override at `path`, falling back to the default table when it
    /// is absent or unreadable.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>, language: &str) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        let path = path.as_ref();
        let loaded = std::fs::File::open(path)
            .map_err(TagMapError::from)
            .and_then(|f| Self::from_csv_reader(f, language));
        match loaded {
            Ok(map) => {
                log::info!("Loaded {} muscle tags from {}", map.len(), path.display());
                map
            }
            Err(e) => {
                log::warn!("Using default muscle tags: {e}");
                Self::default()
            }
        }
    }

    pub fn get(&self, normalized_tag: &str) -> Option<MuscleGroup> {
        self.tags.get(normalized_tag).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, MuscleGroup)> {
        self.tags.iter().map(|(t, m)| (t.as_str(), *m))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}
