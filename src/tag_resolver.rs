use std::collections::{BTreeSet, HashMap};

use crate::muscles::{MuscleGroup, normalize};
use crate::tag_map::TagMap;
use crate::tag_source::TagSource;

/// Resolves exercise names to muscle groups through their tags.
///
/// Tags are read once per exercise name and kept until [`clear_cache`] is
/// called. Build one resolver per session and pass it to every render.
///
/// [`clear_cache`]: TagResolver::clear_cache
pub struct TagResolver<S> {
    source: S,
    tag_map: TagMap,
    cache: HashMap<String, Vec<String>>,
}

impl<S: TagSource> TagResolver<S> {
    pub fn new(source: S, tag_map: TagMap) -> Self {
        Self {
            source,
            tag_map,
            cache: HashMap::new(),
        }
    }

    /// Tags for `exercise`, from the cache when possible.
    ///
    /// Read failures are logged and cached as an empty list.
    pub fn load_tags(&mut self, exercise: &str) -> &[String] {
        if !self.cache.contains_key(exercise) {
            log::debug!("Loading tags for '{exercise}'");
            let tags = match self.source.load_tags(exercise) {
                Ok(tags) => tags,
                Err(e) => {
                    log::warn!("No tags for '{exercise}': {e}");
                    Vec::new()
                }
            };
            self.cache.insert(exercise.to_string(), tags);
        }
        self.cache.get(exercise).map(Vec::as_slice).unwrap_or_default()
    }

    /// Muscle groups trained by `exercise`.
    ///
    /// When none of its tags are in the tag map, every tag that occurs in the
    /// exercise name (or contains it) contributes its muscle group. This is a
    /// loose guess and may over-match.
    pub fn resolve_muscle_groups(&mut self, exercise: &str) -> BTreeSet<MuscleGroup> {
        let tags = self.load_tags(exercise).to_vec();
        let mut groups: BTreeSet<MuscleGroup> = tags
            .iter()
            .filter_map(|tag| self.tag_map.get(&normalize(tag)))
            .collect();

        if groups.is_empty() {
            let name = normalize(exercise);
            if !name.is_empty() {
                groups.extend(
                    self.tag_map
                        .iter()
                        .filter(|(tag, _)| name.contains(tag) || tag.contains(name.as_str()))
                        .map(|(_, muscle)| muscle),
                );
            }
        }
        groups
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cached_exercises(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag_source::TagSourceError;
    use std::cell::Cell;

    struct CountingSource {
        calls: Cell<usize>,
    }

    impl TagSource for CountingSource {
        fn load_tags(&self, exercise: &str) -> Result<Vec<String>, TagSourceError> {
            self.calls.set(self.calls.get() + 1);
            match exercise {
                "Bench Press" => Ok(vec!["Chest ".into(), "TRICEPS".into(), "unknown".into()]),
                "Broken" => Err(TagSourceError::NotFound(exercise.into())),
                _ => Ok(Vec::new()),
            }
        }
    }

    fn resolver() -> TagResolver<CountingSource> {
        TagResolver::new(
            CountingSource {
                calls: Cell::new(0),
            },
            TagMap::default(),
        )
    }

    #[test]
    fn resolves_through_tags() {
        let mut r = resolver();
        let groups = r.resolve_muscle_groups("Bench Press");
        assert_eq!(
            groups.into_iter().collect::<Vec<_>>(),
            vec![MuscleGroup::Chest, MuscleGroup::Triceps]
        );
    }

    #[test]
    fn caches_per_exercise() {
        let mut r = resolver();
        r.resolve_muscle_groups("Bench Press");
        r.resolve_muscle_groups("Bench Press");
        assert_eq!(r.source.calls.get(), 1);
        assert_eq!(r.cached_exercises(), 1);
        r.clear_cache();
        assert_eq!(r.cached_exercises(), 0);
        r.resolve_muscle_groups("Bench Press");
        assert_eq!(r.source.calls.get(), 2);
    }

    #[test]
    fn falls_back_to_name_matching() {
        let mut r = resolver();
        let groups = r.resolve_muscle_groups("Barbell Row");
        assert!(groups.contains(&MuscleGroup::Back));

        // "Leg Curl" contains "curl"; the name is also short enough that no
        // tag contains it
        let groups = r.resolve_muscle_groups("Leg Curl");
        assert_eq!(groups.into_iter().collect::<Vec<_>>(), vec![MuscleGroup::Biceps]);
    }

    #[test]
    fn falls_back_to_tags_containing_the_name() {
        let mut r = resolver();
        // "petto" and "pettorale" both contain "pett"
        let groups = r.resolve_muscle_groups("Pett");
        assert_eq!(groups.into_iter().collect::<Vec<_>>(), vec![MuscleGroup::Chest]);
    }

    #[test]
    fn read_failure_yields_empty_tags() {
        let mut r = resolver();
        assert!(r.load_tags("Broken").is_empty());
        assert!(r.resolve_muscle_groups("Broken").is_empty());
    }

    #[test]
    fn unmatched_name_resolves_to_nothing() {
        let mut r = resolver();
        assert!(r.resolve_muscle_groups("Plank Hold").is_empty());
    }
}
