use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum TagSourceError {
    #[error("no exercise note found for '{0}'")]
    NotFound(String),
    #[error("failed to read exercise notes: {0}")]
    Io(#[from] io::Error),
}

/// Supplies the free-text tags attached to an exercise.
pub trait TagSource {
    fn load_tags(&self, exercise: &str) -> Result<Vec<String>, TagSourceError>;
}

impl TagSource for HashMap<String, Vec<String>> {
    fn load_tags(&self, exercise: &str) -> Result<Vec<String>, TagSourceError> {
        self.get(exercise)
            .cloned()
            .ok_or_else(|| TagSourceError::NotFound(exercise.to_string()))
    }
}

impl<T: TagSource + ?Sized> TagSource for &T {
    fn load_tags(&self, exercise: &str) -> Result<Vec<String>, TagSourceError> {
        (**self).load_tags(exercise)
    }
}

static FRONTMATTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\A---\s*\n(.*?)\n---").expect("valid frontmatter regex"));
static TAG_LIST: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tags:\s*\n((?:\s*-\s*.+\n?)*)").expect("valid tag list regex"));

/// Extract the `tags:` list from a markdown note's frontmatter.
pub fn parse_frontmatter_tags(content: &str) -> Vec<String> {
    let Some(frontmatter) = FRONTMATTER.captures(content).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    let Some(list) = TAG_LIST.captures(frontmatter.as_str()).and_then(|c| c.get(1)) else {
        return Vec::new();
    };
    list.as_str()
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("- "))
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Reads tags from markdown exercise notes kept in one folder tree.
#[derive(Debug, Clone, Default)]
pub struct NoteTagSource {
    folder: Option<PathBuf>,
}

impl NoteTagSource {
    pub fn new(folder: Option<PathBuf>) -> Self {
        Self { folder }
    }

    /// Locate the note whose file name best matches `exercise`.
    ///
    /// A note matches when its lowercased stem equals, contains or is
    /// contained in the lowercased exercise name. Exact matches win, then the
    /// closest name by normalized Levenshtein similarity.
    pub fn find_note(&self, exercise: &str) -> Result<Option<PathBuf>, TagSourceError> {
        let Some(folder) = &self.folder else {
            return Ok(None);
        };
        let search = exercise.trim().to_lowercase();
        if search.is_empty() {
            return Ok(None);
        }
        let notes = collect_notes(folder)?;

        let mut best: Option<(f64, PathBuf)> = None;
        for path in notes {
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()) else {
                continue;
            };
            if stem == search {
                return Ok(Some(path));
            }
            if stem.is_empty() || !(stem.contains(&search) || search.contains(&stem)) {
                continue;
            }
            let score = strsim::normalized_levenshtein(&stem, &search);
            if best.as_ref().map_or(true, |(s, _)| score > *s) {
                best = Some((score, path));
            }
        }
        Ok(best.map(|(_, p)| p))
    }
}

/// Every markdown file below `dir`, in file name order. Symlinks are
/// followed; loops and unreadable entries below the root are skipped.
fn collect_notes(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut notes = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping exercise note entry: {e}");
                continue;
            }
        };
        let is_note = entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("md"));
        if is_note {
            notes.push(entry.into_path());
        }
    }
    Ok(notes)
}

impl TagSource for NoteTagSource {
    fn load_tags(&self, exercise: &str) -> Result<Vec<String>, TagSourceError> {
        if self.folder.is_none() {
            return Ok(Vec::new());
        }
        let path = self
            .find_note(exercise)?
            .ok_or_else(|| TagSourceError::NotFound(exercise.to_string()))?;
        let content = std::fs::read_to_string(&path)?;
        Ok(parse_frontmatter_tags(&content))
    }
}
