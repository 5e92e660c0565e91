use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::collections::HashMap;

use super::types::{File, PullRequest};

/// Directory name used for files at the repository root.
pub const ROOT_DIR: &str = "/";

/// Upper bounds (exclusive) of the tiny, small, medium and large classes.
const TINY: u64 = 20;
const SMALL: u64 = 100;
const MEDIUM: u64 = 500;
const LARGE: u64 = 1000;

const DISPLAY_FORMAT: &str = "%a %b %e %H:%M:%S";

/// Size bucket of a pull request by total changed lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeClass {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeClass {
    pub fn from_changes(changes: u64) -> Self {
        if changes < TINY {
            SizeClass::Tiny
        } else if changes < SMALL {
            SizeClass::Small
        } else if changes < MEDIUM {
            SizeClass::Medium
        } else if changes < LARGE {
            SizeClass::Large
        } else {
            SizeClass::Huge
        }
    }

    /// One dot per bucket step, tiny = "●" through huge = "●●●●●".
    pub fn dots(self) -> String {
        "●".repeat(self as usize + 1)
    }
}

impl std::fmt::Display for SizeClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeClass::Tiny => write!(f, "tiny"),
            SizeClass::Small => write!(f, "small"),
            SizeClass::Medium => write!(f, "medium"),
            SizeClass::Large => write!(f, "large"),
            SizeClass::Huge => write!(f, "huge"),
        }
    }
}

/// Files of one pull request grouped under their containing directory.
#[derive(Debug, Clone)]
pub struct Subdirectory<'a> {
    pub name: Cow<'a, str>,
    pub files: Vec<&'a File>,
}

impl Subdirectory<'_> {
    pub fn total_changes(&self) -> u64 {
        self.files.iter().map(|f| f.changes).sum()
    }
}

fn is_clean_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "."
}

/// Directory part of a slash-separated path with empty and `.` segments
/// dropped; `ROOT_DIR` when nothing is left.
fn dir_of(path: &str) -> Cow<'_, str> {
    let dir = path.rsplit_once('/').map_or("", |(dir, _)| dir);
    if !dir.is_empty() && dir.split('/').all(is_clean_segment) {
        return Cow::Borrowed(dir);
    }
    let segments: Vec<&str> = dir.split('/').filter(|s| is_clean_segment(s)).collect();
    if segments.is_empty() {
        Cow::Borrowed(ROOT_DIR)
    } else {
        Cow::Owned(segments.join("/"))
    }
}

fn human_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.with_timezone(&Local).format(DISPLAY_FORMAT).to_string(),
        Err(_) => raw.to_string(),
    }
}

impl PullRequest {
    pub fn total_changes(&self) -> u64 {
        self.files.iter().map(|f| f.changes).sum()
    }

    pub fn class(&self) -> SizeClass {
        SizeClass::from_changes(self.total_changes())
    }

    /// Directories holding the bulk of this pull request's changes.
    ///
    /// Groups are ordered by descending change count (ties keep first-seen
    /// order) and cut after the first group that takes the running total
    /// above 80% of all changes. Returns nothing when there are no changes.
    pub fn subdirectories(&self) -> Vec<Subdirectory<'_>> {
        let total = self.total_changes();
        if total == 0 {
            return Vec::new();
        }

        let mut index: HashMap<Cow<'_, str>, usize> = HashMap::new();
        let mut groups: Vec<Subdirectory<'_>> = Vec::new();
        for file in &self.files {
            let dir = dir_of(&file.filename);
            let slot = *index.entry(dir.clone()).or_insert_with(|| {
                groups.push(Subdirectory {
                    name: dir,
                    files: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].files.push(file);
        }

        groups.sort_by_key(|g| std::cmp::Reverse(g.total_changes()));

        let mut running = 0u64;
        for (i, group) in groups.iter().enumerate() {
            running += group.total_changes();
            // running / total > 0.8
            if running * 5 > total * 4 {
                groups.truncate(i + 1);
                break;
            }
        }
        groups
    }

    /// Creation time in local time, or the raw value if it does not parse.
    pub fn created_at_str(&self) -> String {
        human_time(&self.created_at)
    }

    pub fn closed_at_str(&self) -> String {
        human_time(self.closed_at.as_deref().unwrap_or_default())
    }

    pub fn merged_at_str(&self) -> String {
        human_time(self.merged_at.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pr::types::FileStatus;

    fn file(name: &str, changes: u64) -> File {
        File {
            sha: None,
            filename: name.to_string(),
            status: FileStatus::Modified,
            additions: changes,
            deletions: 0,
            changes,
        }
    }

    fn pr_with(files: Vec<File>) -> PullRequest {
        PullRequest {
            files,
            ..Default::default()
        }
    }

    #[test]
    fn test_total_changes() {
        assert_eq!(pr_with(vec![]).total_changes(), 0);
        let pr = pr_with(vec![file("a.go", 3), file("b/c.go", 7), file("d/e/f.go", 0)]);
        assert_eq!(pr.total_changes(), 10);
    }

    #[test]
    fn test_class_boundaries() {
        assert_eq!(SizeClass::from_changes(0), SizeClass::Tiny);
        assert_eq!(SizeClass::from_changes(19), SizeClass::Tiny);
        assert_eq!(SizeClass::from_changes(20), SizeClass::Small);
        assert_eq!(SizeClass::from_changes(99), SizeClass::Small);
        assert_eq!(SizeClass::from_changes(100), SizeClass::Medium);
        assert_eq!(SizeClass::from_changes(499), SizeClass::Medium);
        assert_eq!(SizeClass::from_changes(500), SizeClass::Large);
        assert_eq!(SizeClass::from_changes(999), SizeClass::Large);
        assert_eq!(SizeClass::from_changes(1000), SizeClass::Huge);
    }

    #[test]
    fn test_class_is_monotonic() {
        let mut prev = SizeClass::Tiny;
        for changes in 0..1500 {
            let class = SizeClass::from_changes(changes);
            assert!(class >= prev, "class dropped at {}", changes);
            prev = class;
        }
    }

    #[test]
    fn test_class_from_files() {
        let pr = pr_with(vec![file("a.go", 15), file("b.go", 5)]);
        assert_eq!(pr.class(), SizeClass::Small);
        assert_eq!(pr.class().to_string(), "small");
        assert_eq!(pr.class().dots(), "●●");
    }

    #[test]
    fn test_dir_of() {
        assert_eq!(dir_of("main.go"), ROOT_DIR);
        assert_eq!(dir_of("/main.go"), ROOT_DIR);
        assert_eq!(dir_of("pkg/sql/parser.go"), "pkg/sql");
        assert_eq!(dir_of("./main.go"), ROOT_DIR);
    }

    #[test]
    fn test_dir_of_cleans_repeated_slashes() {
        assert_eq!(dir_of("a//b/c.go"), "a/b");
        assert_eq!(dir_of("a/./b/c.go"), "a/b");
    }

    #[test]
    fn test_subdirectories_merge_unclean_paths() {
        let pr = pr_with(vec![file("a//b/c.go", 6), file("a/b/d.go", 4)]);
        let dirs = pr.subdirectories();
        assert_eq!(dirs.len(), 1);
        assert_eq!(dirs[0].name, "a/b");
        assert_eq!(dirs[0].total_changes(), 10);
    }

    #[test]
    fn test_subdirectories_groups_and_truncates() {
        let pr = pr_with(vec![
            file("docs/README.md", 5),
            file("sql/a.go", 50),
            file("kv/b.go", 30),
            file("sql/c.go", 10),
            file("main.go", 5),
        ]);
        let dirs = pr.subdirectories();
        let names: Vec<&str> = dirs.iter().map(|d| d.name.as_ref()).collect();
        // 60 + 30 = 90 of 100 crosses 80%
        assert_eq!(names, vec!["sql", "kv"]);
        assert_eq!(dirs[0].files.len(), 2);
        assert_eq!(dirs[0].total_changes(), 60);
    }

    #[test]
    fn test_subdirectories_ties_keep_encounter_order() {
        let pr = pr_with(vec![file("b/x.go", 10), file("a/y.go", 10), file("c/z.go", 10)]);
        let dirs = pr.subdirectories();
        let names: Vec<&str> = dirs.iter().map(|d| d.name.as_ref()).collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_subdirectories_exactly_eighty_percent_needs_next_group() {
        let pr = pr_with(vec![file("a/x.go", 80), file("b/y.go", 15), file("c/z.go", 5)]);
        let dirs = pr.subdirectories();
        let names: Vec<&str> = dirs.iter().map(|d| d.name.as_ref()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_subdirectories_minimal_and_sufficient() {
        let pr = pr_with(vec![
            file("a/1.go", 7),
            file("b/2.go", 41),
            file("c/3.go", 13),
            file("a/4.go", 22),
            file("d/5.go", 3),
            file("e/6.go", 14),
        ]);
        let total = pr.total_changes();
        let dirs = pr.subdirectories();
        let kept: u64 = dirs.iter().map(|d| d.total_changes()).sum();
        assert!(kept * 5 > total * 4);
        let without_last = kept - dirs.last().unwrap().total_changes();
        assert!(without_last * 5 <= total * 4);
    }

    #[test]
    fn test_subdirectories_root_files() {
        let pr = pr_with(vec![file("Makefile", 9), file("pkg/a.go", 1)]);
        let dirs = pr.subdirectories();
        assert_eq!(dirs[0].name, ROOT_DIR);
    }

    #[test]
    fn test_subdirectories_zero_changes() {
        assert!(pr_with(vec![]).subdirectories().is_empty());
        assert!(pr_with(vec![file("a/b.go", 0)]).subdirectories().is_empty());
    }

    #[test]
    fn test_human_time_fallback() {
        let pr = PullRequest {
            created_at: "yesterday".to_string(),
            ..Default::default()
        };
        assert_eq!(pr.created_at_str(), "yesterday");
        assert_eq!(pr.closed_at_str(), "");
    }

    #[test]
    fn test_human_time_parses_rfc3339() {
        let pr = PullRequest {
            created_at: "2016-03-15T10:00:00Z".to_string(),
            ..Default::default()
        };
        let shown = pr.created_at_str();
        assert_ne!(shown, pr.created_at);
        assert!(shown.contains("Mar"));
    }
}
