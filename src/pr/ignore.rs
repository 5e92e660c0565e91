use regex::RegexSet;

use super::types::File;

/// Generated protobuf sources and stylesheets.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[r".*\.pb\.(go|cc|h)", r".*\.css"];

/// File name patterns excluded from change statistics.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    patterns: RegexSet,
}

impl IgnoreSet {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    pub fn empty() -> Self {
        Self {
            patterns: RegexSet::empty(),
        }
    }

    pub fn is_ignored(&self, filename: &str) -> bool {
        self.patterns.is_match(filename)
    }

    /// Drop every file whose name matches one of the patterns.
    pub fn retain(&self, files: Vec<File>) -> Vec<File> {
        files
            .into_iter()
            .filter(|f| !self.is_ignored(&f.filename))
            .collect()
    }
}

impl Default for IgnoreSet {
    fn default() -> Self {
        // The built-in patterns are known to compile.
        Self::new(DEFAULT_IGNORE_PATTERNS).unwrap_or_else(|_| Self::empty())
    }
}
