//! Hierarchical level addresses such as `s7701/a/1`.

use std::sync::LazyLock;

use regex::Regex;

use uscdefs_shared::{Result, UscDefsError};

/// `s<section>(/<sub>)*`. Section tokens may contain spaces because
/// identifier ranges (`s1...5`) are canonicalized to `s1 to 5`.
static LOCATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^s[^/]+(?:/[^/\s]+)*$").expect("valid regex"));

/// A validated address of a level within a title.
///
/// The first segment names the section (`s7701`); each further segment is
/// the number of one level below it (`a`, `1`, `A`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LevelLocator(String);

impl LevelLocator {
    /// Validate `text` against the locator grammar.
    pub fn parse(text: &str) -> Result<Self> {
        if !LOCATOR_RE.is_match(text) {
            return Err(UscDefsError::validation(format!("invalid level id: {text:?}")));
        }
        Ok(Self(text.to_string()))
    }

    /// Parse a locator typed by a user, who leaves off the leading `s`.
    pub fn from_user_input(raw: &str) -> Result<Self> {
        Self::parse(&format!("s{}", raw.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First segment, e.g. `s7701`.
    pub fn section_id(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// Section id without its leading `s`, e.g. `7701`.
    pub fn section_number(&self) -> &str {
        &self.section_id()[1..]
    }

    /// Number of segments below the section.
    pub fn depth(&self) -> usize {
        self.0.matches('/').count()
    }

    /// Number of the addressed level: the section number at depth 0,
    /// otherwise the last segment.
    pub fn deepest_number(&self) -> &str {
        if self.depth() == 0 {
            return self.section_number();
        }
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl std::fmt::Display for LevelLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LevelLocator {
    type Err = UscDefsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}
