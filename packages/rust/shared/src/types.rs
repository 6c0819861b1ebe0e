//! Output types handed to presentation and statistics consumers.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ClauseType
// ---------------------------------------------------------------------------

/// One of the fixed phrases that mark a quoted term as being defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClauseType {
    #[serde(rename = "means")]
    Means,
    #[serde(rename = "includes")]
    Includes,
    #[serde(rename = "does not include")]
    DoesNotInclude,
    #[serde(rename = "has the meaning")]
    HasTheMeaning,
    #[serde(rename = "shall include")]
    ShallInclude,
    #[serde(rename = "shall not include")]
    ShallNotInclude,
}

impl ClauseType {
    /// Every clause type, in the order used to build match patterns.
    pub const ALL: [ClauseType; 6] = [
        ClauseType::Means,
        ClauseType::Includes,
        ClauseType::DoesNotInclude,
        ClauseType::HasTheMeaning,
        ClauseType::ShallInclude,
        ClauseType::ShallNotInclude,
    ];

    /// The canonical lowercase phrase.
    pub fn phrase(self) -> &'static str {
        match self {
            ClauseType::Means => "means",
            ClauseType::Includes => "includes",
            ClauseType::DoesNotInclude => "does not include",
            ClauseType::HasTheMeaning => "has the meaning",
            ClauseType::ShallInclude => "shall include",
            ClauseType::ShallNotInclude => "shall not include",
        }
    }

    /// Resolve a phrase as it appeared in the text, ignoring case.
    pub fn from_phrase(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|clause| clause.phrase().eq_ignore_ascii_case(text))
    }
}

impl std::fmt::Display for ClauseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.phrase())
    }
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

/// A single bound definition: the sentence a term was defined in, split at
/// the defining clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionRecord {
    /// The term as it appeared between the quotes (never suffixed).
    pub term: String,
    /// The full sentence the definition was taken from.
    pub sentence: String,
    /// Which defining phrase matched.
    #[serde(rename = "type")]
    pub clause_type: ClauseType,
    /// The defining phrase exactly as written in the sentence.
    pub clause: String,
    /// Everything in the sentence after the defining phrase.
    pub rest: String,
}

/// An entry of the ordered term → definition listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermDefinition {
    /// Lookup key: the term, with `#` markers appended for repeat definitions.
    pub term: String,
    /// The bound definition.
    pub definition: DefinitionRecord,
}

// ---------------------------------------------------------------------------
// Term statistics
// ---------------------------------------------------------------------------

/// Usage and definition counts for one defined term, the input of the
/// frequency histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermFrequency {
    /// The defined term.
    pub term: String,
    /// Non-overlapping occurrences of the term text within the level.
    pub occurrences: usize,
    /// Times the term is defined within the level.
    pub defined_in_level: usize,
    /// Times the term is defined across the whole title.
    pub defined_in_title: usize,
    /// Defined more than once within the level.
    pub repeated_in_level: bool,
    /// Defined more often across the title than within the level.
    pub repeated_in_title: bool,
}
