//! Two-pass definition extraction.
//!
//! Pass 1 discovers candidate terms: a curly-quoted span followed by one
//! space and a defining clause (`“widget” means`). Pass 2 walks the
//! sentences in reading order and binds each candidate term to the
//! sentence that defines it, split at the clause.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, instrument, trace};

use uscdefs_crawler::DocumentNode;
use uscdefs_shared::{
    ClauseType, DefinitionRecord, ExtractConfig, Result, TERM_KEY_MARKER, TermDefinition,
    UscDefsError, unique_key,
};

const DOUBLE_OPEN: char = '“';
const DOUBLE_CLOSE: char = '”';
const SINGLE_OPEN: char = '‘';
const SINGLE_CLOSE: char = '’';

/// `(?i-u:means|includes|does not include|...)`
///
/// Case folding is ASCII-only so that every accepted phrase resolves
/// through [`ClauseType::from_phrase`].
static CLAUSE_ALTERNATION: LazyLock<String> = LazyLock::new(|| {
    let phrases = ClauseType::ALL
        .iter()
        .map(|clause| regex::escape(clause.phrase()))
        .collect::<Vec<_>>()
        .join("|");
    format!("(?i-u:{phrases})")
});

/// A quoted span never contains its own opening mark, so an unclosed
/// quotation earlier in the text cannot run on into a later term.
static TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?:(“[^“”]+”)|(‘[^‘’]+’)) {}",
        *CLAUSE_ALTERNATION
    ))
    .expect("valid regex")
});

// ---------------------------------------------------------------------------
// Pass 1: term discovery
// ---------------------------------------------------------------------------

/// Every quoted term followed by a defining clause in `text`, in order of
/// appearance and with repeats.
pub fn discover_terms(text: &str) -> Result<Vec<String>> {
    TERM_RE
        .captures_iter(text)
        .map(|caps| {
            let quoted = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            unquote(quoted)
        })
        .collect()
}

/// Terms defined in `node`'s text, with repeats. Counting the repeats is
/// what the term statistics are built on.
#[instrument(skip_all, fields(level = %node.locator()))]
pub fn extract_defined_terms(node: &DocumentNode) -> Result<Vec<String>> {
    let terms = discover_terms(&node.text())?;
    trace!(count = terms.len(), "terms discovered");
    Ok(terms)
}

/// Strip one matching pair of curly quotes from `quoted`.
fn unquote(quoted: &str) -> Result<String> {
    let (open, close) = match quoted.chars().next() {
        Some(DOUBLE_OPEN) => (DOUBLE_OPEN, DOUBLE_CLOSE),
        Some(SINGLE_OPEN) => (SINGLE_OPEN, SINGLE_CLOSE),
        _ => {
            return Err(UscDefsError::invariant(format!(
                "quoted term {quoted:?} does not open with a curly quote"
            )));
        }
    };
    let inner = quoted
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .ok_or_else(|| {
            UscDefsError::invariant(format!("quoted term {quoted:?} has mismatched quotes"))
        })?;

    if inner.trim().is_empty() {
        return Err(UscDefsError::invariant(format!(
            "quoted term {quoted:?} is empty"
        )));
    }
    Ok(inner.to_string())
}

/// Unique terms in first-discovery order.
fn unique_terms(terms: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    terms
        .into_iter()
        .filter(|term| seen.insert(term.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// Pass 2: binding
// ---------------------------------------------------------------------------

/// Pattern matching one specific term in either quote style followed by a
/// defining clause, capturing the clause and the rest of the line.
struct TermPattern {
    term: String,
    re: Regex,
}

impl TermPattern {
    fn new(term: String) -> Result<Self> {
        let escaped = regex::escape(&term);
        let re = Regex::new(&format!(
            "(?i)(?:“{escaped}”|‘{escaped}’) ({})(.*)",
            *CLAUSE_ALTERNATION
        ))
        .map_err(|e| UscDefsError::invariant(format!("term {term:?} pattern: {e}")))?;
        Ok(Self { term, re })
    }

    /// The definition of this term in `sentence`, if the sentence has one.
    fn bind(&self, sentence: &str) -> Result<Option<DefinitionRecord>> {
        let mut matches = self.re.captures_iter(sentence);
        let Some(caps) = matches.next() else {
            return Ok(None);
        };
        if matches.next().is_some() {
            return Err(UscDefsError::invariant(format!(
                "term {:?} is defined more than once in one sentence: {sentence:?}",
                self.term
            )));
        }

        let clause = caps.get(1).map_or("", |m| m.as_str());
        let rest = caps.get(2).map_or("", |m| m.as_str());
        if rest.is_empty() {
            return Err(UscDefsError::invariant(format!(
                "definition of {:?} is empty: {sentence:?}",
                self.term
            )));
        }
        let clause_type = ClauseType::from_phrase(clause).ok_or_else(|| {
            UscDefsError::invariant(format!("unrecognized defining clause {clause:?}"))
        })?;

        Ok(Some(DefinitionRecord {
            term: self.term.clone(),
            sentence: sentence.to_string(),
            clause_type,
            clause: clause.to_string(),
            rest: rest.to_string(),
        }))
    }
}

// ---------------------------------------------------------------------------
// DefinitionExtractor
// ---------------------------------------------------------------------------

/// Extracts the ordered term → definition listing of a level.
#[derive(Debug, Clone, Default)]
pub struct DefinitionExtractor {
    config: ExtractConfig,
}

impl DefinitionExtractor {
    pub fn new(config: ExtractConfig) -> Self {
        Self { config }
    }

    /// Definitions of every term defined in `node`, in reading order.
    ///
    /// A term defined more than once gets `#` markers on its later keys.
    #[instrument(skip_all, fields(level = %node.locator()))]
    pub fn extract(&self, node: &DocumentNode) -> Result<Vec<TermDefinition>> {
        let terms = unique_terms(extract_defined_terms(node)?);
        let definitions = self.bind(node.sentences(), terms)?;

        if definitions.is_empty() {
            return Err(UscDefsError::NoDefinitionsFound {
                level: node.locator().to_string(),
            });
        }
        debug!(count = definitions.len(), "definitions bound");
        Ok(definitions)
    }

    /// Bind `terms` against `sentences`.
    ///
    /// Sentences are walked in order, so the first definition of a term
    /// always owns the bare key.
    pub fn bind(&self, sentences: &[String], terms: Vec<String>) -> Result<Vec<TermDefinition>> {
        let patterns = terms
            .into_iter()
            .map(TermPattern::new)
            .collect::<Result<Vec<_>>>()?;

        let mut definitions: Vec<TermDefinition> = Vec::new();
        for sentence in sentences {
            for pattern in &patterns {
                let Some(record) = pattern.bind(sentence)? else {
                    continue;
                };
                let key = unique_key(
                    &pattern.term,
                    TERM_KEY_MARKER,
                    self.config.max_key_suffixes,
                    |key| definitions.iter().any(|d| d.term == key),
                )?;
                if key != pattern.term {
                    debug!(term = %pattern.term, %key, "term defined again");
                }
                definitions.push(TermDefinition {
                    term: key,
                    definition: record,
                });
            }
        }
        Ok(definitions)
    }
}
