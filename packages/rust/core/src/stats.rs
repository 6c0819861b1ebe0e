//! Term frequency statistics for a level against its whole title.

use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::{debug, info, instrument};

use uscdefs_crawler::{DocumentBuilder, DocumentNode, LevelLocator};
use uscdefs_shared::{Result, TermFrequency};

use crate::extractor::extract_defined_terms;

/// Progress callback for title-wide section scans.
pub trait ScanProgress {
    /// Called after each section has been scanned.
    fn section_scanned(&self, locator: &LevelLocator, scanned: usize);
    /// Called once the scan is complete.
    fn done(&self, scanned: usize);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ScanProgress for SilentProgress {
    fn section_scanned(&self, _locator: &LevelLocator, _scanned: usize) {}
    fn done(&self, _scanned: usize) {}
}

/// How many times each term is defined across every section of the title.
#[instrument(skip_all)]
pub fn title_definition_counts(
    builder: &DocumentBuilder<'_, '_>,
    progress: &dyn ScanProgress,
) -> Result<HashMap<String, usize>> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut scanned = 0;

    for section in builder.sections() {
        let section = section?;
        for term in extract_defined_terms(&section)? {
            *counts.entry(term).or_default() += 1;
        }
        scanned += 1;
        progress.section_scanned(section.locator(), scanned);
    }

    progress.done(scanned);
    info!(sections = scanned, terms = counts.len(), "title scanned");
    Ok(counts)
}

/// Statistics for every term defined in `level`, most used first.
///
/// `title_counts` comes from [`title_definition_counts`]. Terms with equal
/// occurrence counts keep the order they were first defined in.
pub fn term_frequencies(
    level: &DocumentNode,
    title_counts: &HashMap<String, usize>,
) -> Result<Vec<TermFrequency>> {
    let defined = extract_defined_terms(level)?;
    let text = level.text();

    let mut stats: Vec<TermFrequency> = Vec::new();
    for term in &defined {
        if stats.iter().any(|s| &s.term == term) {
            continue;
        }
        let defined_in_level = defined.iter().filter(|t| *t == term).count();
        let defined_in_title = title_counts.get(term).copied().unwrap_or(0);
        stats.push(TermFrequency {
            term: term.clone(),
            occurrences: text.matches(term.as_str()).count(),
            defined_in_level,
            defined_in_title,
            repeated_in_level: defined_in_level > 1,
            repeated_in_title: defined_in_title > defined_in_level,
        });
    }

    stats.sort_by_key(|s| Reverse(s.occurrences));
    debug!(level = %level.locator(), terms = stats.len(), "term statistics computed");
    Ok(stats)
}
