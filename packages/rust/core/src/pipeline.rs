//! End-to-end lookups: title code + level → definitions, terms, or statistics.
//!
//! This is the only place file I/O happens. Everything downstream of
//! [`load_title`] works on the in-memory document.

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use uscdefs_crawler::{DocumentBuilder, DocumentNode, LevelLocator, parse_document};
use uscdefs_shared::{
    AppConfig, BuildConfig, ExtractConfig, Result, TermDefinition, TermFrequency, UscDefsError,
};

use crate::extractor::{DefinitionExtractor, extract_defined_terms};
use crate::stats::{ScanProgress, term_frequencies, title_definition_counts};

/// Raw markup of one title plus what is needed to address levels in it.
#[derive(Debug, Clone)]
pub struct LoadedTitle {
    /// User-facing title code, e.g. `usc26`.
    pub code: String,
    /// Title number used in identifiers, e.g. `26`.
    pub number: String,
    pub path: PathBuf,
    pub source: String,
}

/// Resolve `code` through the title table and read its markup file.
#[instrument(skip(config))]
pub fn load_title(config: &AppConfig, code: &str) -> Result<LoadedTitle> {
    let number = config.title_number(code)?.to_string();
    let path = config.title_path(code);
    let source = std::fs::read_to_string(&path).map_err(|e| UscDefsError::io(&path, e))?;
    debug!(?path, bytes = source.len(), "title loaded");

    Ok(LoadedTitle {
        code: code.to_string(),
        number,
        path,
        source,
    })
}

/// Validate `level`, load the title, build the level, and hand both the
/// builder and the built level to `f`.
///
/// `level` is the user form without the leading `s` (`7701/a/1`).
fn with_level<T>(
    config: &AppConfig,
    code: &str,
    level: &str,
    f: impl FnOnce(&DocumentBuilder<'_, '_>, &DocumentNode) -> Result<T>,
) -> Result<T> {
    let locator = LevelLocator::from_user_input(level)?;
    let title = load_title(config, code)?;
    let doc = parse_document(&title.source)?;
    let builder = DocumentBuilder::new(&doc, &title.number, &BuildConfig::from(config));
    let node = builder.build(&locator)?;
    f(&builder, &node)
}

/// Ordered term → definition listing for a level.
#[instrument(skip(config))]
pub fn define(config: &AppConfig, code: &str, level: &str) -> Result<Vec<TermDefinition>> {
    with_level(config, code, level, |_, node| {
        let definitions = DefinitionExtractor::new(ExtractConfig::from(config)).extract(node)?;
        info!(count = definitions.len(), "definitions extracted");
        Ok(definitions)
    })
}

/// Every term defined in a level, in order and with repeats.
#[instrument(skip(config))]
pub fn defined_terms(config: &AppConfig, code: &str, level: &str) -> Result<Vec<String>> {
    with_level(config, code, level, |_, node| extract_defined_terms(node))
}

/// The assembled sentences of a level.
#[instrument(skip(config))]
pub fn sentences(config: &AppConfig, code: &str, level: &str) -> Result<Vec<String>> {
    with_level(config, code, level, |_, node| Ok(node.sentences().to_vec()))
}

/// Term statistics for a level, scanning the whole title for definition counts.
#[instrument(skip(config, progress))]
pub fn term_statistics(
    config: &AppConfig,
    code: &str,
    level: &str,
    progress: &dyn ScanProgress,
) -> Result<Vec<TermFrequency>> {
    with_level(config, code, level, |builder, node| {
        let title_counts = title_definition_counts(builder, progress)?;
        term_frequencies(node, &title_counts)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use uscdefs_shared::ClauseType;

    use crate::stats::SilentProgress;

    fn fixture_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.defaults.xml_dir = "../../../fixtures/xml".into();
        config.titles = BTreeMap::from([
            ("usc99".to_string(), "99".to_string()),
            ("usc98".to_string(), "98".to_string()),
        ]);
        config
    }

    // -----------------------------------------------------------------------
    // define
    // -----------------------------------------------------------------------

    #[test]
    fn define_lists_terms_in_reading_order() {
        let defs = define(&fixture_config(), "usc99", "1").unwrap();

        let keys: Vec<&str> = defs.iter().map(|d| d.term.as_str()).collect();
        assert_eq!(keys, ["widget", "gadget", "person", "widget#", "tool"]);

        let widget = &defs[0].definition;
        assert_eq!(widget.clause_type, ClauseType::Means);
        assert_eq!(widget.rest, " a mechanical device used in manufacturing.");

        let repeat = &defs[3].definition;
        assert_eq!(repeat.term, "widget");
        assert_eq!(repeat.clause_type, ClauseType::Includes);
        assert_eq!(repeat.rest, " a sprocket.");

        let tool = &defs[4].definition;
        assert_eq!(tool.clause_type, ClauseType::DoesNotInclude);
        assert_eq!(tool.sentence, "The term ‘tool’ does not include a widget.");
    }

    #[test]
    fn define_binds_across_continuations() {
        let defs = define(&fixture_config(), "usc99", "1/2").unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(
            defs[0].definition.rest,
            "— any handheld tool, whether or not powered, as provided in regulations, \
             and any accessory for such a tool."
        );
    }

    #[test]
    fn define_after_heading_run_in() {
        let defs = define(&fixture_config(), "usc99", "5").unwrap();
        let keys: Vec<&str> = defs.iter().map(|d| d.term.as_str()).collect();
        assert_eq!(keys, ["rule", "widget"]);
        assert_eq!(defs[0].definition.sentence, "“rule” means a binding rule.");
    }

    #[test]
    fn error_kinds_reach_the_caller() {
        let config = fixture_config();
        let cases = [
            ("usc99", "4", "No term definitions found."),
            ("usc99", "42", "Section does not exist."),
            ("usc99", "2", "Section has no valid id."),
            ("usc99", "1/", "Invalid section id."),
            ("usc00", "1", "Unknown title."),
            ("usc98", "1", "The title could not be loaded."),
        ];
        for (code, level, message) in cases {
            let err = define(&config, code, level).unwrap_err();
            assert_eq!(err.user_message(), message, "{code} {level}: {err}");
        }
    }

    // -----------------------------------------------------------------------
    // terms / sentences / statistics
    // -----------------------------------------------------------------------

    #[test]
    fn defined_terms_keep_repeats() {
        let terms = defined_terms(&fixture_config(), "usc99", "1").unwrap();
        assert_eq!(terms, ["widget", "gadget", "person", "widget", "tool"]);
    }

    #[test]
    fn sentences_of_a_level() {
        let sentences = sentences(&fixture_config(), "usc99", "3").unwrap();
        assert_eq!(sentences, ["A.", "B.", "B2.", "C.", "C2.", "D."]);
    }

    #[test]
    fn statistics_against_the_title() {
        let stats =
            term_statistics(&fixture_config(), "usc99", "1", &SilentProgress).unwrap();

        let terms: Vec<&str> = stats.iter().map(|s| s.term.as_str()).collect();
        assert_eq!(terms, ["tool", "widget", "gadget", "person"]);

        let tool = &stats[0];
        assert_eq!(tool.occurrences, 5);
        assert!(!tool.repeated_in_level && !tool.repeated_in_title);

        let widget = &stats[1];
        assert_eq!(widget.occurrences, 3);
        assert_eq!(widget.defined_in_level, 2);
        assert_eq!(widget.defined_in_title, 3);
        assert!(widget.repeated_in_level);
        assert!(widget.repeated_in_title);
    }
}
