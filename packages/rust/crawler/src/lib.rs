//! USLM document model: level addressing, tree building, and sentence assembly.
//!
//! This crate provides:
//! - [`LevelLocator`] — validated `s<section>/<sub>/...` level addresses
//! - [`DocumentBuilder`] — builds [`DocumentNode`] trees from a parsed title
//! - [`DocumentNode`] — immutable level tree with memoized sentences
//! - [`split_sentences`] — rule-based tokenizer for statutory text

pub mod builder;
pub mod locator;
pub mod node;
pub mod sentences;
pub mod text;

pub use builder::{DocumentBuilder, parse_document};
pub use locator::LevelLocator;
pub use node::{ChildLevel, DocumentNode, LevelKind, LevelParts};
pub use sentences::split_sentences;
pub use text::separate_quoted_terms;

#[cfg(test)]
mod tests {
    use super::*;
    use uscdefs_shared::{BuildConfig, Result, UscDefsError};

    fn load_fixture(name: &str) -> String {
        let path = format!("../../../fixtures/xml/{name}");
        std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("missing fixture: {path}"))
    }

    fn build(locator: &str) -> Result<DocumentNode> {
        let source = load_fixture("usc99.xml");
        let doc = parse_document(&source)?;
        let builder = DocumentBuilder::new(&doc, "99", &BuildConfig::default());
        builder.build(&LevelLocator::from_user_input(locator)?)
    }

    // -----------------------------------------------------------------------
    // Tree building
    // -----------------------------------------------------------------------

    #[test]
    fn definitions_section_structure() {
        let node = build("1").unwrap();
        assert_eq!(node.kind(), LevelKind::Section);
        assert_eq!(node.heading(), Some("Definitions"));

        let keys: Vec<&str> = node.children().map(ChildLevel::key).collect();
        assert_eq!(keys, ["1", "2", "3", "4", "5", "5?"]);
        assert_eq!(node.child("5?").unwrap().heading(), Some("References"));
    }

    #[test]
    fn sandwiched_continuation_joins_the_gadget_sentence() {
        let node = build("1/2").unwrap();
        assert_eq!(
            node.sentences(),
            [
                "The term “gadget” includes— any handheld tool, whether or not powered, \
                 as provided in regulations, and any accessory for such a tool."
            ]
        );
    }

    #[test]
    fn quoted_notes_stay_out_of_the_text() {
        let node = build("1").unwrap();
        assert!(!node.text().contains("ghost"));
        assert!(!node.text().contains("Pub. L."));
        assert_eq!(node.sentences().len(), 6);
    }

    #[test]
    fn ordering_section_reads_in_document_order() {
        let node = build("3").unwrap();
        assert_eq!(node.sentences(), ["A.", "B.", "B2.", "C.", "C2.", "D."]);
    }

    #[test]
    fn heading_run_in_quote_is_split_off() {
        let node = build("5").unwrap();
        assert_eq!(
            node.sentences(),
            [
                "In this section—.",
                "“rule” means a binding rule.",
                "The term “widget” includes a sprocket.",
            ]
        );
    }

    #[test]
    fn range_section_is_addressable() {
        let node = build("6...8").unwrap();
        assert_eq!(node.num(), "6 to 8");
        assert_eq!(node.sentences(), ["Repealed.", "Pub. L. 101–1, § 2, 104 Stat. 1."]);
    }

    // -----------------------------------------------------------------------
    // Error kinds
    // -----------------------------------------------------------------------

    #[test]
    fn error_kinds_are_distinguishable() {
        assert!(matches!(
            build("99").unwrap_err(),
            UscDefsError::LevelNotFound { .. }
        ));
        assert!(matches!(
            build("2").unwrap_err(),
            UscDefsError::LevelHasNoId { .. }
        ));
        assert!(matches!(
            build("1//a").unwrap_err(),
            UscDefsError::Validation { .. }
        ));
        assert!(matches!(
            build("1/5").unwrap_err(),
            UscDefsError::Invariant { .. }
        ));
    }

    #[test]
    fn title_sections_skip_unbuildable_ones() {
        let source = load_fixture("usc99.xml");
        let doc = parse_document(&source).unwrap();
        let builder = DocumentBuilder::new(&doc, "99", &BuildConfig::default());

        let locators: Vec<String> = builder
            .sections()
            .map(|s| s.map(|n| n.locator().to_string()))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(locators, ["s1", "s3", "s4", "s5", "s6 to 8"]);
    }
}
