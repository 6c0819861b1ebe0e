//! Builds [`DocumentNode`] trees from a parsed USLM document.
//!
//! Levels are found by their `identifier` attribute
//! (`/us/usc/t26/s7701/a/1`). Only elements in the root element's default
//! namespace take part; everything else is skipped.

use roxmltree::{Document, Node};
use tracing::{debug, instrument, trace, warn};

use uscdefs_shared::{BuildConfig, CHILD_KEY_MARKER, Result, UscDefsError, unique_key};

use crate::locator::LevelLocator;
use crate::node::{ChildLevel, DocumentNode, LevelKind, LevelParts};
use crate::text::node_text;

/// Parse a markup source, mapping parser failures into [`UscDefsError::Xml`].
pub fn parse_document(source: &str) -> Result<Document<'_>> {
    Document::parse(source).map_err(|e| UscDefsError::xml(e.to_string()))
}

/// Identifier with its first `...` range marker spelled out as ` to `.
fn canonical_identifier(identifier: &str) -> String {
    identifier.replacen("...", " to ", 1)
}

// ---------------------------------------------------------------------------
// Child classification
// ---------------------------------------------------------------------------

/// Text-bearing child elements of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Num,
    Heading,
    Chapeau,
    Content,
    Continuation,
}

impl Field {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "num" => Some(Field::Num),
            "heading" => Some(Field::Heading),
            "chapeau" => Some(Field::Chapeau),
            "content" => Some(Field::Content),
            "continuation" => Some(Field::Continuation),
            _ => None,
        }
    }
}

/// What a child element of a level is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildElement {
    Field(Field),
    Level(LevelKind),
    Other,
}

// ---------------------------------------------------------------------------
// Level under construction
// ---------------------------------------------------------------------------

/// Mutable state collected while walking one level element.
struct LevelDraft {
    locator: LevelLocator,
    kind: LevelKind,
    num: Option<String>,
    heading: Option<String>,
    chapeau: Option<String>,
    content: Option<String>,
    continuation: Option<String>,
    children: Vec<ChildLevel>,
}

impl LevelDraft {
    fn new(locator: LevelLocator, kind: LevelKind) -> Self {
        Self {
            locator,
            kind,
            num: None,
            heading: None,
            chapeau: None,
            content: None,
            continuation: None,
            children: Vec::new(),
        }
    }

    fn set_num(&mut self, value: Option<&str>) -> Result<()> {
        if self.num.is_some() {
            return Err(UscDefsError::invariant(format!(
                "repeated num in level {}",
                self.locator
            )));
        }
        self.num = Some(value.unwrap_or_default().to_string());
        Ok(())
    }

    /// Place a continuation next to the sibling that precedes it.
    ///
    /// Before any child it belongs to the level itself. After a child it is
    /// attached to that child, unless the child already holds one; then it
    /// is the level's trailing continuation.
    fn place_continuation(&mut self, text: String) -> Result<()> {
        match self.children.last_mut() {
            Some(last) if last.continuation.is_none() => {
                last.continuation = Some(text);
            }
            Some(_) | None if self.continuation.is_none() => {
                self.continuation = Some(text);
            }
            Some(_) => {
                return Err(UscDefsError::invariant(format!(
                    "level {} has more than one trailing continuation",
                    self.locator
                )));
            }
            None => {
                return Err(UscDefsError::invariant(format!(
                    "level {} has a second continuation before any child level",
                    self.locator
                )));
            }
        }
        Ok(())
    }

    fn push_child(&mut self, node: DocumentNode, max_key_suffixes: usize) -> Result<()> {
        let key = unique_key(node.num(), CHILD_KEY_MARKER, max_key_suffixes, |key| {
            self.children.iter().any(|c| c.key == key)
        })?;
        if key != node.num() {
            debug!(level = %self.locator, num = node.num(), %key, "duplicate child num");
        }
        self.children.push(ChildLevel::new(key, node));
        Ok(())
    }

    fn finish(self) -> Result<DocumentNode> {
        let num = self.num.ok_or_else(|| {
            UscDefsError::invariant(format!("level {} has no num", self.locator))
        })?;
        DocumentNode::new(LevelParts {
            locator: self.locator,
            kind: self.kind,
            num,
            heading: self.heading,
            chapeau: self.chapeau,
            content: self.content,
            continuation: self.continuation,
            children: self.children,
        })
    }
}

// ---------------------------------------------------------------------------
// DocumentBuilder
// ---------------------------------------------------------------------------

/// Builds level trees out of one parsed title document.
pub struct DocumentBuilder<'a, 'input> {
    doc: &'a Document<'input>,
    namespace: Option<&'a str>,
    /// Identifier prefix of the title, without trailing slash.
    prefix: String,
    max_key_suffixes: usize,
}

impl<'a, 'input> DocumentBuilder<'a, 'input> {
    /// Create a builder for the title numbered `title_number`.
    pub fn new(doc: &'a Document<'input>, title_number: &str, config: &BuildConfig) -> Self {
        Self {
            doc,
            namespace: doc.root_element().lookup_namespace_uri(None),
            prefix: config.prefix_for(title_number),
            max_key_suffixes: config.max_key_suffixes,
        }
    }

    /// Build the tree rooted at the level addressed by `locator`.
    #[instrument(skip(self, locator), fields(locator = %locator))]
    pub fn build(&self, locator: &LevelLocator) -> Result<DocumentNode> {
        let element = self.locate(locator)?;
        let node = self.parse_level(element)?;
        debug!(children = node.children().count(), "level built");
        Ok(node)
    }

    /// Every section of the title with an identifier, in document order.
    ///
    /// Sections without an identifier (quoted in notes) are skipped, as are
    /// sections that contain such quoted levels.
    pub fn sections(&self) -> impl Iterator<Item = Result<DocumentNode>> + '_ {
        self.doc
            .descendants()
            .filter(move |n| self.local_name(*n) == Some(LevelKind::Section.tag()))
            .filter_map(move |n| {
                let Some(identifier) = n.attribute("identifier") else {
                    debug!(pos = n.range().start, "skipping section without identifier");
                    return None;
                };
                if !self.owns_identifier(identifier) {
                    debug!(identifier, "skipping section outside title");
                    return None;
                }
                match self.parse_level(n) {
                    Err(UscDefsError::LevelHasNoId { tag }) => {
                        warn!(identifier, %tag, "skipping section with unidentified level");
                        None
                    }
                    other => Some(other),
                }
            })
    }

    /// Find the unique element whose identifier addresses `locator`.
    fn locate(&self, locator: &LevelLocator) -> Result<Node<'a, 'input>> {
        let target = canonical_identifier(&format!("{}/{}", self.prefix, locator));
        let mut matches = self.doc.descendants().filter(|n| {
            self.local_name(*n).is_some()
                && n.attribute("identifier").is_some_and(|id| {
                    id == target || (id.contains("...") && canonical_identifier(id) == target)
                })
        });

        let found = matches
            .next()
            .ok_or_else(|| UscDefsError::LevelNotFound {
                identifier: target.clone(),
            })?;
        if matches.next().is_some() {
            return Err(UscDefsError::invariant(format!(
                "more than one element has identifier {target}"
            )));
        }
        Ok(found)
    }

    /// Element name if `node` is an element in the document namespace.
    fn local_name(&self, node: Node<'a, 'input>) -> Option<&'a str> {
        if !node.is_element() {
            return None;
        }
        let name = node.tag_name();
        (name.namespace() == self.namespace).then(|| name.name())
    }

    fn owns_identifier(&self, identifier: &str) -> bool {
        identifier
            .strip_prefix(&self.prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Turn a level identifier back into the locator it addresses.
    fn locator_for(&self, identifier: &str) -> Result<LevelLocator> {
        let canonical = canonical_identifier(identifier);
        let relative = canonical
            .strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| {
                UscDefsError::invariant(format!(
                    "identifier {identifier} is outside {}",
                    self.prefix
                ))
            })?;
        LevelLocator::parse(relative).map_err(|e| {
            UscDefsError::invariant(format!("identifier {identifier} is malformed: {e}"))
        })
    }

    fn classify(&self, node: Node<'a, 'input>) -> ChildElement {
        let Some(name) = self.local_name(node) else {
            return ChildElement::Other;
        };
        if let Some(field) = Field::from_tag(name) {
            ChildElement::Field(field)
        } else if let Some(kind) = LevelKind::from_tag(name) {
            ChildElement::Level(kind)
        } else {
            ChildElement::Other
        }
    }

    /// Recursively build the level rooted at `element`.
    fn parse_level(&self, element: Node<'a, 'input>) -> Result<DocumentNode> {
        let tag = element.tag_name().name();
        let identifier = element
            .attribute("identifier")
            .ok_or_else(|| UscDefsError::LevelHasNoId {
                tag: tag.to_string(),
            })?;
        let locator = self.locator_for(identifier)?;
        let kind = self
            .local_name(element)
            .and_then(LevelKind::from_tag)
            .ok_or_else(|| {
                UscDefsError::invariant(format!("unknown level kind <{tag}> at {locator}"))
            })?;

        let mut draft = LevelDraft::new(locator, kind);

        for child in element.children().filter(Node::is_element) {
            match self.classify(child) {
                ChildElement::Field(Field::Num) => draft.set_num(child.attribute("value"))?,
                ChildElement::Field(Field::Heading) => draft.heading = Some(node_text(child)),
                ChildElement::Field(Field::Chapeau) => draft.chapeau = Some(node_text(child)),
                ChildElement::Field(Field::Content) => draft.content = Some(node_text(child)),
                ChildElement::Field(Field::Continuation) => {
                    draft.place_continuation(node_text(child))?
                }
                ChildElement::Level(kind) => {
                    trace!(level = %draft.locator, %kind, "descending");
                    let sub = self.parse_level(child)?;
                    draft.push_child(sub, self.max_key_suffixes)?;
                }
                ChildElement::Other => {
                    trace!(level = %draft.locator, tag = child.tag_name().name(), "skipping element");
                }
            }
        }

        draft.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "http://xml.house.gov/schemas/uslm/1.0";

    fn wrap(body: &str) -> String {
        format!(r#"<uscDoc xmlns="{NS}" identifier="/us/usc/t99"><main>{body}</main></uscDoc>"#)
    }

    fn build(xml: &str, locator: &str) -> Result<DocumentNode> {
        let doc = parse_document(xml).unwrap();
        let builder = DocumentBuilder::new(&doc, "99", &BuildConfig::default());
        builder.build(&LevelLocator::parse(locator).unwrap())
    }

    #[test]
    fn builds_nested_levels() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s1"><num value="1">§ 1.</num>
                <heading>Definitions</heading>
                <chapeau>For purposes of this title—</chapeau>
                <paragraph identifier="/us/usc/t99/s1/1"><num value="1">(1)</num>
                    <content>The term “widget” means a device.</content></paragraph>
                <paragraph identifier="/us/usc/t99/s1/2"><num value="2">(2)</num>
                    <chapeau>The term “gadget” includes—</chapeau>
                    <subparagraph identifier="/us/usc/t99/s1/2/A"><num value="A">(A)</num>
                        <content>any tool.</content></subparagraph></paragraph>
            </section>"#,
        );
        let node = build(&xml, "s1").unwrap();

        assert_eq!(node.kind(), LevelKind::Section);
        assert_eq!(node.num(), "1");
        assert_eq!(node.heading(), Some("Definitions"));
        assert_eq!(node.chapeau(), Some("For purposes of this title—"));
        let keys: Vec<&str> = node.children().map(ChildLevel::key).collect();
        assert_eq!(keys, ["1", "2"]);

        let sub = node.child("2").unwrap().child("A").unwrap();
        assert_eq!(sub.kind(), LevelKind::Subparagraph);
        assert_eq!(sub.locator().as_str(), "s1/2/A");
        assert_eq!(sub.content(), Some("any tool."));
    }

    #[test]
    fn builds_from_a_nested_locator() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s1"><num value="1"/>
                <subsection identifier="/us/usc/t99/s1/a"><num value="a"/>
                    <content>Text.</content></subsection></section>"#,
        );
        let node = build(&xml, "s1/a").unwrap();
        assert_eq!(node.kind(), LevelKind::Subsection);
        assert_eq!(node.sentences(), ["Text."]);
    }

    #[test]
    fn continuations_follow_their_preceding_sibling() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s3"><num value="3"/>
                <chapeau>A.</chapeau>
                <subsection identifier="/us/usc/t99/s3/a"><num value="a"/><content>B.</content></subsection>
                <continuation>B2.</continuation>
                <subsection identifier="/us/usc/t99/s3/b"><num value="b"/><content>C.</content></subsection>
                <continuation>C2.</continuation>
                <continuation>D.</continuation>
            </section>"#,
        );
        let node = build(&xml, "s3").unwrap();

        let children: Vec<&ChildLevel> = node.children().collect();
        assert_eq!(children[0].continuation(), Some("B2."));
        assert_eq!(children[1].continuation(), Some("C2."));
        assert_eq!(node.continuation(), Some("D."));
        assert_eq!(node.sentences(), ["A.", "B.", "B2.", "C.", "C2.", "D."]);
    }

    #[test]
    fn continuation_before_children_belongs_to_level() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s3"><num value="3"/>
                <continuation>Lead.</continuation>
                <subsection identifier="/us/usc/t99/s3/a"><num value="a"/><content>B.</content></subsection>
            </section>"#,
        );
        let node = build(&xml, "s3").unwrap();
        assert_eq!(node.continuation(), Some("Lead."));
        assert_eq!(node.children().next().unwrap().continuation(), None);
    }

    #[test]
    fn second_leading_continuation_is_rejected() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s3"><num value="3"/>
                <continuation>One.</continuation>
                <continuation>Two.</continuation>
            </section>"#,
        );
        let err = build(&xml, "s3").unwrap_err();
        assert!(matches!(err, UscDefsError::Invariant { .. }));
        assert!(err.to_string().contains("second continuation"));
    }

    #[test]
    fn third_continuation_after_a_child_is_rejected() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s3"><num value="3"/>
                <subsection identifier="/us/usc/t99/s3/a"><num value="a"/><content>B.</content></subsection>
                <continuation>B2.</continuation>
                <continuation>C.</continuation>
                <continuation>D.</continuation>
            </section>"#,
        );
        let err = build(&xml, "s3").unwrap_err();
        assert!(matches!(err, UscDefsError::Invariant { .. }));
        assert!(err.to_string().contains("more than one trailing continuation"));
    }

    #[test]
    fn non_level_element_with_identifier_is_rejected() {
        let xml = wrap(
            r#"<chapter identifier="/us/usc/t99/s4"><num value="4"/>
                <content>Not a level.</content></chapter>"#,
        );
        let err = build(&xml, "s4").unwrap_err();
        assert!(matches!(err, UscDefsError::Invariant { .. }));
        assert!(err.to_string().contains("unknown level kind <chapter>"));
    }

    #[test]
    fn duplicate_nums_get_marked_keys() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s1"><num value="1"/>
                <paragraph identifier="/us/usc/t99/s1/12"><num value="12"/><content>X.</content></paragraph>
                <paragraph identifier="/us/usc/t99/s1/12"><num value="12"/><content>Y.</content></paragraph>
                <paragraph identifier="/us/usc/t99/s1/12"><num value="12"/><content>Z.</content></paragraph>
            </section>"#,
        );
        let node = build(&xml, "s1").unwrap();

        let keys: Vec<&str> = node.children().map(ChildLevel::key).collect();
        assert_eq!(keys, ["12", "12?", "12??"]);
        assert!(node.children().all(|c| c.node().num() == "12"));
        assert_eq!(node.child("12??").unwrap().content(), Some("Z."));
    }

    #[test]
    fn missing_level_is_not_found() {
        let xml = wrap(r#"<section identifier="/us/usc/t99/s1"><num value="1"/></section>"#);
        let err = build(&xml, "s2").unwrap_err();
        match err {
            UscDefsError::LevelNotFound { identifier } => {
                assert_eq!(identifier, "/us/usc/t99/s2");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicate_identifiers_are_an_invariant_violation() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s1"><num value="1"/></section>
               <section identifier="/us/usc/t99/s1"><num value="1"/></section>"#,
        );
        let err = build(&xml, "s1").unwrap_err();
        assert!(matches!(err, UscDefsError::Invariant { .. }));
    }

    #[test]
    fn unidentified_child_level_raises_level_has_no_id() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s2"><num value="2"/>
                <subsection><num value="a"/><content>Quoted.</content></subsection>
            </section>"#,
        );
        let err = build(&xml, "s2").unwrap_err();
        assert!(matches!(err, UscDefsError::LevelHasNoId { ref tag } if tag == "subsection"));
    }

    #[test]
    fn notes_and_foreign_elements_are_skipped() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s1"><num value="1"/>
                <content>Body.</content>
                <sourceCredit>(Pub. L. 1.)</sourceCredit>
                <notes><note><quotedContent><section><num value="9"/>
                    <content>The term “ghost” means nothing.</content></section></quotedContent></note></notes>
                <x:content xmlns:x="urn:other">Foreign.</x:content>
            </section>"#,
        );
        let node = build(&xml, "s1").unwrap();
        assert_eq!(node.content(), Some("Body."));
        assert_eq!(node.children().count(), 0);
        assert_eq!(node.sentences(), ["Body."]);
    }

    #[test]
    fn repeated_num_is_rejected() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s1"><num value="1"/><num value="1"/></section>"#,
        );
        let err = build(&xml, "s1").unwrap_err();
        assert!(err.to_string().contains("repeated num"));
    }

    #[test]
    fn num_mismatch_is_rejected() {
        let xml = wrap(r#"<section identifier="/us/usc/t99/s1"><num value="2"/></section>"#);
        assert!(matches!(
            build(&xml, "s1").unwrap_err(),
            UscDefsError::Invariant { .. }
        ));
    }

    #[test]
    fn range_identifiers_match_either_spelling() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s6...8"><num value="6 to 8"/>
                <content>Repealed.</content></section>"#,
        );
        let dotted = build(&xml, "s6...8").unwrap();
        let spelled = build(&xml, "s6 to 8").unwrap();
        assert_eq!(dotted.locator().as_str(), "s6 to 8");
        assert_eq!(spelled.num(), "6 to 8");
    }

    #[test]
    fn sections_skips_quoted_and_broken_sections() {
        let xml = wrap(
            r#"<section identifier="/us/usc/t99/s1"><num value="1"/><content>One.</content>
                <notes><quotedContent><section><num value="9"/></section></quotedContent></notes>
               </section>
               <section identifier="/us/usc/t99/s2"><num value="2"/>
                <subsection><num value="a"/></subsection></section>
               <section identifier="/us/usc/t99/s3"><num value="3"/><content>Three.</content></section>"#,
        );
        let doc = parse_document(&xml).unwrap();
        let builder = DocumentBuilder::new(&doc, "99", &BuildConfig::default());

        let sections: Vec<DocumentNode> = builder.sections().collect::<Result<_>>().unwrap();
        let locators: Vec<&str> = sections.iter().map(|s| s.locator().as_str()).collect();
        assert_eq!(locators, ["s1", "s3"]);
    }

    #[test]
    fn malformed_xml_is_an_xml_error() {
        let err = parse_document("<uscDoc><section></uscDoc>").unwrap_err();
        assert!(matches!(err, UscDefsError::Xml { .. }));
    }
}
