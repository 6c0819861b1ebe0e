//! In-memory level tree and its sentence linearization.

use std::cell::OnceCell;

use uscdefs_shared::{Result, UscDefsError};

use crate::locator::LevelLocator;
use crate::sentences::split_sentences;

// ---------------------------------------------------------------------------
// LevelKind
// ---------------------------------------------------------------------------

/// The hierarchy tags a level element can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LevelKind {
    Section,
    Subsection,
    Paragraph,
    Subparagraph,
    Clause,
    Subclause,
    Item,
    Subitem,
    Subsubitem,
}

impl LevelKind {
    pub const ALL: [LevelKind; 9] = [
        LevelKind::Section,
        LevelKind::Subsection,
        LevelKind::Paragraph,
        LevelKind::Subparagraph,
        LevelKind::Clause,
        LevelKind::Subclause,
        LevelKind::Item,
        LevelKind::Subitem,
        LevelKind::Subsubitem,
    ];

    /// Element name in the markup.
    pub fn tag(self) -> &'static str {
        match self {
            LevelKind::Section => "section",
            LevelKind::Subsection => "subsection",
            LevelKind::Paragraph => "paragraph",
            LevelKind::Subparagraph => "subparagraph",
            LevelKind::Clause => "clause",
            LevelKind::Subclause => "subclause",
            LevelKind::Item => "item",
            LevelKind::Subitem => "subitem",
            LevelKind::Subsubitem => "subsubitem",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl std::fmt::Display for LevelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// ChildLevel
// ---------------------------------------------------------------------------

/// A child level as stored by its parent.
#[derive(Debug)]
pub struct ChildLevel {
    pub(crate) key: String,
    pub(crate) node: DocumentNode,
    pub(crate) continuation: Option<String>,
}

impl ChildLevel {
    pub fn new(key: impl Into<String>, node: DocumentNode) -> Self {
        Self {
            key: key.into(),
            node,
            continuation: None,
        }
    }

    /// Attach the continuation text that directly follows this child.
    pub fn with_continuation(mut self, text: impl Into<String>) -> Self {
        self.continuation = Some(text.into());
        self
    }

    /// Key in the parent's child map: the child's `num`, plus `?` markers
    /// when an earlier sibling already used that number.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn node(&self) -> &DocumentNode {
        &self.node
    }

    pub fn continuation(&self) -> Option<&str> {
        self.continuation.as_deref()
    }
}

// ---------------------------------------------------------------------------
// DocumentNode
// ---------------------------------------------------------------------------

/// Everything needed to construct a [`DocumentNode`].
#[derive(Debug)]
pub struct LevelParts {
    pub locator: LevelLocator,
    pub kind: LevelKind,
    pub num: String,
    pub heading: Option<String>,
    pub chapeau: Option<String>,
    pub content: Option<String>,
    /// Continuation owned by the level itself rather than by one child.
    pub continuation: Option<String>,
    /// Children in document order.
    pub children: Vec<ChildLevel>,
}

/// One level (section, subsection, paragraph, ...) and its descendants.
///
/// Immutable once built. Sentence fragments and sentences are computed on
/// first access and cached for the lifetime of the node.
#[derive(Debug)]
pub struct DocumentNode {
    locator: LevelLocator,
    kind: LevelKind,
    num: String,
    heading: Option<String>,
    chapeau: Option<String>,
    content: Option<String>,
    continuation: Option<String>,
    children: Vec<ChildLevel>,
    fragments: OnceCell<Vec<String>>,
    sentences: OnceCell<Vec<String>>,
}

impl DocumentNode {
    /// Build a node, checking that `num` matches the locator and that child
    /// keys are unique.
    pub fn new(parts: LevelParts) -> Result<Self> {
        if parts.num != parts.locator.deepest_number() {
            return Err(UscDefsError::invariant(format!(
                "level {} has num {:?}, expected {:?}",
                parts.locator,
                parts.num,
                parts.locator.deepest_number()
            )));
        }
        for (i, child) in parts.children.iter().enumerate() {
            if parts.children[..i].iter().any(|c| c.key == child.key) {
                return Err(UscDefsError::invariant(format!(
                    "level {} has two children keyed {:?}",
                    parts.locator, child.key
                )));
            }
        }

        Ok(Self {
            locator: parts.locator,
            kind: parts.kind,
            num: parts.num,
            heading: parts.heading,
            chapeau: parts.chapeau,
            content: parts.content,
            continuation: parts.continuation,
            children: parts.children,
            fragments: OnceCell::new(),
            sentences: OnceCell::new(),
        })
    }

    pub fn locator(&self) -> &LevelLocator {
        &self.locator
    }

    pub fn kind(&self) -> LevelKind {
        self.kind
    }

    pub fn num(&self) -> &str {
        &self.num
    }

    pub fn heading(&self) -> Option<&str> {
        self.heading.as_deref()
    }

    pub fn chapeau(&self) -> Option<&str> {
        self.chapeau.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Continuation text owned by this level (after all of its children).
    pub fn continuation(&self) -> Option<&str> {
        self.continuation.as_deref()
    }

    /// Children in document order.
    pub fn children(&self) -> impl Iterator<Item = &ChildLevel> {
        self.children.iter()
    }

    /// Look up a child by its key.
    pub fn child(&self, key: &str) -> Option<&DocumentNode> {
        self.children
            .iter()
            .find(|c| c.key == key)
            .map(|c| &c.node)
    }

    /// Text fragments of this level and its descendants in reading order:
    /// chapeau, content, each child's fragments followed by that child's
    /// continuation, and finally this level's own continuation.
    pub fn fragments(&self) -> &[String] {
        self.fragments.get_or_init(|| {
            let mut fragments = Vec::new();
            fragments.extend(self.chapeau.iter().cloned());
            fragments.extend(self.content.iter().cloned());
            for child in &self.children {
                fragments.extend(child.node.fragments().iter().cloned());
                fragments.extend(child.continuation.iter().cloned());
            }
            fragments.extend(self.continuation.iter().cloned());
            fragments
        })
    }

    /// The fragments joined with spaces and split into sentences.
    pub fn sentences(&self) -> &[String] {
        self.sentences
            .get_or_init(|| split_sentences(&self.fragments().join(" ")))
    }

    /// Sentences joined by line breaks, the text definitions are searched in.
    pub fn text(&self) -> String {
        self.sentences().join("\n")
    }
}

impl std::fmt::Display for DocumentNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text())
    }
}
