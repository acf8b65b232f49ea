//! Node types for the structured document tree.
//!
//! A document is a tree of [`Block`] containers whose leaves are [`TextRun`]s.
//! The JSON form produced by `serde` matches the editor's in-memory tree, e.g.
//! `{"type":"heading-one","children":[{"text":"Title","bold":true}]}`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Inline style flags carried by a [`TextRun`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    Bold,
    Italic,
    Code,
    Underline,
}

impl Mark {
    pub const ALL: [Mark; 4] = [Mark::Bold, Mark::Italic, Mark::Code, Mark::Underline];
}

/// A leaf holding literal text and independent style flags.
///
/// Flags are flat marks: a run is either bold or not, there is no nesting of
/// identical styles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl TextRun {
    /// Create an unstyled run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn code(mut self) -> Self {
        self.code = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Code => self.code,
            Mark::Underline => self.underline,
        }
    }

    pub fn set(&mut self, mark: Mark, on: bool) {
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Code => self.code = on,
            Mark::Underline => self.underline = on,
        }
    }

    /// Whether both runs carry exactly the same style flags.
    pub fn same_marks(&self, other: &TextRun) -> bool {
        Mark::ALL.iter().all(|m| self.has(*m) == other.has(*m))
    }

    /// Number of active style flags.
    pub fn mark_count(&self) -> usize {
        Mark::ALL.iter().filter(|m| self.has(**m)).count()
    }

    /// Copy of this run's style flags with different text.
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }
}

/// The kind of a [`Block`] container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    HeadingThree,
    HeadingFour,
    HeadingFive,
    HeadingSix,
    BlockQuote,
    BulletedList,
    NumberedList,
    ListItem,
    CheckListItem,
    Table,
    TableRow,
    TableCell,
    Link,
    Image,
}

impl BlockKind {
    const HEADINGS: [BlockKind; 6] = [
        BlockKind::HeadingOne,
        BlockKind::HeadingTwo,
        BlockKind::HeadingThree,
        BlockKind::HeadingFour,
        BlockKind::HeadingFive,
        BlockKind::HeadingSix,
    ];

    /// Heading kind for `level` in `1..=6`.
    pub fn heading(level: u8) -> Option<BlockKind> {
        Self::HEADINGS.get(usize::from(level).checked_sub(1)?).copied()
    }

    /// Heading level in `1..=6`, or `None` for non-heading kinds.
    pub fn heading_level(self) -> Option<u8> {
        Self::HEADINGS
            .iter()
            .position(|k| *k == self)
            .map(|i| i as u8 + 1)
    }

    pub fn is_list(self) -> bool {
        matches!(self, BlockKind::BulletedList | BlockKind::NumberedList)
    }

    /// Inline kinds live among text runs rather than standing as blocks.
    pub fn is_inline(self) -> bool {
        matches!(self, BlockKind::Link)
    }

    /// Void kinds carry no editable text of their own.
    pub fn is_void(self) -> bool {
        matches!(self, BlockKind::Image)
    }

    /// Kinds that accept an `align` attribute.
    pub fn is_alignable(self) -> bool {
        matches!(
            self,
            BlockKind::Paragraph
                | BlockKind::HeadingOne
                | BlockKind::HeadingTwo
                | BlockKind::HeadingThree
                | BlockKind::HeadingFour
                | BlockKind::HeadingFive
                | BlockKind::HeadingSix
                | BlockKind::BlockQuote
                | BlockKind::ListItem
                | BlockKind::CheckListItem
                | BlockKind::TableCell
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockKind::Paragraph => "paragraph",
            BlockKind::HeadingOne => "heading-one",
            BlockKind::HeadingTwo => "heading-two",
            BlockKind::HeadingThree => "heading-three",
            BlockKind::HeadingFour => "heading-four",
            BlockKind::HeadingFive => "heading-five",
            BlockKind::HeadingSix => "heading-six",
            BlockKind::BlockQuote => "block-quote",
            BlockKind::BulletedList => "bulleted-list",
            BlockKind::NumberedList => "numbered-list",
            BlockKind::ListItem => "list-item",
            BlockKind::CheckListItem => "check-list-item",
            BlockKind::Table => "table",
            BlockKind::TableRow => "table-row",
            BlockKind::TableCell => "table-cell",
            BlockKind::Link => "link",
            BlockKind::Image => "image",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Horizontal alignment of an alignable block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Center,
    Right,
    Justify,
}

/// Kind-specific attributes of a [`Block`].
///
/// `checked` belongs to check-list items, `url` to links and images, `align`
/// to alignable kinds. Unused attributes stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

/// A container node with ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub children: Vec<Node>,
    #[serde(flatten)]
    pub attrs: BlockAttrs,
}

impl Block {
    pub fn new(kind: BlockKind, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            attrs: BlockAttrs::default(),
        }
    }

    /// Paragraph holding a single unstyled run.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, vec![Node::text(text)])
    }

    /// The canonical empty paragraph, `paragraph[text=""]`.
    pub fn empty_paragraph() -> Self {
        Self::paragraph("")
    }

    pub fn check_list_item(checked: bool, children: Vec<Node>) -> Self {
        let mut block = Self::new(BlockKind::CheckListItem, children);
        block.attrs.checked = Some(checked);
        block
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        let mut block = Self::new(BlockKind::Link, children);
        block.attrs.url = Some(url.into());
        block
    }

    pub fn image(url: impl Into<String>) -> Self {
        let mut block = Self::new(BlockKind::Image, vec![Node::text("")]);
        block.attrs.url = Some(url.into());
        block
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.attrs.align = Some(align);
        self
    }

    /// Checked state of a check-list item; absent means unchecked.
    pub fn is_checked(&self) -> bool {
        self.attrs.checked.unwrap_or(false)
    }

    pub fn url(&self) -> &str {
        self.attrs.url.as_deref().unwrap_or("")
    }

    /// Concatenated text of every run below this block.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Whether every child is a text run or an inline block.
    pub fn has_inline_children(&self) -> bool {
        self.children.iter().all(Node::is_inline)
    }
}

fn collect_text(children: &[Node], out: &mut String) {
    for child in children {
        match child {
            Node::Text(run) => out.push_str(&run.text),
            Node::Block(block) => collect_text(&block.children, out),
        }
    }
}

/// A document node: either a leaf text run or a container block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(TextRun),
    Block(Block),
}

impl Node {
    /// Unstyled text leaf.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(TextRun::plain(text))
    }

    pub fn as_text(&self) -> Option<&TextRun> {
        match self {
            Node::Text(run) => Some(run),
            Node::Block(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextRun> {
        match self {
            Node::Text(run) => Some(run),
            Node::Block(_) => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Text(_) => None,
        }
    }

    pub fn as_block_mut(&mut self) -> Option<&mut Block> {
        match self {
            Node::Block(block) => Some(block),
            Node::Text(_) => None,
        }
    }

    /// Text runs and inline blocks flow together inside a text-bearing block.
    pub fn is_inline(&self) -> bool {
        match self {
            Node::Text(_) => true,
            Node::Block(block) => block.kind.is_inline(),
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Text(_) => &[],
            Node::Block(block) => &block.children,
        }
    }
}

impl From<TextRun> for Node {
    fn from(run: TextRun) -> Self {
        Node::Text(run)
    }
}

impl From<Block> for Node {
    fn from(block: Block) -> Self {
        Node::Block(block)
    }
}
