//! The [`Document`] root, its validity predicates and normalization.

use crate::node::{Block, BlockKind, Node, TextRun};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A non-empty ordered sequence of top-level blocks.
///
/// An empty document is always the single empty paragraph
/// (`[paragraph[text=""]]`), never an empty sequence. Constructors and
/// deserialization enforce this; mutation goes through slices or
/// [`Document::replace_blocks`] so the sequence can not become empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Block>", into = "Vec<Block>")]
pub struct Document {
    blocks: Vec<Block>,
}

/// A violated structural invariant, with the path of the offending node.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaViolation {
    #[error("document has no blocks")]
    EmptyDocument,
    #[error("block at {path:?} has no children")]
    EmptyBlock { path: Vec<usize> },
    #[error("inline {kind} at {path:?} appears outside a text block")]
    MisplacedInline { path: Vec<usize>, kind: BlockKind },
    #[error("list-item at {path:?} is not a direct child of a list")]
    ListItemOutsideList { path: Vec<usize> },
    #[error("list at {path:?} holds a non list-item child")]
    ListChildNotItem { path: Vec<usize> },
    #[error("table at {path:?} holds a non table-row child")]
    TableChildNotRow { path: Vec<usize> },
    #[error("table-row at {path:?} holds a non table-cell child")]
    RowChildNotCell { path: Vec<usize> },
    #[error("table-row at {path:?} is not a direct child of a table")]
    RowOutsideTable { path: Vec<usize> },
    #[error("table-cell at {path:?} is not a direct child of a table-row")]
    CellOutsideRow { path: Vec<usize> },
    #[error("check-list-item at {path:?} is nested inside a list")]
    CheckListItemInList { path: Vec<usize> },
    #[error("{kind} at {path:?} holds block children")]
    BlockInsideInline { path: Vec<usize>, kind: BlockKind },
    #[error("block at {path:?} mixes text with block children")]
    MixedContent { path: Vec<usize> },
    #[error("{kind} at {path:?} has no url")]
    MissingUrl { path: Vec<usize>, kind: BlockKind },
}

impl Default for Document {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Self::from_blocks(blocks)
    }
}

impl From<Document> for Vec<Block> {
    fn from(document: Document) -> Self {
        document.blocks
    }
}

impl Document {
    /// The canonical empty document.
    pub fn empty() -> Self {
        Self {
            blocks: vec![Block::empty_paragraph()],
        }
    }

    /// Build a document, substituting the canonical empty document for an
    /// empty sequence.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        if blocks.is_empty() {
            Self::empty()
        } else {
            Self { blocks }
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub(crate) fn blocks_vec_mut(&mut self) -> &mut Vec<Block> {
        &mut self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Replace every block, keeping the non-empty invariant.
    pub fn replace_blocks(&mut self, blocks: Vec<Block>) {
        *self = Self::from_blocks(blocks);
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Whether this is the canonical empty document.
    pub fn is_empty_document(&self) -> bool {
        *self == Self::empty()
    }

    /// Check every structural invariant of the tree.
    pub fn validate(&self) -> Result<(), SchemaViolation> {
        if self.blocks.is_empty() {
            return Err(SchemaViolation::EmptyDocument);
        }
        for (index, block) in self.blocks.iter().enumerate() {
            validate_block(block, &[index], None, false)?;
        }
        Ok(())
    }

    /// Copy of this document with adjacent runs of identical style merged and
    /// empty runs dropped wherever a sibling remains.
    pub fn normalized(&self) -> Document {
        let mut document = self.clone();
        document.normalize();
        document
    }

    pub fn normalize(&mut self) {
        for block in &mut self.blocks {
            normalize_block(block);
        }
    }

    /// Structural equivalence: same block kinds, nesting, text, style flags,
    /// `checked` and `url` after normalization. Alignment is presentation
    /// only and ignored.
    pub fn structurally_eq(&self, other: &Document) -> bool {
        let left = self.normalized();
        let right = other.normalized();
        left.blocks.len() == right.blocks.len()
            && left
                .blocks
                .iter()
                .zip(&right.blocks)
                .all(|(a, b)| same_block(a, b))
    }

    /// Concatenated text of each top-level block, one per line.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn validate_block(
    block: &Block,
    path: &[usize],
    parent: Option<BlockKind>,
    inside_list: bool,
) -> Result<(), SchemaViolation> {
    let at = || path.to_vec();

    match block.kind {
        kind if kind.is_inline() && parent.is_none() => {
            return Err(SchemaViolation::MisplacedInline { path: at(), kind });
        },
        BlockKind::ListItem if !parent.is_some_and(BlockKind::is_list) => {
            return Err(SchemaViolation::ListItemOutsideList { path: at() });
        },
        BlockKind::TableRow if parent != Some(BlockKind::Table) => {
            return Err(SchemaViolation::RowOutsideTable { path: at() });
        },
        BlockKind::TableCell if parent != Some(BlockKind::TableRow) => {
            return Err(SchemaViolation::CellOutsideRow { path: at() });
        },
        BlockKind::CheckListItem if inside_list => {
            return Err(SchemaViolation::CheckListItemInList { path: at() });
        },
        BlockKind::Link | BlockKind::Image if block.attrs.url.is_none() => {
            return Err(SchemaViolation::MissingUrl {
                path: at(),
                kind: block.kind,
            });
        },
        _ => {},
    }

    if block.children.is_empty() {
        return Err(SchemaViolation::EmptyBlock { path: at() });
    }

    let inline_count = block.children.iter().filter(|c| c.is_inline()).count();
    if inline_count != 0 && inline_count != block.children.len() {
        return Err(SchemaViolation::MixedContent { path: at() });
    }

    let inside_list = inside_list || block.kind.is_list();
    for (index, child) in block.children.iter().enumerate() {
        let mut child_path = path.to_vec();
        child_path.push(index);

        let child_block = match child {
            Node::Block(child_block) => Some(child_block),
            Node::Text(_) => None,
        };
        let child_kind = child_block.map(|b| b.kind);

        match block.kind {
            BlockKind::BulletedList | BlockKind::NumberedList
                if child_kind != Some(BlockKind::ListItem) =>
            {
                return Err(SchemaViolation::ListChildNotItem { path: at() });
            },
            BlockKind::Table if child_kind != Some(BlockKind::TableRow) => {
                return Err(SchemaViolation::TableChildNotRow { path: at() });
            },
            BlockKind::TableRow if child_kind != Some(BlockKind::TableCell) => {
                return Err(SchemaViolation::RowChildNotCell { path: at() });
            },
            BlockKind::Link | BlockKind::Image if child_block.is_some() => {
                return Err(SchemaViolation::BlockInsideInline {
                    path: at(),
                    kind: block.kind,
                });
            },
            _ => {},
        }

        if let Some(child_block) = child_block {
            validate_block(child_block, &child_path, Some(block.kind), inside_list)?;
        }
    }

    Ok(())
}

fn normalize_block(block: &mut Block) {
    let mut children = std::mem::take(&mut block.children);
    if children.len() > 1 {
        children.retain(|node| !matches!(node, Node::Text(run) if run.text.is_empty()));
    }

    let mut merged: Vec<Node> = Vec::with_capacity(children.len());
    for child in children {
        match child {
            Node::Text(run) => {
                if let Some(Node::Text(previous)) = merged.last_mut() {
                    if previous.same_marks(&run) {
                        previous.text.push_str(&run.text);
                        continue;
                    }
                }
                merged.push(Node::Text(run));
            },
            Node::Block(mut child_block) => {
                normalize_block(&mut child_block);
                merged.push(Node::Block(child_block));
            },
        }
    }

    if merged.is_empty() && holds_text(block.kind) {
        merged.push(Node::Text(TextRun::default()));
    }
    block.children = merged;
}

/// Containers whose children are exclusively blocks.
fn holds_text(kind: BlockKind) -> bool {
    !matches!(
        kind,
        BlockKind::BulletedList | BlockKind::NumberedList | BlockKind::Table | BlockKind::TableRow
    )
}

fn same_block(a: &Block, b: &Block) -> bool {
    if a.kind != b.kind || a.children.len() != b.children.len() {
        return false;
    }
    if a.kind == BlockKind::CheckListItem && a.is_checked() != b.is_checked() {
        return false;
    }
    if matches!(a.kind, BlockKind::Link | BlockKind::Image) && a.url() != b.url() {
        return false;
    }
    a.children
        .iter()
        .zip(&b.children)
        .all(|pair| match pair {
            (Node::Text(x), Node::Text(y)) => x == y,
            (Node::Block(x), Node::Block(y)) => same_block(x, y),
            _ => false,
        })
}
