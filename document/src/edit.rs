//! Editing primitives over a [`Document`].
//!
//! These are the only mutations the auto-format engine and the editor session
//! perform. Every primitive validates its points before touching the tree, so a
//! failed edit leaves the document unchanged.

use crate::{
    document::Document,
    node::{Block, BlockKind, Mark, Node, TextRun},
    point::{Point, Selection},
};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no block at {path:?}")]
    NoBlock { path: Vec<usize> },
    #[error("no text run at {path:?}")]
    NotText { path: Vec<usize> },
    #[error("offset {offset} is out of bounds for text of length {len}")]
    OffsetOutOfBounds { offset: usize, len: usize },
    #[error("offset {offset} is not on a character boundary")]
    NotCharBoundary { offset: usize },
    #[error("text run at {path:?} has no enclosing block")]
    NoEnclosingBlock { path: Vec<usize> },
    #[error("range spans more than one block")]
    CrossBlockRange,
    #[error("selection is collapsed")]
    CollapsedSelection,
    #[error("text runs cannot contain line breaks")]
    LineBreakInText,
}

fn block_at<'a>(blocks: &'a [Block], path: &[usize]) -> Option<&'a Block> {
    let (first, rest) = path.split_first()?;
    let mut block = blocks.get(*first)?;
    for index in rest {
        block = block.children.get(*index)?.as_block()?;
    }
    Some(block)
}

fn block_at_mut<'a>(blocks: &'a mut [Block], path: &[usize]) -> Option<&'a mut Block> {
    let (first, rest) = path.split_first()?;
    let mut block = blocks.get_mut(*first)?;
    for index in rest {
        block = block.children.get_mut(*index)?.as_block_mut()?;
    }
    Some(block)
}

fn collect_text_paths(children: &[Node], prefix: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
    for (index, child) in children.iter().enumerate() {
        prefix.push(index);
        match child {
            Node::Text(_) => out.push(prefix.clone()),
            Node::Block(block) => collect_text_paths(&block.children, prefix, out),
        }
        prefix.pop();
    }
}

impl Document {
    pub fn block(&self, path: &[usize]) -> Option<&Block> {
        block_at(self.blocks(), path)
    }

    pub fn block_mut(&mut self, path: &[usize]) -> Option<&mut Block> {
        block_at_mut(self.blocks_mut(), path)
    }

    pub fn text_run(&self, path: &[usize]) -> Result<&TextRun, EditError> {
        let not_text = || EditError::NotText {
            path: path.to_vec(),
        };
        let (last, parent) = path.split_last().ok_or_else(not_text)?;
        self.block(parent)
            .and_then(|block| block.children.get(*last))
            .and_then(Node::as_text)
            .ok_or_else(not_text)
    }

    fn text_run_mut(&mut self, path: &[usize]) -> Result<&mut TextRun, EditError> {
        let not_text = || EditError::NotText {
            path: path.to_vec(),
        };
        let (last, parent) = path.split_last().ok_or_else(not_text)?;
        self.block_mut(parent)
            .and_then(|block| block.children.get_mut(*last))
            .and_then(Node::as_text_mut)
            .ok_or_else(not_text)
    }

    /// Paths of every text run below `block_path`, in document order.
    pub fn text_paths(&self, block_path: &[usize]) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        if let Some(block) = self.block(block_path) {
            let mut prefix = block_path.to_vec();
            collect_text_paths(&block.children, &mut prefix, &mut out);
        }
        out
    }

    /// The first position in the document.
    pub fn start(&self) -> Point {
        (0..self.blocks().len())
            .find_map(|index| self.text_paths(&[index]).into_iter().next())
            .map(|path| Point::new(path, 0))
            .unwrap_or_else(|| Point::new(vec![0, 0], 0))
    }

    fn check_point(&self, point: &Point) -> Result<&TextRun, EditError> {
        let run = self.text_run(&point.path)?;
        if point.offset > run.text.len() {
            return Err(EditError::OffsetOutOfBounds {
                offset: point.offset,
                len: run.text.len(),
            });
        }
        if !run.text.is_char_boundary(point.offset) {
            return Err(EditError::NotCharBoundary {
                offset: point.offset,
            });
        }
        Ok(run)
    }

    /// Path of the lowest non-inline block containing `point`.
    pub fn enclosing_block(&self, point: &Point) -> Result<Vec<usize>, EditError> {
        self.text_run(&point.path)?;
        (1..point.path.len())
            .rev()
            .map(|len| &point.path[..len])
            .find(|prefix| self.block(prefix).is_some_and(|b| !b.kind.is_inline()))
            .map(<[usize]>::to_vec)
            .ok_or_else(|| EditError::NoEnclosingBlock {
                path: point.path.clone(),
            })
    }

    /// Byte offset of `point` within the text of its enclosing block.
    pub fn block_offset(&self, point: &Point) -> Result<(Vec<usize>, usize), EditError> {
        self.check_point(point)?;
        let block_path = self.enclosing_block(point)?;
        let mut offset = 0;
        for path in self.text_paths(&block_path) {
            if path == point.path {
                return Ok((block_path, offset + point.offset));
            }
            offset += self.text_run(&path)?.text.len();
        }
        Err(EditError::NotText {
            path: point.path.clone(),
        })
    }

    /// Resolve a byte offset within a block's text back to a point. An offset on
    /// a run boundary resolves to the end of the earlier run.
    pub fn point_at(&self, block_path: &[usize], offset: usize) -> Result<Point, EditError> {
        let mut start = 0;
        let mut last = None;
        for path in self.text_paths(block_path) {
            let len = self.text_run(&path)?.text.len();
            if offset <= start + len {
                return Ok(Point::new(path, offset - start));
            }
            start += len;
            last = Some(path);
        }
        match last {
            Some(_) => Err(EditError::OffsetOutOfBounds { offset, len: start }),
            None => Err(EditError::NoBlock {
                path: block_path.to_vec(),
            }),
        }
    }

    /// Text from the start of the enclosing block up to `point`.
    pub fn block_text_before(&self, point: &Point) -> Result<String, EditError> {
        let (block_path, offset) = self.block_offset(point)?;
        let block = self.block(&block_path).ok_or(EditError::NoBlock { path: block_path })?;
        let text = block.text();
        Ok(text[..offset].to_string())
    }

    /// Insert `text` at `point`, returning the position just after it. Line
    /// breaks are rejected since a run lives inside a single markdown line.
    pub fn insert_text(&mut self, point: &Point, text: &str) -> Result<Point, EditError> {
        if text.contains(['\n', '\r']) {
            return Err(EditError::LineBreakInText);
        }
        self.check_point(point)?;
        let run = self.text_run_mut(&point.path)?;
        run.text.insert_str(point.offset, text);
        Ok(Point::new(point.path.clone(), point.offset + text.len()))
    }

    /// Delete the text between two points of the same block, returning the
    /// collapsed position where the range started.
    pub fn delete_range(&mut self, a: &Point, b: &Point) -> Result<Point, EditError> {
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        let (block_path, from) = self.block_offset(start)?;
        let (end_block, to) = self.block_offset(end)?;
        if block_path != end_block {
            return Err(EditError::CrossBlockRange);
        }

        let mut run_start = 0;
        for path in self.text_paths(&block_path) {
            let run = self.text_run_mut(&path)?;
            let len = run.text.len();
            let lo = from.max(run_start);
            let hi = to.min(run_start + len);
            if lo < hi {
                run.text.replace_range(lo - run_start..hi - run_start, "");
            }
            run_start += len;
        }

        Ok(start.clone())
    }

    /// Change the kind of the block at `path`. Leaving the check-list kind
    /// drops the `checked` attribute; entering it defaults to unchecked.
    pub fn set_block_kind(&mut self, path: &[usize], kind: BlockKind) -> Result<(), EditError> {
        let block = self.block_mut(path).ok_or_else(|| EditError::NoBlock {
            path: path.to_vec(),
        })?;
        block.kind = kind;
        if kind == BlockKind::CheckListItem {
            block.attrs.checked.get_or_insert(false);
        } else {
            block.attrs.checked = None;
        }
        Ok(())
    }

    /// Wrap the block at `path` in a new container of `kind`, returning the
    /// wrapped block's new path.
    pub fn wrap_block(&mut self, path: &[usize], kind: BlockKind) -> Result<Vec<usize>, EditError> {
        let no_block = || EditError::NoBlock {
            path: path.to_vec(),
        };
        let (last, parent) = path.split_last().ok_or_else(no_block)?;

        if parent.is_empty() {
            let slot = self.blocks_vec_mut().get_mut(*last).ok_or_else(no_block)?;
            let inner = std::mem::replace(slot, Block::new(kind, Vec::new()));
            slot.children.push(Node::Block(inner));
        } else {
            let slot = self
                .block_mut(parent)
                .and_then(|block| block.children.get_mut(*last))
                .filter(|node| node.as_block().is_some())
                .ok_or_else(no_block)?;
            let inner = std::mem::replace(slot, Node::Block(Block::new(kind, Vec::new())));
            if let Node::Block(container) = slot {
                container.children.push(inner);
            }
        }

        let mut wrapped = path.to_vec();
        wrapped.push(0);
        Ok(wrapped)
    }

    /// Merge the list at `path` with lists of the same kind directly before and
    /// after it among its siblings, so no two such lists sit next to each other.
    ///
    /// Returns the path of the merged list and how many items now precede the
    /// items that were at `path`.
    pub fn join_lists(&mut self, path: &[usize]) -> Result<(Vec<usize>, usize), EditError> {
        let no_block = || EditError::NoBlock {
            path: path.to_vec(),
        };
        let (last, parent) = path.split_last().ok_or_else(no_block)?;
        let kind = self
            .block(path)
            .map(|block| block.kind)
            .filter(|kind| kind.is_list())
            .ok_or_else(no_block)?;
        let sibling = |index: usize| {
            let mut sibling = parent.to_vec();
            sibling.push(index);
            sibling
        };
        let same_kind = |doc: &Self, index: usize| {
            doc.block(&sibling(index))
                .is_some_and(|block| block.kind == kind)
        };

        let mut index = *last;
        if same_kind(&*self, index + 1) {
            let next = self.take_block(parent, index + 1)?;
            self.block_mut(path)
                .ok_or_else(no_block)?
                .children
                .extend(next.children);
        }

        let mut preceding = 0;
        if index > 0 && same_kind(&*self, index - 1) {
            let current = self.take_block(parent, index)?;
            index -= 1;
            let previous = self.block_mut(&sibling(index)).ok_or_else(no_block)?;
            preceding = previous.children.len();
            previous.children.extend(current.children);
        }

        Ok((sibling(index), preceding))
    }

    fn take_block(&mut self, parent: &[usize], index: usize) -> Result<Block, EditError> {
        let no_block = || {
            let mut path = parent.to_vec();
            path.push(index);
            EditError::NoBlock { path }
        };
        if parent.is_empty() {
            let blocks = self.blocks_vec_mut();
            if index >= blocks.len() {
                return Err(no_block());
            }
            return Ok(blocks.remove(index));
        }
        let children = &mut self.block_mut(parent).ok_or_else(no_block)?.children;
        if children.get(index).and_then(Node::as_block).is_none() {
            return Err(no_block());
        }
        match children.remove(index) {
            Node::Block(block) => Ok(block),
            Node::Text(_) => Err(no_block()),
        }
    }

    /// Toggle `mark` over a non-collapsed selection inside one block.
    ///
    /// Runs are split at the selection boundaries. The mark is removed when
    /// every selected run already carries it, otherwise it is applied to all of
    /// them. The selection is remapped onto the new runs. Returns whether the
    /// mark is now applied.
    pub fn toggle_mark(&mut self, selection: &mut Selection, mark: Mark) -> Result<bool, EditError> {
        let (block_path, anchor) = self.block_offset(&selection.anchor)?;
        let (focus_block, focus) = self.block_offset(&selection.focus)?;
        if block_path != focus_block {
            return Err(EditError::CrossBlockRange);
        }
        let (from, to) = (anchor.min(focus), anchor.max(focus));
        if from == to {
            return Err(EditError::CollapsedSelection);
        }

        let mut covered: Vec<(Vec<usize>, usize, usize)> = Vec::new();
        let mut run_start = 0;
        for path in self.text_paths(&block_path) {
            let len = self.text_run(&path)?.text.len();
            let lo = from.max(run_start);
            let hi = to.min(run_start + len);
            if lo < hi {
                covered.push((path, lo - run_start, hi - run_start));
            }
            run_start += len;
        }

        let apply = !covered
            .iter()
            .map(|(path, _, _)| self.text_run(path).map(|run| run.has(mark)))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .all(|marked| marked);

        // Splice from the back so earlier paths stay valid.
        for (path, lo, hi) in covered.into_iter().rev() {
            let run = self.text_run(&path)?.clone();
            let mut middle = run.with_text(&run.text[lo..hi]);
            middle.set(mark, apply);

            let mut parts = Vec::with_capacity(3);
            if lo > 0 {
                parts.push(Node::Text(run.with_text(&run.text[..lo])));
            }
            parts.push(Node::Text(middle));
            if hi < run.text.len() {
                parts.push(Node::Text(run.with_text(&run.text[hi..])));
            }

            let (index, parent) = path.split_last().ok_or(EditError::NotText {
                path: path.clone(),
            })?;
            let parent = self
                .block_mut(parent)
                .ok_or_else(|| EditError::NoBlock { path: path.clone() })?;
            parent.children.splice(*index..=*index, parts);
        }

        selection.anchor = self.point_at(&block_path, anchor)?;
        selection.focus = self.point_at(&block_path, focus)?;
        Ok(apply)
    }
}
