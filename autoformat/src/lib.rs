//! Markdown-style block shortcuts applied while typing.
//!
//! Typing a shortcut prefix at the start of a block followed by a space
//! retypes that block: `#` through `######` become headings, `>` a block
//! quote, `*`, `-` or `+` a bulleted list item and `1.` (any digits) a
//! numbered list item. The prefix is consumed and the space is not inserted.
//! Nothing here keeps state between keystrokes; every decision is derived
//! from the document and the cursor.

use localwrite_document::{BlockKind, Document, EditError, Mark, Point, Selection};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static NUMBERED: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^\d+\.$") {
    Ok(regex) => regex,
    Err(err) => unreachable!("invalid numbered shortcut pattern: {err}"),
});

const SHORTCUTS: &[(&str, BlockKind)] = &[
    ("*", BlockKind::ListItem),
    ("-", BlockKind::ListItem),
    ("+", BlockKind::ListItem),
    (">", BlockKind::BlockQuote),
    ("#", BlockKind::HeadingOne),
    ("##", BlockKind::HeadingTwo),
    ("###", BlockKind::HeadingThree),
    ("####", BlockKind::HeadingFour),
    ("#####", BlockKind::HeadingFive),
    ("######", BlockKind::HeadingSix),
];

/// What an insert did to the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The text was inserted as typed.
    Inserted,
    /// A shortcut fired and the cursor block now has this kind.
    Transformed(BlockKind),
}

/// The shortcut engine.
#[derive(Debug, Clone)]
pub struct AutoFormat {
    enabled: bool,
    shortcuts: &'static [(&'static str, BlockKind)],
}

impl Default for AutoFormat {
    fn default() -> Self {
        Self::new(true)
    }
}

impl AutoFormat {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            shortcuts: SHORTCUTS,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Block kind a prefix typed at block start turns into.
    pub fn shortcut(&self, prefix: &str) -> Option<BlockKind> {
        if NUMBERED.is_match(prefix) {
            return Some(BlockKind::ListItem);
        }
        self.shortcuts
            .iter()
            .find(|(key, _)| *key == prefix)
            .map(|(_, kind)| *kind)
    }

    /// Insert `text` at the selection, firing a shortcut when `text` is a
    /// single space typed at a collapsed cursor.
    ///
    /// An expanded selection inside one block is deleted first and the text is
    /// then inserted literally. Text with a line break is rejected up front. The selection is left collapsed after the
    /// inserted text, or at the start of a transformed block.
    pub fn insert_text(
        &self,
        document: &mut Document,
        selection: &mut Selection,
        text: &str,
    ) -> Result<InsertOutcome, EditError> {
        if text.contains(['\n', '\r']) {
            return Err(EditError::LineBreakInText);
        }
        let cursor = if selection.is_collapsed() {
            if text == " " && self.enabled {
                if let Some((kind, cursor)) = self.transform(document, &selection.focus)? {
                    *selection = Selection::collapsed(cursor);
                    return Ok(InsertOutcome::Transformed(kind));
                }
            }
            selection.focus.clone()
        } else {
            document.delete_range(&selection.anchor, &selection.focus)?
        };

        let after = document.insert_text(&cursor, text)?;
        *selection = Selection::collapsed(after);
        Ok(InsertOutcome::Inserted)
    }

    fn transform(
        &self,
        document: &mut Document,
        cursor: &Point,
    ) -> Result<Option<(BlockKind, Point)>, EditError> {
        let block_path = document.enclosing_block(cursor)?;
        let current = document
            .block(&block_path)
            .map(|block| block.kind)
            .ok_or_else(|| EditError::NoBlock {
                path: block_path.clone(),
            })?;
        if matches!(current, BlockKind::ListItem | BlockKind::TableCell) {
            return Ok(None);
        }

        let before = document.block_text_before(cursor)?;
        let Some(kind) = self.shortcut(&before) else {
            return Ok(None);
        };
        let container = match kind {
            BlockKind::ListItem if NUMBERED.is_match(&before) => Some(BlockKind::NumberedList),
            BlockKind::ListItem => Some(BlockKind::BulletedList),
            _ => None,
        };

        let start = document.point_at(&block_path, 0)?;
        document.delete_range(&start, cursor)?;
        document.set_block_kind(&block_path, kind)?;

        let start = document.point_at(&block_path, 0)?;
        let cursor = match container {
            Some(container) => {
                document.wrap_block(&block_path, container)?;
                // Neighbouring lists of the same kind would merge on reparse.
                let (mut path, preceding) = document.join_lists(&block_path)?;
                path.push(preceding);
                path.extend_from_slice(&start.path[block_path.len()..]);
                Point::new(path, 0)
            },
            None => start,
        };

        debug!(prefix = %before, from = %current, to = %kind, "applied block shortcut");
        Ok(Some((kind, cursor)))
    }
}

/// Mark toggled by a `mod+<key>` hotkey.
pub fn hotkey_mark(key: char) -> Option<Mark> {
    match key {
        'b' => Some(Mark::Bold),
        'i' => Some(Mark::Italic),
        'u' => Some(Mark::Underline),
        '`' => Some(Mark::Code),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localwrite_document::{Block, Node};

    fn typed(document: &mut Document, selection: &mut Selection, keys: &str) -> InsertOutcome {
        let engine = AutoFormat::default();
        let mut outcome = InsertOutcome::Inserted;
        for key in keys.chars() {
            outcome = engine
                .insert_text(document, selection, &key.to_string())
                .unwrap();
        }
        outcome
    }

    fn empty() -> (Document, Selection) {
        let document = Document::empty();
        let selection = Selection::collapsed(document.start());
        (document, selection)
    }

    #[test]
    fn hash_space_makes_heading_one() {
        localwrite_log::test();
        let (mut document, mut selection) = empty();
        let outcome = typed(&mut document, &mut selection, "# ");

        assert_eq!(outcome, InsertOutcome::Transformed(BlockKind::HeadingOne));
        assert_eq!(document.blocks()[0].kind, BlockKind::HeadingOne);
        assert_eq!(document.blocks()[0].text(), "");
        assert_eq!(selection, Selection::collapsed(Point::new(vec![0, 0], 0)));

        typed(&mut document, &mut selection, "Title");
        assert_eq!(document.blocks()[0].text(), "Title");
    }

    #[test]
    fn mid_line_hash_does_not_transform() {
        let (mut document, mut selection) = empty();
        let outcome = typed(&mut document, &mut selection, "a# ");

        assert_eq!(outcome, InsertOutcome::Inserted);
        assert_eq!(document.blocks()[0].kind, BlockKind::Paragraph);
        assert_eq!(document.blocks()[0].text(), "a# ");
    }

    #[test]
    fn every_heading_level() {
        for level in 1..=6u8 {
            let (mut document, mut selection) = empty();
            typed(&mut document, &mut selection, &format!("{} ", "#".repeat(level.into())));
            assert_eq!(Some(document.blocks()[0].kind), BlockKind::heading(level));
        }
        let (mut document, mut selection) = empty();
        typed(&mut document, &mut selection, "####### ");
        assert_eq!(document.blocks()[0].text(), "####### ");
    }

    #[test]
    fn number_dot_space_makes_numbered_list() {
        let (mut document, mut selection) = empty();
        let outcome = typed(&mut document, &mut selection, "1. ");

        assert_eq!(outcome, InsertOutcome::Transformed(BlockKind::ListItem));
        let list = &document.blocks()[0];
        assert_eq!(list.kind, BlockKind::NumberedList);
        let item = list.children[0].as_block().unwrap();
        assert_eq!(item.kind, BlockKind::ListItem);
        assert_eq!(item.text(), "");
        assert_eq!(selection.focus, Point::new(vec![0, 0, 0], 0));
        assert_eq!(document.validate(), Ok(()));

        typed(&mut document, &mut selection, "first");
        assert_eq!(document.block(&[0, 0]).unwrap().text(), "first");
    }

    #[test]
    fn bullet_prefixes_make_bulleted_lists() {
        for prefix in ["* ", "- ", "+ "] {
            let (mut document, mut selection) = empty();
            typed(&mut document, &mut selection, prefix);
            assert_eq!(document.blocks()[0].kind, BlockKind::BulletedList);
            assert_eq!(document.validate(), Ok(()));
        }
    }

    #[test]
    fn only_the_cursor_block_changes() {
        let mut document = Document::from_blocks(vec![
            Block::paragraph("above"),
            Block::paragraph(">rest"),
            Block::paragraph("below"),
        ]);
        let mut selection = Selection::collapsed(Point::new(vec![1, 0], 1));
        typed(&mut document, &mut selection, " ");

        assert_eq!(document.blocks()[0], Block::paragraph("above"));
        assert_eq!(document.blocks()[1].kind, BlockKind::BlockQuote);
        assert_eq!(document.blocks()[1].text(), "rest");
        assert_eq!(document.blocks()[2], Block::paragraph("below"));
    }

    #[test]
    fn list_items_do_not_retrigger() {
        let (mut document, mut selection) = empty();
        typed(&mut document, &mut selection, "- # ");
        assert_eq!(document.blocks()[0].kind, BlockKind::BulletedList);
        assert_eq!(document.block(&[0, 0]).unwrap().text(), "# ");
    }

    #[test]
    fn retyping_check_item_drops_checked() {
        let mut document = Document::from_blocks(vec![Block::check_list_item(
            true,
            vec![Node::text("##")],
        )]);
        let mut selection = Selection::collapsed(Point::new(vec![0, 0], 2));
        typed(&mut document, &mut selection, " ");
        assert_eq!(document.blocks()[0].kind, BlockKind::HeadingTwo);
        assert_eq!(document.blocks()[0].attrs.checked, None);
    }

    #[test]
    fn disabled_engine_inserts_literally() {
        let (mut document, mut selection) = empty();
        let engine = AutoFormat::new(false);
        for key in ["#", " "] {
            engine
                .insert_text(&mut document, &mut selection, key)
                .unwrap();
        }
        assert_eq!(document.blocks()[0].kind, BlockKind::Paragraph);
        assert_eq!(document.blocks()[0].text(), "# ");
    }

    #[test]
    fn expanded_selection_is_replaced() {
        let mut document = Document::from_blocks(vec![Block::paragraph("#abc")]);
        let mut selection = Selection::new(Point::new(vec![0, 0], 1), Point::new(vec![0, 0], 4));
        let outcome = AutoFormat::default()
            .insert_text(&mut document, &mut selection, " ")
            .unwrap();
        assert_eq!(outcome, InsertOutcome::Inserted);
        assert_eq!(document.blocks()[0].text(), "# ");
        assert_eq!(selection.focus, Point::new(vec![0, 0], 2));
    }

    fn bullets(items: &[&str]) -> Block {
        Block::new(
            BlockKind::BulletedList,
            items
                .iter()
                .map(|text| Block::new(BlockKind::ListItem, vec![Node::text(*text)]).into())
                .collect(),
        )
    }

    #[test]
    fn shortcut_after_a_list_extends_it() {
        let mut document = Document::from_blocks(vec![bullets(&["a", "b"]), Block::paragraph("")]);
        let mut selection = Selection::collapsed(Point::new(vec![1, 0], 0));
        let outcome = typed(&mut document, &mut selection, "- c");

        assert_eq!(outcome, InsertOutcome::Inserted);
        assert_eq!(document.blocks(), &[bullets(&["a", "b", "c"])]);
        assert_eq!(selection.focus, Point::new(vec![0, 2, 0], 1));
    }

    #[test]
    fn shortcut_between_lists_joins_them() {
        let mut document = Document::from_blocks(vec![
            bullets(&["a"]),
            Block::paragraph(""),
            bullets(&["c"]),
        ]);
        let mut selection = Selection::collapsed(Point::new(vec![1, 0], 0));
        typed(&mut document, &mut selection, "* b");

        assert_eq!(document.blocks(), &[bullets(&["a", "b", "c"])]);
        assert_eq!(selection.focus, Point::new(vec![0, 1, 0], 1));
        assert_eq!(document.validate(), Ok(()));
    }

    #[test]
    fn shortcut_next_to_other_list_kind_stays_separate() {
        let mut document = Document::from_blocks(vec![bullets(&["a"]), Block::paragraph("")]);
        let mut selection = Selection::collapsed(Point::new(vec![1, 0], 0));
        typed(&mut document, &mut selection, "1. ");

        assert_eq!(document.blocks().len(), 2);
        assert_eq!(document.blocks()[1].kind, BlockKind::NumberedList);
        assert_eq!(selection.focus, Point::new(vec![1, 0, 0], 0));
    }

    #[test]
    fn line_breaks_are_rejected_before_any_change() {
        let mut document = Document::from_blocks(vec![Block::paragraph("abc")]);
        let mut selection = Selection::new(Point::new(vec![0, 0], 0), Point::new(vec![0, 0], 2));
        let before = (document.clone(), selection.clone());

        let err = AutoFormat::default()
            .insert_text(&mut document, &mut selection, "x\n# y")
            .unwrap_err();
        assert_eq!(err, EditError::LineBreakInText);
        assert_eq!((document, selection), before);
    }

    #[test]
    fn hotkeys_map_to_marks() {
        assert_eq!(hotkey_mark('b'), Some(Mark::Bold));
        assert_eq!(hotkey_mark('`'), Some(Mark::Code));
        assert_eq!(hotkey_mark('x'), None);
    }
}
