//! Markdown text to document.
//!
//! The parser is line oriented and never recursive: each line is classified by
//! its prefix and becomes one block, except that consecutive list lines share a
//! list container and a header row followed by a separator row opens a table.

use crate::{inline::parse_inline, pattern};
use localwrite_document::{Block, BlockKind, Document, Node};
use regex::Regex;
use std::sync::LazyLock;

static HEADING: LazyLock<Regex> = LazyLock::new(|| pattern(r"^(#{1,6}) (.*)$"));
static CHECK_ITEM: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[-*] \[([ x])\] (.*)$"));
static NUMBERED_ITEM: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\d+\. (.*)$"));
static IMAGE: LazyLock<Regex> = LazyLock::new(|| pattern(r"^!\[[^\]]*\]\(([^)]*)\)$"));
static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| pattern(r"^\|.*\|$"));
static TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^\|(\s*:?-{3,}:?\s*\|)+$"));

/// One classified source line.
#[derive(Debug)]
enum Line<'a> {
    Heading(BlockKind, &'a str),
    Quote(&'a str),
    Check(bool, &'a str),
    Bullet(&'a str),
    Numbered(&'a str),
    Blank,
    Image(&'a str),
    Paragraph(&'a str),
}

fn classify(line: &str) -> Line<'_> {
    if let Some(caps) = HEADING.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.len());
        let kind = u8::try_from(level)
            .ok()
            .and_then(BlockKind::heading)
            .unwrap_or(BlockKind::HeadingOne);
        return Line::Heading(kind, caps.get(2).map_or("", |m| m.as_str()));
    }
    if let Some(rest) = line.strip_prefix("> ") {
        return Line::Quote(rest);
    }
    if let Some(caps) = CHECK_ITEM.captures(line) {
        let checked = caps.get(1).is_some_and(|m| m.as_str() == "x");
        return Line::Check(checked, caps.get(2).map_or("", |m| m.as_str()));
    }
    if let Some(rest) = line.strip_prefix("- ") {
        return Line::Bullet(rest);
    }
    if let Some(caps) = NUMBERED_ITEM.captures(line) {
        return Line::Numbered(caps.get(1).map_or("", |m| m.as_str()));
    }
    if line.trim().is_empty() {
        return Line::Blank;
    }
    if let Some(caps) = IMAGE.captures(line) {
        return Line::Image(caps.get(1).map_or("", |m| m.as_str()));
    }
    Line::Paragraph(line)
}

/// Parse markdown into a document.
///
/// Total: malformed input degrades to paragraphs and an empty input yields the
/// canonical empty document. `\r\n` line endings are accepted.
pub fn deserialize(input: &str) -> Document {
    let lines: Vec<&str> = input
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let mut blocks: Vec<Block> = Vec::new();
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];

        if is_table_start(&lines, index) {
            let mut rows = vec![table_row(line)];
            index += 2;
            while index < lines.len() && TABLE_ROW.is_match(lines[index]) {
                rows.push(table_row(lines[index]));
                index += 1;
            }
            blocks.push(Block::new(BlockKind::Table, rows));
            continue;
        }

        match classify(line) {
            Line::Heading(kind, rest) => blocks.push(Block::new(kind, parse_inline(rest))),
            Line::Quote(rest) => blocks.push(Block::new(BlockKind::BlockQuote, parse_inline(rest))),
            Line::Check(checked, rest) => {
                blocks.push(Block::check_list_item(checked, parse_inline(rest)));
            },
            Line::Bullet(rest) => push_item(&mut blocks, BlockKind::BulletedList, rest),
            Line::Numbered(rest) => push_item(&mut blocks, BlockKind::NumberedList, rest),
            Line::Blank => blocks.push(Block::empty_paragraph()),
            Line::Image(url) => blocks.push(Block::image(url)),
            Line::Paragraph(text) => {
                blocks.push(Block::new(BlockKind::Paragraph, parse_inline(text)));
            },
        }
        index += 1;
    }

    Document::from_blocks(blocks)
}

/// [`deserialize`] for content that may be absent, such as a file that has
/// not been written yet.
pub fn deserialize_opt(input: Option<&str>) -> Document {
    input.map_or_else(Document::empty, deserialize)
}

fn is_table_start(lines: &[&str], index: usize) -> bool {
    TABLE_ROW.is_match(lines[index])
        && lines
            .get(index + 1)
            .is_some_and(|next| TABLE_SEPARATOR.is_match(next))
}

fn table_row(line: &str) -> Node {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);
    let inner = inner.strip_suffix('|').unwrap_or(inner);
    let cells = inner
        .split('|')
        .map(|cell| Block::new(BlockKind::TableCell, parse_inline(cell.trim())).into())
        .collect();
    Block::new(BlockKind::TableRow, cells).into()
}

/// Append a list item, extending the previous block when it is a list of the
/// same kind.
fn push_item(blocks: &mut Vec<Block>, list: BlockKind, content: &str) {
    let item = Block::new(BlockKind::ListItem, parse_inline(content));
    match blocks.last_mut() {
        Some(last) if last.kind == list => last.children.push(item.into()),
        _ => blocks.push(Block::new(list, vec![item.into()])),
    }
}
