//! Inline span parsing for a single line of content.

use crate::pattern;
use localwrite_document::{Block, Node, TextRun};
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Style delimiters in priority order: bold, code, italic, underline.
const STYLE_PATTERN: &str =
    r"(?P<bold>\*\*.*?\*\*)|(?P<code>`.*?`)|(?P<italic>\*.*?\*)|(?P<underline>__.*?__)";

static STYLES: LazyLock<Regex> = LazyLock::new(|| pattern(STYLE_PATTERN));

/// Styles plus `[label](url)` links at the lowest priority.
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    pattern(&format!(
        r"{STYLE_PATTERN}|(?P<link>\[(?P<label>[^\]]*)\]\((?P<url>[^)]*)\))"
    ))
});

/// Parse one line of content into text runs and inline links.
///
/// A single left-to-right scan matches, at each position, the first of
/// `**bold**`, `` `code` ``, `*italic*`, `__underline__` and `[label](url)`.
/// Each matched span carries exactly one style; combined or nested marks are
/// not recognized. Text between matches becomes unstyled runs. The result is
/// never empty.
pub fn parse_inline(text: &str) -> Vec<Node> {
    scan(text, &INLINE)
}

/// Like [`parse_inline`] without link recognition, used for link labels.
fn parse_styles(text: &str) -> Vec<Node> {
    scan(text, &STYLES)
}

fn scan(text: &str, regex: &Regex) -> Vec<Node> {
    let mut parts = Vec::new();
    let mut cursor = 0;

    for caps in regex.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > cursor {
            parts.push(Node::text(&text[cursor..whole.start()]));
        }
        parts.push(span(&caps, whole.as_str()));
        cursor = whole.end();
    }

    if cursor < text.len() {
        parts.push(Node::text(&text[cursor..]));
    }
    if parts.is_empty() {
        parts.push(Node::text(""));
    }
    parts
}

fn span(caps: &Captures<'_>, matched: &str) -> Node {
    if caps.name("bold").is_some() {
        TextRun::plain(&matched[2..matched.len() - 2]).bold().into()
    } else if caps.name("code").is_some() {
        TextRun::plain(&matched[1..matched.len() - 1]).code().into()
    } else if caps.name("italic").is_some() {
        TextRun::plain(&matched[1..matched.len() - 1]).italic().into()
    } else if caps.name("underline").is_some() {
        TextRun::plain(&matched[2..matched.len() - 2]).underline().into()
    } else {
        let label = caps.name("label").map_or("", |m| m.as_str());
        let url = caps.name("url").map_or("", |m| m.as_str());
        Block::link(url, parse_styles(label)).into()
    }
}
