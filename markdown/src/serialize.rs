//! Document to markdown text.

use localwrite_document::{Block, BlockKind, Document, Node, TextRun};

/// Render a document as markdown.
///
/// Top-level blocks are joined with a single newline. No trailing newline is
/// emitted.
pub fn serialize(document: &Document) -> String {
    document
        .blocks()
        .iter()
        .map(serialize_block)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wrap a run's text in the delimiters of its active styles.
///
/// Delimiters are applied inside out: backticks for `code`, then `**` for
/// `bold`, `*` for `italic` and `__` for `underline`, so every delimiter pair
/// closes before the enclosing one.
pub fn serialize_run(run: &TextRun) -> String {
    let mut out = run.text.clone();
    if run.code {
        out = format!("`{out}`");
    }
    if run.bold {
        out = format!("**{out}**");
    }
    if run.italic {
        out = format!("*{out}*");
    }
    if run.underline {
        out = format!("__{out}__");
    }
    out
}

fn serialize_node(node: &Node) -> String {
    match node {
        Node::Text(run) => serialize_run(run),
        Node::Block(block) => serialize_block(block),
    }
}

fn serialize_children(block: &Block) -> String {
    block.children.iter().map(serialize_node).collect()
}

fn serialize_block(block: &Block) -> String {
    if let Some(level) = block.kind.heading_level() {
        return format!(
            "{} {}",
            "#".repeat(usize::from(level)),
            serialize_children(block)
        );
    }

    match block.kind {
        BlockKind::BlockQuote => format!("> {}", serialize_children(block)),
        BlockKind::CheckListItem => {
            let mark = if block.is_checked() { 'x' } else { ' ' };
            format!("- [{mark}] {}", serialize_children(block))
        },
        BlockKind::ListItem => format!("- {}", serialize_children(block)),
        BlockKind::BulletedList => serialize_list(block, |_| "- ".to_string()),
        BlockKind::NumberedList => serialize_list(block, |index| format!("{}. ", index + 1)),
        BlockKind::Link => format!("[{}]({})", serialize_children(block), block.url()),
        BlockKind::Image => format!("![image]({})", block.url()),
        BlockKind::Table => serialize_table(block),
        BlockKind::TableRow => serialize_row(block),
        _ => serialize_children(block),
    }
}

fn serialize_list(list: &Block, marker: impl Fn(usize) -> String) -> String {
    list.children
        .iter()
        .enumerate()
        .map(|(index, child)| match child {
            Node::Block(item) if item.kind == BlockKind::ListItem => {
                format!("{}{}", marker(index), serialize_children(item))
            },
            other => serialize_node(other),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn cells(row: &Block) -> impl Iterator<Item = String> + '_ {
    row.children.iter().map(|cell| match cell {
        Node::Block(cell) => serialize_children(cell),
        Node::Text(run) => serialize_run(run),
    })
}

fn serialize_row(row: &Block) -> String {
    format!("| {} |", cells(row).collect::<Vec<_>>().join(" | "))
}

fn serialize_table(table: &Block) -> String {
    let rows: Vec<&Block> = table.children.iter().filter_map(Node::as_block).collect();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    for (index, row) in rows.iter().enumerate() {
        lines.push(serialize_row(row));
        if index == 0 {
            let columns = vec!["---"; row.children.len()];
            lines.push(format!("| {} |", columns.join(" | ")));
        }
    }
    lines.join("\n")
}
