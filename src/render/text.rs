//! Plain text renderer implementation.

use crate::model::{Node, NodeKind};

use super::options::RenderOptions;

/// Render a flow tree to plain text with default options.
pub fn to_text(node: &Node) -> String {
    to_text_with_options(node, &RenderOptions::default())
}

/// Render a flow tree to plain text.
///
/// Each paragraph becomes one line, table rows become lines of
/// tab-separated cells and placeholders are written as `[name]`.
pub fn to_text_with_options(node: &Node, options: &RenderOptions) -> String {
    let mut output = String::new();
    render_blocks(node, options, &mut output);
    output.trim_end_matches('\n').to_string()
}

fn render_blocks(node: &Node, options: &RenderOptions, output: &mut String) {
    for child in &node.children {
        match &child.kind {
            NodeKind::Paragraph(_) => {
                let text = inline_text(child);
                if !text.is_empty() || options.include_empty_paragraphs {
                    output.push_str(&text);
                    output.push('\n');
                }
            }
            NodeKind::Table => render_table(child, output),
            NodeKind::BlockPlaceholder { name } => {
                output.push_str(&placeholder(name));
                output.push('\n');
            }
            // Tolerate inline content directly under a block container.
            _ => {
                let text = inline_text(child);
                if !text.is_empty() {
                    output.push_str(&text);
                    output.push('\n');
                }
            }
        }
    }
}

fn render_table(table: &Node, output: &mut String) {
    for row in &table.children {
        let cells: Vec<String> = row.children.iter().map(cell_text).collect();
        output.push_str(&cells.join("\t"));
        output.push('\n');
    }
}

/// Text of a cell on a single line; its blocks are joined by spaces.
fn cell_text(cell: &Node) -> String {
    let mut blocks = String::new();
    render_blocks(cell, &RenderOptions::default(), &mut blocks);
    blocks
        .lines()
        .map(|line| line.replace('\t', " "))
        .collect::<Vec<_>>()
        .join(" ")
}

fn inline_text(node: &Node) -> String {
    let mut output = String::new();
    collect_inline(node, &mut output);
    output
}

fn collect_inline(node: &Node, output: &mut String) {
    match &node.kind {
        NodeKind::Text { text } => output.push_str(text),
        NodeKind::Tab => output.push('\t'),
        NodeKind::LineBreak => output.push('\n'),
        NodeKind::InlinePlaceholder { name } => output.push_str(&placeholder(name)),
        _ => {
            for child in &node.children {
                collect_inline(child, output);
            }
        }
    }
}

fn placeholder(name: &str) -> String {
    format!("[{}]", name)
}
