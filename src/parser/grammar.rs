//! Line-oriented markup parser
//!
//! Total by design: there is no error path. Constructs that do not match a
//! block rule degrade to plain paragraphs, and unterminated inline markers
//! stay literal text.

use super::ast::{Block, Cell, Inline, MAX_HEADING_LEVEL};
use super::lexer::{lex, InlineToken};

/// Spaces of indentation per list nesting level
const INDENT_PER_LEVEL: usize = 3;

/// Parse markup source into an ordered block sequence
pub fn parse(source: &str) -> Vec<Block> {
    let lines: Vec<&str> = source.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        let stripped = line.trim();

        if stripped.is_empty() {
            blocks.push(Block::Blank);
            i += 1;
            continue;
        }

        if let Some((level, rest)) = heading(stripped) {
            blocks.push(Block::Heading {
                level,
                spans: parse_inlines(rest),
            });
            i += 1;
            continue;
        }

        if is_table_line(stripped) {
            if let Some((table, next)) = parse_table(&lines, i) {
                blocks.push(table);
                i = next;
                continue;
            }
            // a lone pipe line is not a table; fall through to paragraph
        }

        if let Some(rest) = bullet_item(stripped) {
            blocks.push(Block::BulletItem {
                depth: indent_depth(line),
                spans: parse_inlines(rest),
            });
            i += 1;
            continue;
        }

        if let Some(rest) = numbered_item(stripped) {
            blocks.push(Block::NumberedItem {
                depth: indent_depth(line),
                spans: parse_inlines(rest),
            });
            i += 1;
            continue;
        }

        blocks.push(Block::Paragraph {
            spans: parse_inlines(stripped),
        });
        i += 1;
    }

    blocks
}

/// True if any line of `value` is block-level markup (heading, list item,
/// or table row) or the value spans multiple lines. Used to decide whether
/// an argument value needs block rendering or a plain text splice.
pub fn contains_block_markup(value: &str) -> bool {
    if value.contains('\n') {
        return true;
    }
    let stripped = value.trim();
    heading(stripped).is_some()
        || bullet_item(stripped).is_some()
        || numbered_item(stripped).is_some()
        || is_table_line(stripped)
}

fn heading(stripped: &str) -> Option<(u8, &str)> {
    let hashes = stripped.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > MAX_HEADING_LEVEL as usize {
        return None;
    }
    let rest = stripped[hashes..].strip_prefix(char::is_whitespace)?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }
    Some((hashes as u8, rest))
}

fn bullet_item(stripped: &str) -> Option<&str> {
    let rest = stripped
        .strip_prefix('-')
        .or_else(|| stripped.strip_prefix('*'))
        .or_else(|| stripped.strip_prefix('+'))?;
    let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}

fn numbered_item(stripped: &str) -> Option<&str> {
    let digits = stripped.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = stripped[digits..].strip_prefix('.')?;
    let rest = rest.strip_prefix(char::is_whitespace)?.trim_start();
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}

fn indent_depth(line: &str) -> usize {
    let indent = line.len() - line.trim_start().len();
    indent / INDENT_PER_LEVEL
}

fn is_table_line(stripped: &str) -> bool {
    stripped.len() >= 2 && stripped.starts_with('|') && stripped.ends_with('|')
}

fn is_separator_line(stripped: &str) -> bool {
    stripped.contains("---")
        || stripped.contains(":-:")
        || stripped.contains(":--")
        || stripped.contains("--:")
}

/// Parse a pipe-delimited table block starting at `start`. Returns the
/// table and the index of the first line after it, or None when fewer than
/// two table lines are present.
fn parse_table(lines: &[&str], start: usize) -> Option<(Block, usize)> {
    let mut end = start;
    while end < lines.len() && is_table_line(lines[end].trim()) {
        end += 1;
    }
    if end - start < 2 {
        return None;
    }

    let mut rows: Vec<Vec<Cell>> = Vec::new();
    for line in &lines[start..end] {
        let stripped = line.trim();
        if is_separator_line(stripped) {
            continue;
        }
        let inner = &stripped[1..stripped.len() - 1];
        let cells: Vec<Cell> = inner
            .split('|')
            .map(|cell| Cell::paragraph(parse_inlines(cell.trim())))
            .collect();
        rows.push(cells);
    }

    // Pad short rows so every row has the widest row's cell count
    let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    for row in &mut rows {
        while row.len() < cols {
            row.push(Cell::paragraph(Vec::new()));
        }
    }

    Some((Block::Table { rows }, end))
}

/// Parse inline markup in a single line of text
pub fn parse_inlines(text: &str) -> Vec<Inline> {
    parse_span_seq(&lex(text))
}

fn parse_span_seq(tokens: &[InlineToken]) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            InlineToken::Text(s) => push_text(&mut out, s),
            InlineToken::Escaped(s) => push_text(&mut out, s),
            InlineToken::Bracket => push_text(&mut out, "["),
            InlineToken::Backslash => push_text(&mut out, "\\"),
            InlineToken::Link((text, url)) => out.push(Inline::Link {
                text: text.clone(),
                url: url.clone(),
            }),
            marker @ (InlineToken::TripleStar
            | InlineToken::DoubleStar
            | InlineToken::Star) => {
                match find_marker(&tokens[i + 1..], marker) {
                    Some(offset) => {
                        let inner = parse_span_seq(&tokens[i + 1..i + 1 + offset]);
                        out.push(wrap_emphasis(marker, inner));
                        i += offset + 2;
                        continue;
                    }
                    // unterminated marker stays literal
                    None => push_text(&mut out, marker_text(marker)),
                }
            }
        }
        i += 1;
    }

    out
}

fn find_marker(tokens: &[InlineToken], marker: &InlineToken) -> Option<usize> {
    tokens.iter().position(|t| t == marker)
}

fn wrap_emphasis(marker: &InlineToken, inner: Vec<Inline>) -> Inline {
    match marker {
        InlineToken::TripleStar => Inline::Bold(vec![Inline::Italic(inner)]),
        InlineToken::DoubleStar => Inline::Bold(inner),
        _ => Inline::Italic(inner),
    }
}

fn marker_text(marker: &InlineToken) -> &'static str {
    match marker {
        InlineToken::TripleStar => "***",
        InlineToken::DoubleStar => "**",
        _ => "*",
    }
}

fn push_text(out: &mut Vec<Inline>, s: &str) {
    if let Some(Inline::Text(last)) = out.last_mut() {
        last.push_str(s);
    } else {
        out.push(Inline::Text(s.to_string()));
    }
}
