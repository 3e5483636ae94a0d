//! Abstract syntax tree for the lightweight markup language

/// Maximum heading level the container format defines styles for
pub const MAX_HEADING_LEVEL: u8 = 6;

/// A block-level node in parsed markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// ATX heading: `# Title` .. `###### Title`, level in 1..=6
    Heading { level: u8, spans: Vec<Inline> },
    /// Plain paragraph of inline spans
    Paragraph { spans: Vec<Inline> },
    /// Unordered list item, depth counted from 0
    BulletItem { depth: usize, spans: Vec<Inline> },
    /// Ordered list item, depth counted from 0
    NumberedItem { depth: usize, spans: Vec<Inline> },
    /// Pipe-delimited table; every row has the same cell count by
    /// construction (short rows are padded during parsing)
    Table { rows: Vec<Vec<Cell>> },
    /// Blank source line
    Blank,
}

/// A table cell: an ordered sequence of block nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub blocks: Vec<Block>,
}

impl Cell {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Cell holding a single paragraph of spans
    pub fn paragraph(spans: Vec<Inline>) -> Self {
        Self {
            blocks: vec![Block::Paragraph { spans }],
        }
    }
}

/// An inline span within a block. Spans nest (tree, never a graph).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Bold(Vec<Inline>),
    Italic(Vec<Inline>),
    Link { text: String, url: String },
}

impl Inline {
    pub fn text(s: impl Into<String>) -> Self {
        Inline::Text(s.into())
    }
}

impl Block {
    /// Visible text of this block, inline formatting stripped
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { spans, .. }
            | Block::Paragraph { spans }
            | Block::BulletItem { spans, .. }
            | Block::NumberedItem { spans, .. } => spans_text(spans),
            Block::Table { rows } => rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| {
                            cell.blocks
                                .iter()
                                .map(|b| b.plain_text())
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .collect::<Vec<_>>()
                        .join(" | ")
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Block::Blank => String::new(),
        }
    }
}

/// Visible text of a span sequence
pub fn spans_text(spans: &[Inline]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Inline::Text(s) => out.push_str(s),
            Inline::Bold(inner) | Inline::Italic(inner) => out.push_str(&spans_text(inner)),
            Inline::Link { text, .. } => out.push_str(text),
        }
    }
    out
}

/// Render an AST back to markup text.
///
/// Parsing the result reproduces a semantically equal AST; the bytes are
/// not guaranteed to match the original input.
pub fn to_markup(blocks: &[Block]) -> String {
    let mut lines = Vec::new();
    for block in blocks {
        match block {
            Block::Heading { level, spans } => {
                lines.push(format!(
                    "{} {}",
                    "#".repeat(*level as usize),
                    spans_markup(spans)
                ));
            }
            Block::Paragraph { spans } => lines.push(spans_markup(spans)),
            Block::BulletItem { depth, spans } => {
                lines.push(format!("{}- {}", "   ".repeat(*depth), spans_markup(spans)));
            }
            Block::NumberedItem { depth, spans } => {
                lines.push(format!(
                    "{}1. {}",
                    "   ".repeat(*depth),
                    spans_markup(spans)
                ));
            }
            Block::Table { rows } => {
                for (i, row) in rows.iter().enumerate() {
                    let cells: Vec<String> = row.iter().map(cell_markup).collect();
                    lines.push(format!("| {} |", cells.join(" | ")));
                    if i == 0 {
                        let dashes: Vec<&str> = row.iter().map(|_| "---").collect();
                        lines.push(format!("| {} |", dashes.join(" | ")));
                    }
                }
            }
            Block::Blank => lines.push(String::new()),
        }
    }
    lines.join("\n")
}

fn cell_markup(cell: &Cell) -> String {
    cell.blocks
        .iter()
        .map(|b| match b {
            Block::Paragraph { spans } => spans_markup(spans),
            other => other.plain_text(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn spans_markup(spans: &[Inline]) -> String {
    let mut out = String::new();
    for span in spans {
        match span {
            Inline::Text(s) => out.push_str(s),
            Inline::Bold(inner) => {
                out.push_str("**");
                out.push_str(&spans_markup(inner));
                out.push_str("**");
            }
            Inline::Italic(inner) => {
                out.push('*');
                out.push_str(&spans_markup(inner));
                out.push('*');
            }
            Inline::Link { text, url } => {
                out.push_str(&format!("[{}]({})", text, url));
            }
        }
    }
    out
}
