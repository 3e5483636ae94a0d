//! In-memory container document model with a JSON on-disk form
//!
//! A document is a set of parts (one body, any number of headers and
//! footers), each an ordered list of elements. Paragraphs hold runs, the
//! smallest unit of uniformly formatted text; tables hold cells whose
//! content is itself a list of elements, so tables nest.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reading or writing a container document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read document: {0}")]
    Io(#[from] io::Error),

    #[error("invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Formatting attributes of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunProps {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Hyperlink target; the run text is the display text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// The smallest unit of uniformly formatted text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default, skip_serializing_if = "RunProps::is_default")]
    pub props: RunProps,
}

impl RunProps {
    fn is_default(&self) -> bool {
        *self == RunProps::default()
    }
}

impl Run {
    pub fn new(text: impl Into<String>, props: RunProps) -> Self {
        Self {
            text: text.into(),
            props,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, RunProps::default())
    }
}

/// A styled paragraph of runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Named paragraph style; None means the container default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(style: Option<String>, runs: Vec<Run>) -> Self {
        Self { style, runs }
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// A table cell: elements, recursively
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    #[serde(default)]
    pub elements: Vec<Element>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
}

/// A block-level element within a part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    Paragraph(Paragraph),
    Table(Table),
}

/// Identifies one searchable part of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartId {
    Body,
    Header(usize),
    Footer(usize),
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartId::Body => write!(f, "body"),
            PartId::Header(i) => write!(f, "header[{}]", i),
            PartId::Footer(i) => write!(f, "footer[{}]", i),
        }
    }
}

/// A multi-part container document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Paragraph style names this template defines
    #[serde(default)]
    pub styles: BTreeSet<String>,
    #[serde(default)]
    pub body: Vec<Element>,
    #[serde(default)]
    pub headers: Vec<Vec<Element>>,
    #[serde(default)]
    pub footers: Vec<Vec<Element>>,
}

/// Style names every fresh document carries
const DEFAULT_STYLES: &[&str] = &[
    "Normal",
    "Heading 1",
    "Heading 2",
    "Heading 3",
    "Heading 4",
    "Heading 5",
    "Heading 6",
    "List Bullet",
    "List Bullet 2",
    "List Bullet 3",
    "List Number",
    "List Number 2",
    "List Number 3",
    "Table Grid",
];

impl Document {
    /// Empty document with the built-in style catalog
    pub fn new() -> Self {
        Self {
            styles: DEFAULT_STYLES.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn has_style(&self, name: &str) -> bool {
        self.styles.contains(name)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, DocumentError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        Self::from_json(&fs::read(path)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Atomic save: write a sibling temporary file, then rename into place
    /// so a cancelled or failed write never leaves a partial document.
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        write_atomic(path, &self.to_json()?)?;
        Ok(())
    }

    /// All parts in a fixed order: body, headers, footers
    pub fn parts(&self) -> Vec<(PartId, &Vec<Element>)> {
        let mut parts = vec![(PartId::Body, &self.body)];
        parts.extend(
            self.headers
                .iter()
                .enumerate()
                .map(|(i, p)| (PartId::Header(i), p)),
        );
        parts.extend(
            self.footers
                .iter()
                .enumerate()
                .map(|(i, p)| (PartId::Footer(i), p)),
        );
        parts
    }

    /// Mutable view of every part, each visited exactly once
    pub fn parts_mut(&mut self) -> Vec<(PartId, &mut Vec<Element>)> {
        let mut parts = vec![(PartId::Body, &mut self.body)];
        parts.extend(
            self.headers
                .iter_mut()
                .enumerate()
                .map(|(i, p)| (PartId::Header(i), p)),
        );
        parts.extend(
            self.footers
                .iter_mut()
                .enumerate()
                .map(|(i, p)| (PartId::Footer(i), p)),
        );
        parts
    }

    /// Visible body text, one line per paragraph / table row
    pub fn visible_text(&self) -> String {
        part_text(&self.body)
    }
}

/// Visible text of a part, one line per paragraph and table row
pub fn part_text(part: &[Element]) -> String {
    let mut lines = Vec::new();
    collect_text(part, &mut lines);
    lines.join("\n")
}

fn collect_text(elements: &[Element], lines: &mut Vec<String>) {
    for element in elements {
        match element {
            Element::Paragraph(p) => lines.push(p.text()),
            Element::Table(t) => {
                for row in &t.rows {
                    let cells: Vec<String> =
                        row.cells.iter().map(|c| part_text(&c.elements)).collect();
                    lines.push(cells.join(" | "));
                }
            }
        }
    }
}

/// Write bytes to `path` via a sibling temporary file and a rename; a
/// cancelled or failed write never leaves a partial file at `path`.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Insert `elements` into `part` at `at`, shifting later elements right.
/// `at == part.len()` appends. Content outside the insertion point is
/// untouched.
pub fn insert_at(part: &mut Vec<Element>, at: usize, elements: Vec<Element>) {
    let at = at.min(part.len());
    part.splice(at..at, elements);
}
