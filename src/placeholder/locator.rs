//! Placeholder location across fragmented runs
//!
//! Authoring tools routinely split a `{{token}}` across several runs when
//! formatting edits touch it, so matching per-run text misses tokens. The
//! scanner concatenates run text into one logical stream, keeps per-byte
//! run provenance, and recovers the minimal contiguous run range for each
//! match.

use crate::document::{Document, Element, PartId, Run, RunProps};

/// A located `{{token}}` span within one paragraph's runs
#[derive(Debug, Clone, PartialEq)]
pub struct Occurrence {
    /// Token name, surrounding whitespace trimmed
    pub token: String,
    /// Minimal contiguous run index range covering the match
    pub run_range: std::ops::Range<usize>,
    /// Byte offset of `{{` within the first run's text
    pub start_offset: usize,
    /// Byte offset just past `}}` within the last run's text
    pub end_offset: usize,
    /// Formatting snapshot of the first run, the source formatting for
    /// substitution
    pub props: RunProps,
}

/// A token found somewhere in a document, for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub part: PartId,
    pub token: String,
}

fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

fn valid_token(inner: &str) -> Option<&str> {
    let token = inner.trim();
    if !token.is_empty() && token.chars().all(is_token_char) {
        Some(token)
    } else {
        None
    }
}

/// Scan a run sequence for placeholder occurrences, in text order.
///
/// Unterminated `{{` and brace sequences that do not enclose a valid token
/// name produce no occurrence; they stay literal. A `{{{token}}}` matches
/// the innermost `{{token}}`, leaving the outer braces literal.
pub fn scan_runs(runs: &[Run]) -> Vec<Occurrence> {
    let mut text = String::new();
    let mut run_starts = Vec::with_capacity(runs.len());
    for run in runs {
        run_starts.push(text.len());
        text.push_str(&run.text);
    }

    let run_of = |byte: usize| run_starts.partition_point(|&s| s <= byte) - 1;

    let mut occurrences = Vec::new();
    let mut i = 0;
    while let Some(off) = text[i..].find("{{") {
        let open = i + off;
        let Some(close_off) = text[open + 2..].find("}}") else {
            // no closing braces anywhere after this point
            break;
        };
        let close = open + 2 + close_off;
        let Some(token) = valid_token(&text[open + 2..close]) else {
            // not a token; re-scan from the next brace so an inner
            // {{token}} of a triple-brace form still matches
            i = open + 1;
            continue;
        };

        let end = close + 2;
        let first = run_of(open);
        let last = run_of(end - 1);
        occurrences.push(Occurrence {
            token: token.to_string(),
            run_range: first..last + 1,
            start_offset: open - run_starts[first],
            end_offset: end - run_starts[last],
            props: runs[first].props.clone(),
        });
        i = end;
    }
    occurrences
}

/// Find every placeholder occurrence in every searchable part of a
/// document: body, each header, each footer, and table cells recursively.
pub fn scan_document(doc: &Document) -> Vec<Located> {
    let mut found = Vec::new();
    for (part, elements) in doc.parts() {
        scan_elements(part, elements, &mut found);
    }
    found
}

fn scan_elements(part: PartId, elements: &[Element], found: &mut Vec<Located>) {
    for element in elements {
        match element {
            Element::Paragraph(p) => {
                for occ in scan_runs(&p.runs) {
                    found.push(Located {
                        part,
                        token: occ.token,
                    });
                }
            }
            Element::Table(t) => {
                for row in &t.rows {
                    for cell in &row.cells {
                        scan_elements(part, &cell.elements, found);
                    }
                }
            }
        }
    }
}
