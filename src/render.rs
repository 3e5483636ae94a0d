//! Container renderer: serializes AST fragments into native elements
//!
//! Emits one container element per AST block, in order. The caller splices
//! the result into an existing part at an insertion index; nothing outside
//! that index is touched.

use std::collections::BTreeSet;

use crate::document::{
    Element, Paragraph, Run, RunProps, Table, TableCell, TableRow,
};
use crate::parser::ast::{Block, Inline};
use crate::styles::StyleMap;

/// Hyperlink runs default to the conventional link color
const LINK_COLOR: &str = "0000FF";

/// Formatting inherited by substituted content
#[derive(Debug, Clone, Default)]
pub struct RenderSeed {
    /// Base run formatting for emitted inline runs
    pub props: RunProps,
    /// Host paragraph style, inherited by the first emitted block when the
    /// style mapper yields no style of its own
    pub para_style: Option<String>,
}

impl RenderSeed {
    pub fn new(props: RunProps, para_style: Option<String>) -> Self {
        Self { props, para_style }
    }
}

/// Render an AST fragment to container elements, one per block
pub fn render_fragment(
    blocks: &[Block],
    seed: &RenderSeed,
    styles: &StyleMap,
    catalog: &BTreeSet<String>,
) -> Vec<Element> {
    let mut elements = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        let mut style = styles.resolve(block, catalog);
        if i == 0 && style.is_none() {
            style = seed.para_style.clone();
        }
        elements.push(render_block(block, style, seed, styles, catalog));
    }
    elements
}

fn render_block(
    block: &Block,
    style: Option<String>,
    seed: &RenderSeed,
    styles: &StyleMap,
    catalog: &BTreeSet<String>,
) -> Element {
    match block {
        Block::Heading { spans, .. }
        | Block::Paragraph { spans }
        | Block::BulletItem { spans, .. }
        | Block::NumberedItem { spans, .. } => {
            Element::Paragraph(Paragraph::new(style, render_runs(spans, &seed.props)))
        }
        Block::Blank => Element::Paragraph(Paragraph::new(style, Vec::new())),
        Block::Table { rows } => {
            let cell_seed = RenderSeed::new(seed.props.clone(), None);
            let rows = rows
                .iter()
                .map(|row| TableRow {
                    cells: row
                        .iter()
                        .map(|cell| TableCell {
                            elements: render_fragment(
                                &cell.blocks,
                                &cell_seed,
                                styles,
                                catalog,
                            ),
                        })
                        .collect(),
                })
                .collect();
            Element::Table(Table { style, rows })
        }
    }
}

/// Render inline spans to runs, inheriting the base formatting and OR-ing
/// emphasis flags on top
pub fn render_runs(spans: &[Inline], base: &RunProps) -> Vec<Run> {
    let mut runs = Vec::new();
    walk_spans(spans, base, false, false, &mut runs);
    runs
}

fn walk_spans(
    spans: &[Inline],
    base: &RunProps,
    bold: bool,
    italic: bool,
    out: &mut Vec<Run>,
) {
    for span in spans {
        match span {
            Inline::Text(text) => {
                let mut props = base.clone();
                props.bold |= bold;
                props.italic |= italic;
                out.push(Run::new(text.clone(), props));
            }
            Inline::Bold(inner) => walk_spans(inner, base, true, italic, out),
            Inline::Italic(inner) => walk_spans(inner, base, bold, true, out),
            Inline::Link { text, url } => {
                let mut props = base.clone();
                props.bold |= bold;
                props.italic |= italic;
                props.underline = true;
                props.link = Some(url.clone());
                if props.color.is_none() {
                    props.color = Some(LINK_COLOR.to_string());
                }
                out.push(Run::new(text.clone(), props));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::parser::ast::Cell;
    use crate::parser::parse;

    fn render_default(blocks: &[Block]) -> Vec<Element> {
        render_fragment(
            blocks,
            &RenderSeed::default(),
            &StyleMap::new(),
            &Document::new().styles,
        )
    }

    #[test]
    fn test_one_element_per_block() {
        let blocks = parse("# Title\n- one\n- two");
        let elements = render_default(&blocks);
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn test_heading_style_applied() {
        let blocks = parse("## Section");
        let elements = render_default(&blocks);
        let Element::Paragraph(p) = &elements[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.style.as_deref(), Some("Heading 2"));
        assert_eq!(p.text(), "Section");
    }

    #[test]
    fn test_first_plain_block_inherits_seed_style() {
        let blocks = parse("first\nsecond");
        let seed = RenderSeed::new(RunProps::default(), Some("Quote".to_string()));
        let elements =
            render_fragment(&blocks, &seed, &StyleMap::new(), &Document::new().styles);
        let styles: Vec<Option<&str>> = elements
            .iter()
            .map(|e| match e {
                Element::Paragraph(p) => p.style.as_deref(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(styles, vec![Some("Quote"), None]);
    }

    #[test]
    fn test_heading_keeps_mapped_style_over_seed() {
        let blocks = parse("# Title");
        let seed = RenderSeed::new(RunProps::default(), Some("Quote".to_string()));
        let elements =
            render_fragment(&blocks, &seed, &StyleMap::new(), &Document::new().styles);
        let Element::Paragraph(p) = &elements[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.style.as_deref(), Some("Heading 1"));
    }

    #[test]
    fn test_emphasis_becomes_run_flags() {
        let blocks = parse("a **b *c*** d");
        let elements = render_default(&blocks);
        let Element::Paragraph(p) = &elements[0] else {
            panic!("expected paragraph");
        };
        let flags: Vec<(bool, bool)> =
            p.runs.iter().map(|r| (r.props.bold, r.props.italic)).collect();
        assert_eq!(
            flags,
            vec![(false, false), (true, false), (true, true), (false, false)]
        );
    }

    #[test]
    fn test_seed_props_inherited() {
        let seed = RenderSeed::new(
            RunProps {
                font: Some("Georgia".to_string()),
                size: Some(14),
                ..RunProps::default()
            },
            None,
        );
        let blocks = parse("**x**");
        let elements =
            render_fragment(&blocks, &seed, &StyleMap::new(), &Document::new().styles);
        let Element::Paragraph(p) = &elements[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs[0].props.font.as_deref(), Some("Georgia"));
        assert_eq!(p.runs[0].props.size, Some(14));
        assert!(p.runs[0].props.bold);
    }

    #[test]
    fn test_link_run() {
        let blocks = parse("[docs](https://example.com)");
        let elements = render_default(&blocks);
        let Element::Paragraph(p) = &elements[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.runs[0].text, "docs");
        assert_eq!(p.runs[0].props.link.as_deref(), Some("https://example.com"));
        assert!(p.runs[0].props.underline);
        assert_eq!(p.runs[0].props.color.as_deref(), Some(LINK_COLOR));
    }

    #[test]
    fn test_table_dimensions_match_ast() {
        let blocks = vec![Block::Table {
            rows: vec![
                vec![
                    Cell::paragraph(vec![Inline::text("h1")]),
                    Cell::paragraph(vec![Inline::text("h2")]),
                ],
                vec![
                    Cell::paragraph(vec![Inline::text("a")]),
                    Cell::paragraph(Vec::new()),
                ],
            ],
        }];
        let elements = render_default(&blocks);
        let Element::Table(t) = &elements[0] else {
            panic!("expected table");
        };
        assert_eq!(t.style.as_deref(), Some("Table Grid"));
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].cells.len(), 2);
        assert_eq!(t.rows[1].cells.len(), 2);
    }
}
