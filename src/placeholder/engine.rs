//! Format-preserving placeholder substitution
//!
//! Replacement lists are computed in full before any mutation and applied
//! with one index-based splice, so earlier offsets stay valid while later
//! ones are rewritten (occurrences are processed in descending position
//! order within each paragraph). Inserted content is never re-scanned.

use std::collections::HashMap;

use crate::document::{Document, Element, Paragraph, Run};
use crate::parser::ast::Block;
use crate::render::{render_fragment, RenderSeed};
use crate::styles::StyleMap;

use super::locator::{scan_runs, Occurrence};

/// What a token is bound to for one substitution pass
#[derive(Debug, Clone)]
pub enum Replacement {
    /// Plain text, inserted as a single run carrying the occurrence's
    /// captured formatting
    Text(String),
    /// An AST fragment, expanded into sibling blocks at the occurrence
    Blocks(Vec<Block>),
}

pub type Bindings = HashMap<String, Replacement>;

/// Substitute every bound placeholder in every part of the document.
/// Unknown tokens stay literal; content outside placeholder ranges is
/// never altered.
pub fn substitute(doc: &mut Document, bindings: &Bindings, styles: &StyleMap) {
    let catalog = doc.styles.clone();
    for (_part, elements) in doc.parts_mut() {
        substitute_elements(elements, bindings, styles, &catalog);
    }
}

fn substitute_elements(
    elements: &mut Vec<Element>,
    bindings: &Bindings,
    styles: &StyleMap,
    catalog: &std::collections::BTreeSet<String>,
) {
    let mut i = 0;
    while i < elements.len() {
        match &mut elements[i] {
            Element::Table(table) => {
                for row in &mut table.rows {
                    for cell in &mut row.cells {
                        substitute_elements(&mut cell.elements, bindings, styles, catalog);
                    }
                }
                i += 1;
            }
            Element::Paragraph(paragraph) => {
                match expand_paragraph(paragraph, bindings, styles, catalog) {
                    Some(expansion) => {
                        let inserted = expansion.len();
                        elements.splice(i..=i, expansion);
                        i += inserted;
                    }
                    None => i += 1,
                }
            }
        }
    }
}

/// Substitute within one paragraph. Text bindings are rewritten in place;
/// returns a sibling-block expansion when any occurrence is block-valued
/// (the host paragraph splits into before / rendered blocks / after).
fn expand_paragraph(
    paragraph: &mut Paragraph,
    bindings: &Bindings,
    styles: &StyleMap,
    catalog: &std::collections::BTreeSet<String>,
) -> Option<Vec<Element>> {
    // One scan over the original runs; occurrences are dispatched from
    // this snapshot so values spliced in are never located themselves
    let occurrences: Vec<Occurrence> = scan_runs(&paragraph.runs)
        .into_iter()
        .filter(|occ| bindings.contains_key(&occ.token))
        .collect();
    if occurrences.is_empty() {
        return None;
    }

    // Descending position order keeps earlier offsets valid: each splice
    // or split only touches runs at or after its own occurrence
    let mut tail: Vec<Element> = Vec::new();
    let mut split = false;
    for occ in occurrences.iter().rev() {
        match bindings.get(&occ.token) {
            Some(Replacement::Text(value)) => splice_text(paragraph, occ, value),
            Some(Replacement::Blocks(blocks)) => {
                split = true;

                // Detach everything after the occurrence, keeping the
                // partial last run's own formatting
                let last = occ.run_range.end - 1;
                let suffix_text = paragraph.runs[last].text[occ.end_offset..].to_string();
                let last_props = paragraph.runs[last].props.clone();
                let mut after_runs = paragraph.runs.split_off(occ.run_range.end);
                if !suffix_text.is_empty() {
                    after_runs.insert(0, Run::new(suffix_text, last_props));
                }

                // Truncate to the text before the occurrence
                let first = occ.run_range.start;
                let prefix_text = paragraph.runs[first].text[..occ.start_offset].to_string();
                let first_props = paragraph.runs[first].props.clone();
                paragraph.runs.truncate(first);
                if !prefix_text.is_empty() {
                    paragraph.runs.push(Run::new(prefix_text, first_props));
                }

                let seed = RenderSeed::new(occ.props.clone(), paragraph.style.clone());
                let mut rendered = render_fragment(blocks, &seed, styles, catalog);
                if !after_runs.is_empty() {
                    rendered.push(Element::Paragraph(Paragraph::new(
                        paragraph.style.clone(),
                        after_runs,
                    )));
                }
                rendered.append(&mut tail);
                tail = rendered;
            }
            None => {}
        }
    }

    if !split {
        // only in-place text splices happened
        return None;
    }

    let mut expansion = Vec::new();
    if !paragraph.runs.is_empty() {
        expansion.push(Element::Paragraph(paragraph.clone()));
    }
    expansion.extend(tail);
    Some(expansion)
}

/// Replace a located occurrence with a plain-text run carrying the
/// captured source formatting. Partial first/last runs keep their own
/// formatting.
fn splice_text(paragraph: &mut Paragraph, occ: &Occurrence, value: &str) {
    let first = occ.run_range.start;
    let last = occ.run_range.end - 1;
    let prefix = paragraph.runs[first].text[..occ.start_offset].to_string();
    let prefix_props = paragraph.runs[first].props.clone();
    let suffix = paragraph.runs[last].text[occ.end_offset..].to_string();
    let suffix_props = paragraph.runs[last].props.clone();

    let mut replacement = Vec::with_capacity(3);
    if !prefix.is_empty() {
        replacement.push(Run::new(prefix, prefix_props));
    }
    if !value.is_empty() {
        replacement.push(Run::new(value, occ.props.clone()));
    }
    if !suffix.is_empty() {
        replacement.push(Run::new(suffix, suffix_props));
    }
    paragraph.runs.splice(occ.run_range.clone(), replacement);
}

/// Convenience: bind plain string values, promoting any value containing
/// block markup (or multiple lines) to an AST fragment.
pub fn bindings_from_strings<'a, I>(values: I) -> Bindings
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    values
        .into_iter()
        .map(|(token, value)| {
            let replacement = if crate::parser::contains_block_markup(value) {
                Replacement::Blocks(crate::parser::parse(value))
            } else {
                Replacement::Text(value.to_string())
            };
            (token.to_string(), replacement)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::RunProps;

    fn para(runs: Vec<Run>) -> Paragraph {
        Paragraph::new(None, runs)
    }

    fn text_bindings(pairs: &[(&str, &str)]) -> Bindings {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Replacement::Text(v.to_string())))
            .collect()
    }

    fn doc_with_body(paragraph: Paragraph) -> Document {
        let mut doc = Document::new();
        doc.body.push(Element::Paragraph(paragraph));
        doc
    }

    #[test]
    fn test_plain_text_substitution() {
        let mut doc = doc_with_body(para(vec![Run::plain("Hello {{name}}, total: {{amount}}")]));
        let bindings = text_bindings(&[("name", "Ana"), ("amount", "42")]);
        substitute(&mut doc, &bindings, &StyleMap::new());
        assert_eq!(doc.visible_text(), "Hello Ana, total: 42");
    }

    #[test]
    fn test_substituted_run_carries_source_formatting() {
        let mut styled = Run::plain("{{name}}");
        styled.props.font = Some("Georgia".to_string());
        styled.props.size = Some(11);
        let mut doc = doc_with_body(para(vec![Run::plain("Hello "), styled]));
        substitute(
            &mut doc,
            &text_bindings(&[("name", "Ana")]),
            &StyleMap::new(),
        );
        let Element::Paragraph(p) = &doc.body[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.text(), "Hello Ana");
        let ana = p.runs.iter().find(|r| r.text == "Ana").unwrap();
        assert_eq!(ana.props.font.as_deref(), Some("Georgia"));
        assert_eq!(ana.props.size, Some(11));
    }

    #[test]
    fn test_adjacent_text_keeps_its_own_formatting() {
        let mut bold = Run::plain("bold ");
        bold.props.bold = true;
        let mut doc = doc_with_body(para(vec![
            bold,
            Run::plain("{{x}}"),
            Run::new(
                " tail",
                RunProps {
                    italic: true,
                    ..RunProps::default()
                },
            ),
        ]));
        substitute(&mut doc, &text_bindings(&[("x", "mid")]), &StyleMap::new());
        let Element::Paragraph(p) = &doc.body[0] else {
            panic!("expected paragraph");
        };
        assert_eq!(p.text(), "bold mid tail");
        assert!(p.runs[0].props.bold);
        assert!(!p.runs[1].props.bold);
        assert!(p.runs[2].props.italic);
    }

    #[test]
    fn test_split_token_substitution() {
        let mut doc = doc_with_body(para(vec![
            Run::plain("Hi "),
            Run::plain("{{na"),
            Run::plain("me}}"),
            Run::plain("!"),
        ]));
        substitute(&mut doc, &text_bindings(&[("name", "Bo")]), &StyleMap::new());
        assert_eq!(doc.visible_text(), "Hi Bo!");
    }

    #[test]
    fn test_unknown_token_left_literal() {
        let mut doc = doc_with_body(para(vec![Run::plain("keep {{unknown}} here")]));
        substitute(&mut doc, &text_bindings(&[("other", "x")]), &StyleMap::new());
        assert_eq!(doc.visible_text(), "keep {{unknown}} here");
    }

    #[test]
    fn test_unterminated_token_left_literal() {
        let mut doc = doc_with_body(para(vec![Run::plain("broken {{name here")]));
        substitute(&mut doc, &text_bindings(&[("name", "x")]), &StyleMap::new());
        assert_eq!(doc.visible_text(), "broken {{name here");
    }

    #[test]
    fn test_empty_value_removes_token() {
        let mut doc = doc_with_body(para(vec![Run::plain("a{{x}}b")]));
        substitute(&mut doc, &text_bindings(&[("x", "")]), &StyleMap::new());
        assert_eq!(doc.visible_text(), "ab");
    }

    #[test]
    fn test_block_expansion_replaces_paragraph_with_siblings() {
        let mut doc = doc_with_body(para(vec![Run::plain("{{body}}")]));
        doc.body.push(Element::Paragraph(para(vec![Run::plain("after")])));
        let mut bindings = Bindings::new();
        bindings.insert(
            "body".to_string(),
            Replacement::Blocks(crate::parser::parse("# Title\n- one\n- two")),
        );
        substitute(&mut doc, &bindings, &StyleMap::new());

        assert_eq!(doc.body.len(), 4);
        let styles: Vec<Option<&str>> = doc
            .body
            .iter()
            .map(|e| match e {
                Element::Paragraph(p) => p.style.as_deref(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(
            styles,
            vec![Some("Heading 1"), Some("List Bullet"), Some("List Bullet"), None]
        );
        assert_eq!(doc.visible_text(), "Title\none\ntwo\nafter");
    }

    #[test]
    fn test_block_expansion_keeps_surrounding_text() {
        let mut doc = doc_with_body(para(vec![Run::plain("before {{body}} after")]));
        let mut bindings = Bindings::new();
        bindings.insert(
            "body".to_string(),
            Replacement::Blocks(crate::parser::parse("- item")),
        );
        substitute(&mut doc, &bindings, &StyleMap::new());
        assert_eq!(doc.visible_text(), "before \nitem\n after");
    }

    #[test]
    fn test_block_expansion_inherits_host_style_for_plain_first_block() {
        let mut doc = Document::new();
        doc.styles.insert("Quote".to_string());
        doc.body.push(Element::Paragraph(Paragraph::new(
            Some("Quote".to_string()),
            vec![Run::plain("{{body}}")],
        )));
        let mut bindings = Bindings::new();
        bindings.insert(
            "body".to_string(),
            Replacement::Blocks(crate::parser::parse("plain\nsecond")),
        );
        substitute(&mut doc, &bindings, &StyleMap::new());
        let styles: Vec<Option<&str>> = doc
            .body
            .iter()
            .map(|e| match e {
                Element::Paragraph(p) => p.style.as_deref(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(styles, vec![Some("Quote"), None]);
    }

    #[test]
    fn test_substitution_reaches_headers_footers_and_cells() {
        use crate::document::{Table, TableCell, TableRow};
        let mut doc = Document::new();
        doc.headers
            .push(vec![Element::Paragraph(para(vec![Run::plain("{{h}}")]))]);
        doc.footers
            .push(vec![Element::Paragraph(para(vec![Run::plain("{{f}}")]))]);
        doc.body.push(Element::Table(Table {
            style: None,
            rows: vec![TableRow {
                cells: vec![TableCell {
                    elements: vec![Element::Paragraph(para(vec![Run::plain("{{c}}")]))],
                }],
            }],
        }));
        let bindings = text_bindings(&[("h", "H"), ("f", "F"), ("c", "C")]);
        substitute(&mut doc, &bindings, &StyleMap::new());
        assert_eq!(crate::document::part_text(&doc.headers[0]), "H");
        assert_eq!(crate::document::part_text(&doc.footers[0]), "F");
        assert_eq!(doc.visible_text(), "C");
    }

    #[test]
    fn test_inserted_text_is_not_rescanned() {
        let mut doc = doc_with_body(para(vec![Run::plain("{{a}}")]));
        let bindings = text_bindings(&[("a", "{{b}}"), ("b", "never")]);
        substitute(&mut doc, &bindings, &StyleMap::new());
        assert_eq!(doc.visible_text(), "{{b}}");
    }

    #[test]
    fn test_text_value_cannot_introduce_block_expansion() {
        // a text value naming a block-bound token must stay literal
        let mut doc = doc_with_body(para(vec![Run::plain("{{a}}")]));
        let mut bindings = Bindings::new();
        bindings.insert("a".to_string(), Replacement::Text("{{b}}".to_string()));
        bindings.insert(
            "b".to_string(),
            Replacement::Blocks(crate::parser::parse("# Injected\n- one")),
        );
        substitute(&mut doc, &bindings, &StyleMap::new());
        assert_eq!(doc.body.len(), 1);
        assert_eq!(doc.visible_text(), "{{b}}");
    }

    #[test]
    fn test_text_and_block_bindings_in_one_paragraph() {
        let mut doc = doc_with_body(para(vec![Run::plain("{{name}} intro {{body}} end")]));
        let mut bindings = Bindings::new();
        bindings.insert("name".to_string(), Replacement::Text("Ana".to_string()));
        bindings.insert(
            "body".to_string(),
            Replacement::Blocks(crate::parser::parse("- item")),
        );
        substitute(&mut doc, &bindings, &StyleMap::new());
        assert_eq!(doc.visible_text(), "Ana intro \nitem\n end");
    }

    #[test]
    fn test_bindings_from_strings_promotes_block_markup() {
        let bindings =
            bindings_from_strings([("plain", "Ana"), ("md", "# Title\n- one")]);
        assert!(matches!(bindings.get("plain"), Some(Replacement::Text(_))));
        assert!(matches!(bindings.get("md"), Some(Replacement::Blocks(_))));
    }
}
