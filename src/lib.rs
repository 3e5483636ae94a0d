//! Docweave - markup templating for container documents
//!
//! The pipeline has three layers: a total markup parser producing a block
//! AST, a renderer mapping that AST onto container document elements with
//! named styles, and a placeholder engine that locates `{{token}}` spans
//! across fragmented runs and substitutes them while preserving the
//! surrounding formatting. On top sits a declarative template registry
//! that turns TOML descriptors into invocable rendering tools.
//!
//! # Example
//!
//! ```rust
//! use docweave::render_markup;
//!
//! let doc = render_markup("# Title\n\nHello **world**");
//! assert_eq!(doc.visible_text(), "Title\n\nHello world");
//! ```

pub mod document;
pub mod error;
pub mod parser;
pub mod placeholder;
pub mod render;
pub mod styles;
pub mod template;

pub use document::{Document, DocumentError, Element, Paragraph, Run, RunProps};
pub use error::InvokeError;
pub use parser::{contains_block_markup, parse};
pub use placeholder::{bindings_from_strings, scan_document, substitute, Bindings, Replacement};
pub use render::{render_fragment, RenderSeed};
pub use styles::StyleMap;
pub use template::{Rendered, RenderedTool, TemplateDescriptor, TemplateRegistry};

/// Render markup source into a fresh document with the default style
/// catalog. The main entry point for standalone conversion; templated
/// rendering goes through [`TemplateRegistry`] instead.
pub fn render_markup(source: &str) -> Document {
    let mut doc = Document::new();
    let blocks = parse(source);
    let catalog = doc.styles.clone();
    let elements = render_fragment(&blocks, &RenderSeed::default(), &StyleMap::new(), &catalog);
    document::insert_at(&mut doc.body, 0, elements);
    doc
}
