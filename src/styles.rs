//! Mapping from AST node kinds to named container styles
//!
//! The mapping is fixed: headings map 1:1 by level, list items map to one
//! of three depth variants (deeper nesting reuses the deepest variant),
//! tables always use the grid style. Resolution checks the candidate name
//! against the target document's style catalog; when the catalog lacks it
//! the container default applies (None). There is no fallback chain beyond
//! that single default.

use std::collections::BTreeSet;

use crate::parser::ast::Block;

/// List nesting levels with their own named style
pub const MAX_LIST_DEPTH: usize = 3;

const BULLET_STYLES: [&str; MAX_LIST_DEPTH] =
    ["List Bullet", "List Bullet 2", "List Bullet 3"];
const NUMBER_STYLES: [&str; MAX_LIST_DEPTH] =
    ["List Number", "List Number 2", "List Number 3"];
const TABLE_STYLE: &str = "Table Grid";

/// Resolves AST node kinds to style names
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleMap;

impl StyleMap {
    pub fn new() -> Self {
        Self
    }

    /// The mapped style name for a block, before catalog lookup.
    /// Plain paragraphs and blanks map to the container default (None).
    pub fn for_block(&self, block: &Block) -> Option<String> {
        match block {
            Block::Heading { level, .. } => Some(format!("Heading {}", level)),
            Block::BulletItem { depth, .. } => {
                Some(BULLET_STYLES[(*depth).min(MAX_LIST_DEPTH - 1)].to_string())
            }
            Block::NumberedItem { depth, .. } => {
                Some(NUMBER_STYLES[(*depth).min(MAX_LIST_DEPTH - 1)].to_string())
            }
            Block::Table { .. } => Some(TABLE_STYLE.to_string()),
            Block::Paragraph { .. } | Block::Blank => None,
        }
    }

    /// Resolve a block's style against a document's style catalog. A
    /// mapped name absent from the catalog falls back to the container
    /// default.
    pub fn resolve(&self, block: &Block, catalog: &BTreeSet<String>) -> Option<String> {
        let name = self.for_block(block)?;
        if catalog.contains(&name) {
            Some(name)
        } else {
            log::debug!("style '{}' not in template catalog, using default", name);
            None
        }
    }
}
