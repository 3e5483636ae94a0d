//! Inline markup lexer using logos
//!
//! Tokenizes a single line of markup into emphasis markers, link tokens,
//! backslash escapes, and literal text. Block structure (headings, lists,
//! tables) is line-oriented and handled in `grammar`, not here.

use logos::Logos;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum InlineToken {
    /// `***` bold-italic marker
    #[token("***")]
    TripleStar,

    /// `**` bold marker
    #[token("**")]
    DoubleStar,

    /// `*` italic marker
    #[token("*")]
    Star,

    /// Whole `[text](url)` link, split into (text, url)
    #[regex(r"\[[^\]\n]*\]\([^)\n]*\)", |lex| split_link(lex.slice()))]
    Link((String, String)),

    /// Backslash-escaped character, yielded as its literal form so escaped
    /// markers (`\*`) are never treated as emphasis
    #[regex(r"\\.", |lex| lex.slice()[1..].to_string())]
    Escaped(String),

    /// `[` that did not open a well-formed link
    #[token("[")]
    Bracket,

    /// Trailing backslash with nothing to escape
    #[token("\\")]
    Backslash,

    /// Literal text between markers
    #[regex(r"[^*\[\\]+", |lex| lex.slice().to_string())]
    Text(String),
}

fn split_link(slice: &str) -> Option<(String, String)> {
    // slice is "[text](url)"; the regex guarantees both delimiters exist
    let inner = &slice[1..slice.len() - 1];
    let split = inner.find("](")?;
    Some((inner[..split].to_string(), inner[split + 2..].to_string()))
}

/// Lex a line into inline tokens. Total: unmatched input degrades to text.
pub fn lex(input: &str) -> Vec<InlineToken> {
    let mut tokens = Vec::new();
    for (result, span) in InlineToken::lexer(input).spanned() {
        match result {
            Ok(tok) => tokens.push(tok),
            Err(()) => tokens.push(InlineToken::Text(input[span].to_string())),
        }
    }
    tokens
}
