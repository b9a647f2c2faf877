//! # Lexer - Tokenizing Markdown Source
//!
//! This module breaks source text into tokens using the [Logos] lexer
//! generator. It is used in two places: filling the gaps between block
//! productions while the tree is assembled, and producing the token stream
//! that the inline parsers in [`crate::sequential`] work on.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! **Every byte in the lexed range appears in exactly one token.** Unknown
//! bytes become `TEXT`, nothing is skipped:
//!
//! ```
//! use markdown_tree_syntax::lexer::lex;
//!
//! let input = "# Hello, *world*!\n";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| &input[t.range.clone()]).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Ranges, not slices
//!
//! Tokens carry absolute byte ranges into the full document even when only a
//! sub-range is lexed ([`lex_range`]). This lets an inline subtree built for
//! one paragraph refer back to the original text without re-basing offsets.

use std::ops::Range;

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// Each variant maps to a corresponding `SyntaxKind` token. Context-dependent
/// kinds such as `QUOTE_MARKER` or `LIST_BULLET` never come out of the lexer,
/// the block processor and the tokens cache assign them.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF or CRLF)
    #[regex(r"\r?\n")]
    Eol,

    #[token(">")]
    Gt,

    #[token("<")]
    Lt,

    #[token("*")]
    Star,

    #[token("_")]
    Underscore,

    /// A whole run of backticks, so code span delimiters compare by length
    #[regex(r"`+")]
    Backtick,

    #[token("~")]
    Tilde,

    #[token("#")]
    Hash,

    #[token("-")]
    Dash,

    #[token("+")]
    Plus,

    #[token("!")]
    Exclamation,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("\"")]
    DoubleQuote,

    /// `\*`, `\[` and friends
    #[regex(r"\\[!-/:-@\[-`{-~]")]
    EscapedChar,

    /// `&amp;`, `&#123;`, `&#x1F;`
    #[regex(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")]
    Entity,

    /// A lone `&` that does not start an entity
    #[token("&")]
    Ampersand,

    /// A lone backslash
    #[token("\\")]
    Backslash,

    /// Plain text - anything not matched by other rules
    #[regex(r#"[^ \t\r\n\[\]()<>`*_~#+!"&\\-]+"#)]
    Text,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITE_SPACE,
            TokenKind::Eol => SyntaxKind::EOL,
            TokenKind::Gt => SyntaxKind::GT,
            TokenKind::Lt => SyntaxKind::LT,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Underscore => SyntaxKind::UNDERSCORE,
            TokenKind::Backtick => SyntaxKind::BACKTICK,
            TokenKind::Tilde => SyntaxKind::TILDE,
            TokenKind::Hash => SyntaxKind::HASH,
            TokenKind::Dash => SyntaxKind::DASH,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Exclamation => SyntaxKind::EXCLAMATION_MARK,
            TokenKind::LBracket => SyntaxKind::LBRACKET,
            TokenKind::RBracket => SyntaxKind::RBRACKET,
            TokenKind::LParen => SyntaxKind::LPAREN,
            TokenKind::RParen => SyntaxKind::RPAREN,
            TokenKind::DoubleQuote => SyntaxKind::DOUBLE_QUOTE,
            TokenKind::EscapedChar => SyntaxKind::ESCAPED_CHAR,
            TokenKind::Entity => SyntaxKind::ENTITY,
            TokenKind::Ampersand | TokenKind::Backslash | TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and absolute byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexedToken {
    pub kind: SyntaxKind,
    pub range: Range<usize>,
}

impl LexedToken {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range.clone()]
    }
}

/// Lex the whole input.
pub fn lex(input: &str) -> Vec<LexedToken> {
    lex_range(input, 0..input.len())
}

/// Lex `text[range]`, reporting ranges relative to the start of `text`.
///
/// Guarantees that the returned ranges tile `range` exactly.
pub fn lex_range(text: &str, range: Range<usize>) -> Vec<LexedToken> {
    let base = range.start;
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(&text[range]);

    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            // Logos error means unrecognized character - treat as TEXT
            Err(()) => SyntaxKind::TEXT,
        };
        tokens.push(LexedToken {
            kind,
            range: base + span.start..base + span.end,
        });
    }

    tokens
}
