//! SyntaxKind enum for all tokens and nodes in the Markdown tree.
//!
//! Following the rust-analyzer model, all tokens and nodes share a single enum.
//! Every byte in the source must appear as a token in the tree.

/// All syntax kinds for the Markdown tree.
///
/// This enum represents both tokens (lexer and block-parser output) and
/// composite nodes. The `repr(u16)` ensures efficient storage in rowan's
/// green tree.
///
/// We use SCREAMING_CASE following the rust-analyzer convention for SyntaxKind.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Tokens (lexer output) ===
    /// Horizontal whitespace (spaces, tabs)
    WHITE_SPACE,
    /// Line ending
    EOL,
    /// Plain text content
    TEXT,
    /// `>` character
    GT,
    /// `<` character for autolinks
    LT,
    /// `*` character for lists, emphasis, and thematic breaks
    STAR,
    /// `_` character for emphasis
    UNDERSCORE,
    /// A run of backticks
    BACKTICK,
    /// `~` character
    TILDE,
    /// `#` character
    HASH,
    /// `-` character
    DASH,
    /// `+` character
    PLUS,
    /// `!` introducing an image
    EXCLAMATION_MARK,
    /// `[` for links
    LBRACKET,
    /// `]` for links
    RBRACKET,
    /// `(` for link destinations
    LPAREN,
    /// `)` for link destinations
    RPAREN,
    /// `"` delimiting link titles
    DOUBLE_QUOTE,
    /// Backslash followed by ASCII punctuation
    ESCAPED_CHAR,
    /// HTML entity or numeric character reference
    ENTITY,
    /// `>` continuing a block quote
    QUOTE_MARKER,

    // === Tokens (block parser output) ===
    /// Opening or closing `#` run of an ATX heading
    ATX_HEADER,
    /// `===` or `---` under a setext heading
    SETEXT_UNDERLINE,
    /// Bullet list marker plus its trailing spaces
    LIST_BULLET,
    /// Ordered list marker plus its trailing spaces
    LIST_NUMBER,
    /// `---`, `***` or `___`
    THEMATIC_BREAK,
    /// Opening backtick or tilde run of a fenced code block
    CODE_FENCE_START,
    /// Info string after the opening fence
    FENCE_LANG,
    /// One line of fenced code
    CODE_FENCE_CONTENT,
    /// Closing backtick or tilde run of a fenced code block
    CODE_FENCE_END,
    /// End of file marker
    EOF,

    // === Composite Nodes ===
    /// Root document node
    MARKDOWN_FILE,
    /// Paragraph block
    PARAGRAPH,
    ATX_1,
    ATX_2,
    ATX_3,
    ATX_4,
    ATX_5,
    ATX_6,
    /// Text of an ATX heading between the markers
    ATX_CONTENT,
    SETEXT_1,
    SETEXT_2,
    /// Text of a setext heading above the underline
    SETEXT_CONTENT,
    /// Blockquote container (`> ...`)
    BLOCK_QUOTE,
    UNORDERED_LIST,
    ORDERED_LIST,
    /// Individual list item
    LIST_ITEM,
    /// Fenced code block
    CODE_FENCE,
    /// Inline code span
    CODE_SPAN,
    /// Emphasis `*text*`
    EMPH,
    /// Strong emphasis `**text**`
    STRONG,
    /// Standard link `[text](url "title")`
    INLINE_LINK,
    /// Bracketed text of a link or image, brackets included
    LINK_TEXT,
    LINK_DESTINATION,
    LINK_TITLE,
    /// Image `![alt](src)`
    IMAGE,
    /// `<https://example.com>` or `<me@example.com>`
    AUTOLINK,
}

impl SyntaxKind {
    /// Returns true if this kind represents a token.
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::EOF as u16)
    }

    /// Returns true if this kind represents a composite node.
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns true if this kind is trivia (whitespace/newlines).
    pub fn is_trivia(self) -> bool {
        matches!(self, Self::WHITE_SPACE | Self::EOL)
    }

    /// Kinds whose text is parsed for inline constructs when the tree is
    /// built with inline expansion.
    pub fn is_inline_bearing(self) -> bool {
        matches!(
            self,
            Self::PARAGRAPH | Self::ATX_CONTENT | Self::SETEXT_CONTENT
        )
    }

    pub fn is_list(self) -> bool {
        matches!(self, Self::UNORDERED_LIST | Self::ORDERED_LIST)
    }

    /// The ATX heading kind for a `#` run of the given length.
    pub fn atx_heading(level: usize) -> Option<Self> {
        match level {
            1 => Some(Self::ATX_1),
            2 => Some(Self::ATX_2),
            3 => Some(Self::ATX_3),
            4 => Some(Self::ATX_4),
            5 => Some(Self::ATX_5),
            6 => Some(Self::ATX_6),
            _ => None,
        }
    }

    /// Heading level for ATX and setext heading kinds.
    pub fn heading_level(self) -> Option<usize> {
        match self {
            Self::ATX_1 | Self::SETEXT_1 => Some(1),
            Self::ATX_2 | Self::SETEXT_2 => Some(2),
            Self::ATX_3 => Some(3),
            Self::ATX_4 => Some(4),
            Self::ATX_5 => Some(5),
            Self::ATX_6 => Some(6),
            _ => None,
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Language definition for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkdownLang {}

impl rowan::Language for MarkdownLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::AUTOLINK as u16);
        // SAFETY: We check bounds above and SyntaxKind is repr(u16)
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type alias for our syntax nodes.
pub type SyntaxNode = rowan::SyntaxNode<MarkdownLang>;
/// Type alias for our syntax tokens.
pub type SyntaxToken = rowan::SyntaxToken<MarkdownLang>;
/// Type alias for syntax elements (node or token).
pub type SyntaxElement = rowan::SyntaxElement<MarkdownLang>;
