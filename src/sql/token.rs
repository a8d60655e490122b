//! Token vocabulary for the SQL lexer.

use phf::phf_map;

// Perfect hash map for O(1) keyword lookup
static KEYWORDS: phf::Map<&'static str, TokenKind> = phf_map! {
    "select" => TokenKind::Select,
    "insert" => TokenKind::Insert,
    "update" => TokenKind::Update,
    "delete" => TokenKind::Delete,
    "create" => TokenKind::Create,
    "drop" => TokenKind::Drop,
    "table" => TokenKind::Table,
    "from" => TokenKind::From,
    "where" => TokenKind::Where,
    "into" => TokenKind::Into,
    "values" => TokenKind::Values,
    "set" => TokenKind::Set,
    "and" => TokenKind::And,
    "or" => TokenKind::Or,
    "not" => TokenKind::Not,
    "null" => TokenKind::Null,
    "primary" => TokenKind::Primary,
    "key" => TokenKind::Key,
    "true" => TokenKind::True,
    "false" => TokenKind::False,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Statement keywords
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Table,
    From,
    Where,
    Into,
    Values,
    Set,
    And,
    Or,
    Not,
    Null,
    Primary,
    Key,
    True,
    False,

    // Literals; the token's `text` carries the raw content
    Identifier,
    Number,
    StringLiteral,

    // Punctuation
    Semicolon, // ;
    Comma,     // ,
    LParen,    // (
    RParen,    // )
    Star,      // *

    // Comparison operators
    Eq, // =
    Ne, // <>
    Lt, // <
    Gt, // >
    Le, // <=
    Ge, // >=

    // Terminal; the lexer always appends one
    Eof,
}

impl TokenKind {
    /// Case-insensitive keyword lookup.
    pub fn from_keyword(s: &str) -> Option<Self> {
        KEYWORDS.get(s.to_lowercase().as_str()).copied()
    }
}

/// One lexed token.
///
/// `text` preserves the source spelling (identifiers and keywords keep their
/// original case; string literals carry the unquoted content). `offset` is
/// the character position where the token starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            offset,
        }
    }
}
