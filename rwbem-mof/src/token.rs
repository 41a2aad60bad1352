//! MOF tokens (DSP0004 §A)

use std::fmt;

/// Position of a token in its source file, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

/// One lexical token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token kinds.
///
/// Reserved words are folded at lex time (MOF keywords are
/// case-insensitive); everything else that looks like a name stays an
/// `Ident` and is interpreted by the parser (data type names, scope and
/// flavor names, element names).
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    /// `$name`, an instance alias
    AliasIdent(String),
    StringLit(String),
    CharLit(char),
    IntLit(i128),
    RealLit(f64),

    // Reserved words
    KwClass,
    KwInstance,
    KwOf,
    KwAs,
    KwRef,
    KwNull,
    KwTrue,
    KwFalse,
    KwQualifier,
    KwScope,
    KwFlavor,
    KwPragma,

    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    Equals,

    Eof,
}

impl TokenKind {
    /// Fold an identifier into its reserved-word token, when it is one
    pub fn from_word(word: &str) -> TokenKind {
        match word.to_ascii_lowercase().as_str() {
            "class" => TokenKind::KwClass,
            "instance" => TokenKind::KwInstance,
            "of" => TokenKind::KwOf,
            "as" => TokenKind::KwAs,
            "ref" => TokenKind::KwRef,
            "null" => TokenKind::KwNull,
            "true" => TokenKind::KwTrue,
            "false" => TokenKind::KwFalse,
            "qualifier" => TokenKind::KwQualifier,
            "scope" => TokenKind::KwScope,
            "flavor" => TokenKind::KwFlavor,
            "pragma" => TokenKind::KwPragma,
            _ => TokenKind::Ident(word.to_string()),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => write!(f, "identifier {s:?}"),
            Self::AliasIdent(s) => write!(f, "alias ${s}"),
            Self::StringLit(s) => write!(f, "string {s:?}"),
            Self::CharLit(c) => write!(f, "char {c:?}"),
            Self::IntLit(n) => write!(f, "integer {n}"),
            Self::RealLit(r) => write!(f, "real {r}"),
            Self::KwClass => f.write_str("'class'"),
            Self::KwInstance => f.write_str("'instance'"),
            Self::KwOf => f.write_str("'of'"),
            Self::KwAs => f.write_str("'as'"),
            Self::KwRef => f.write_str("'ref'"),
            Self::KwNull => f.write_str("'null'"),
            Self::KwTrue => f.write_str("'true'"),
            Self::KwFalse => f.write_str("'false'"),
            Self::KwQualifier => f.write_str("'qualifier'"),
            Self::KwScope => f.write_str("'scope'"),
            Self::KwFlavor => f.write_str("'flavor'"),
            Self::KwPragma => f.write_str("'pragma'"),
            Self::LBrace => f.write_str("'{'"),
            Self::RBrace => f.write_str("'}'"),
            Self::LParen => f.write_str("'('"),
            Self::RParen => f.write_str("')'"),
            Self::LBracket => f.write_str("'['"),
            Self::RBracket => f.write_str("']'"),
            Self::Comma => f.write_str("','"),
            Self::Semicolon => f.write_str("';'"),
            Self::Colon => f.write_str("':'"),
            Self::Equals => f.write_str("'='"),
            Self::Eof => f.write_str("end of input"),
        }
    }
}
