//! MOF lexer (DSP0004 §A)
//!
//! A byte-walking scanner with line/column tracking. Comments (`//` and
//! `/* ... */`) are discarded; adjacent string literals are concatenated
//! by the parser, not here.

use crate::error::{MofError, MofResult, SourceLocation};
use crate::token::{Span, Token, TokenKind};

pub struct Lexer<'a> {
    src: &'a [u8],
    pos: usize,
    line: u32,
    column: u32,
    file: String,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, file: &str) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
            line: 1,
            column: 1,
            file: file.to_string(),
        }
    }

    /// Tokenize the whole input, ending with an `Eof` token
    pub fn tokenize(mut self) -> MofResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation {
            file: self.file.clone(),
            line: self.line,
            column: self.column,
        }
    }

    fn span(&self) -> Span {
        Span {
            line: self.line,
            column: self.column,
        }
    }

    fn err(&self, message: impl Into<String>) -> MofError {
        MofError::parse(self.location(), message)
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<u8> {
        self.src.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(b)
    }

    fn skip_trivia(&mut self) -> MofResult<()> {
        loop {
            match (self.peek(), self.peek2()) {
                (Some(b), _) if b.is_ascii_whitespace() => {
                    self.bump();
                }
                (Some(b'/'), Some(b'/')) => {
                    while let Some(b) = self.peek() {
                        if b == b'\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                (Some(b'/'), Some(b'*')) => {
                    self.bump();
                    self.bump();
                    loop {
                        match (self.peek(), self.peek2()) {
                            (Some(b'*'), Some(b'/')) => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            (Some(_), _) => {
                                self.bump();
                            }
                            (None, _) => return Err(self.err("unterminated comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn next_token(&mut self) -> MofResult<Token> {
        self.skip_trivia()?;
        let span = self.span();
        let Some(b) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span,
            });
        };
        let kind = match b {
            b'{' => self.punct(TokenKind::LBrace),
            b'}' => self.punct(TokenKind::RBrace),
            b'(' => self.punct(TokenKind::LParen),
            b')' => self.punct(TokenKind::RParen),
            b'[' => self.punct(TokenKind::LBracket),
            b']' => self.punct(TokenKind::RBracket),
            b',' => self.punct(TokenKind::Comma),
            b';' => self.punct(TokenKind::Semicolon),
            b':' => self.punct(TokenKind::Colon),
            b'=' => self.punct(TokenKind::Equals),
            b'#' => {
                self.bump();
                let word = self.word()?;
                if word.eq_ignore_ascii_case("pragma") {
                    TokenKind::KwPragma
                } else {
                    return Err(self.err(format!("unknown directive #{word}")));
                }
            }
            b'$' => {
                self.bump();
                TokenKind::AliasIdent(self.word()?)
            }
            b'"' => TokenKind::StringLit(self.string_literal()?),
            b'\'' => TokenKind::CharLit(self.char_literal()?),
            b'+' | b'-' => self.number()?,
            b'0'..=b'9' => self.number()?,
            b'.' => self.number()?,
            b if b == b'_' || (b as char).is_ascii_alphabetic() => {
                TokenKind::from_word(&self.word()?)
            }
            other => return Err(self.err(format!("unexpected character {:?}", other as char))),
        };
        Ok(Token { kind, span })
    }

    fn punct(&mut self, kind: TokenKind) -> TokenKind {
        self.bump();
        kind
    }

    fn word(&mut self) -> MofResult<String> {
        let mut out = String::new();
        while let Some(b) = self.peek() {
            if b == b'_' || (b as char).is_ascii_alphanumeric() {
                out.push(b as char);
                self.bump();
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(self.err("expected an identifier"));
        }
        Ok(out)
    }

    fn string_literal(&mut self) -> MofResult<String> {
        self.bump(); // opening quote
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(b'"') => return Ok(out),
                Some(b'\\') => out.push(self.escape()?),
                Some(b'\n') | None => return Err(self.err("unterminated string literal")),
                Some(b) if b < 0x80 => out.push(b as char),
                Some(b) => out.push_str(&self.utf8_tail(b)?),
            }
        }
    }

    fn char_literal(&mut self) -> MofResult<char> {
        self.bump(); // opening quote
        let c = match self.bump() {
            Some(b'\\') => self.escape()?,
            Some(b'\'') | None => return Err(self.err("empty character literal")),
            Some(b) if b < 0x80 => b as char,
            Some(b) => {
                let s = self.utf8_tail(b)?;
                let mut chars = s.chars();
                let c = chars.next().ok_or_else(|| self.err("bad character literal"))?;
                c
            }
        };
        match self.bump() {
            Some(b'\'') => Ok(c),
            _ => Err(self.err("unterminated character literal")),
        }
    }

    // the source is UTF-8 (&str); reassemble a multi-byte scalar
    fn utf8_tail(&mut self, first: u8) -> MofResult<String> {
        let len = match first {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(self.err("invalid UTF-8 sequence")),
        };
        let mut bytes = vec![first];
        for _ in 1..len {
            bytes.push(
                self.bump()
                    .ok_or_else(|| self.err("truncated UTF-8 sequence"))?,
            );
        }
        String::from_utf8(bytes).map_err(|_| self.err("invalid UTF-8 sequence"))
    }

    fn escape(&mut self) -> MofResult<char> {
        match self.bump() {
            Some(b'n') => Ok('\n'),
            Some(b't') => Ok('\t'),
            Some(b'r') => Ok('\r'),
            Some(b'b') => Ok('\x08'),
            Some(b'f') => Ok('\x0c'),
            Some(b'"') => Ok('"'),
            Some(b'\'') => Ok('\''),
            Some(b'\\') => Ok('\\'),
            Some(b'x') | Some(b'X') => self.hex_escape(1, 4),
            Some(b'u') | Some(b'U') => self.hex_escape(4, 4),
            Some(other) => Err(self.err(format!("unknown escape \\{}", other as char))),
            None => Err(self.err("truncated escape sequence")),
        }
    }

    fn hex_escape(&mut self, min: usize, max: usize) -> MofResult<char> {
        let mut value: u32 = 0;
        let mut count = 0;
        while count < max {
            match self.peek() {
                Some(b) if (b as char).is_ascii_hexdigit() => {
                    value = value * 16 + (b as char).to_digit(16).unwrap_or(0);
                    self.bump();
                    count += 1;
                }
                _ => break,
            }
        }
        if count < min {
            return Err(self.err("hex escape needs more digits"));
        }
        char::from_u32(value).ok_or_else(|| self.err("escape is not a valid code point"))
    }

    fn number(&mut self) -> MofResult<TokenKind> {
        let mut text = String::new();
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            text.push(self.bump().unwrap_or(b'+') as char);
        }
        while let Some(b) = self.peek() {
            if (b as char).is_ascii_alphanumeric() || b == b'.' {
                text.push(b as char);
                self.bump();
            } else {
                break;
            }
        }
        // reals need at least one digit on each side of the dot, with an
        // optional exponent
        if text.contains('.') || text.contains('e') || text.contains('E') {
            if let Ok(r) = text.parse::<f64>() {
                return Ok(TokenKind::RealLit(r));
            }
        }
        let (sign, digits) = match text.as_bytes().first() {
            Some(b'-') => (-1i128, &text[1..]),
            Some(b'+') => (1, &text[1..]),
            _ => (1, text.as_str()),
        };
        let value = if let Some(hex) = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
        {
            i128::from_str_radix(hex, 16)
        } else if let Some(bin) = digits.strip_suffix('b').or_else(|| digits.strip_suffix('B')) {
            i128::from_str_radix(bin, 2)
        } else if digits.len() > 1 && digits.starts_with('0') && digits.bytes().all(|b| b.is_ascii_digit()) {
            i128::from_str_radix(&digits[1..], 8)
        } else {
            digits.parse::<i128>()
        };
        match value {
            Ok(v) => Ok(TokenKind::IntLit(sign * v)),
            Err(_) => Err(self.err(format!("malformed number literal {text:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src, "test.mof")
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(
            kinds("CLASS Instance OF"),
            [
                TokenKind::KwClass,
                TokenKind::KwInstance,
                TokenKind::KwOf,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn punctuation_and_idents() {
        assert_eq!(
            kinds("class Foo : Bar { uint8 P; };"),
            [
                TokenKind::KwClass,
                TokenKind::Ident("Foo".into()),
                TokenKind::Colon,
                TokenKind::Ident("Bar".into()),
                TokenKind::LBrace,
                TokenKind::Ident("uint8".into()),
                TokenKind::Ident("P".into()),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Semicolon,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn integer_literal_forms() {
        assert_eq!(
            kinds("10 -5 0x1F 017 101b"),
            [
                TokenKind::IntLit(10),
                TokenKind::IntLit(-5),
                TokenKind::IntLit(31),
                TokenKind::IntLit(15),
                TokenKind::IntLit(5),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn real_literals() {
        assert_eq!(
            kinds("1.5 -0.25"),
            [
                TokenKind::RealLit(1.5),
                TokenKind::RealLit(-0.25),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\"b\\c\n" "\x41""#),
            [
                TokenKind::StringLit("a\"b\\c\n".into()),
                TokenKind::StringLit("A".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        assert_eq!(
            kinds("// line\nuint8 /* block\n comment */ P"),
            [
                TokenKind::Ident("uint8".into()),
                TokenKind::Ident("P".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn pragma_and_alias_tokens() {
        assert_eq!(
            kinds("#pragma include (\"x.mof\") $a1"),
            [
                TokenKind::KwPragma,
                TokenKind::Ident("include".into()),
                TokenKind::LParen,
                TokenKind::StringLit("x.mof".into()),
                TokenKind::RParen,
                TokenKind::AliasIdent("a1".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn errors_carry_line_and_column() {
        let err = Lexer::new("class\n  @", "f.mof").tokenize().unwrap_err();
        match err {
            MofError::Parse { location, .. } => {
                assert_eq!(location.line, 2);
                assert_eq!(location.column, 3);
                assert_eq!(location.file, "f.mof");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
