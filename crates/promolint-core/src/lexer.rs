//! Minimal PHP lexer
//!
//! Produces the token stream the rules navigate. This is a structural
//! lexer, not a full language front end: strings, comments, attributes
//! and numbers are opaque single tokens, operators the rules never
//! inspect collapse into [`TokenKind::Operator`], and anything
//! unrecognized becomes [`TokenKind::Unknown`] instead of an error.
//! Lexing is total; malformed input never panics.

use mago_database::file::FileId;
use mago_span::{Position, Span};

use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};

/// Tokenize PHP source into a linked [`TokenStream`].
pub fn lex(file_id: FileId, source: &str) -> TokenStream {
    let mut lexer = Lexer::new(file_id, source);
    lexer.run();
    TokenStream::new(lexer.tokens)
}

struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
    in_php: bool,
    file_id: FileId,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(file_id: FileId, source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            in_php: false,
            file_id,
            tokens: Vec::new(),
        }
    }

    fn run(&mut self) {
        while self.pos < self.bytes.len() {
            if self.in_php {
                self.lex_php();
            } else {
                self.lex_html();
            }
        }
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        // Escape handling can step past the end on truncated input
        self.pos = self.pos.min(self.bytes.len());
        let end = self.pos;
        let span = Span::new(
            self.file_id,
            Position::new(start as u32),
            Position::new(end as u32),
        );
        self.tokens
            .push(Token::new(kind, &self.source[start..end], span));
    }

    fn peek(&self) -> u8 {
        *self.bytes.get(self.pos).unwrap_or(&0)
    }

    fn peek_at(&self, offset: usize) -> u8 {
        *self.bytes.get(self.pos + offset).unwrap_or(&0)
    }

    fn starts_with(&self, needle: &str) -> bool {
        self.source[self.pos..].starts_with(needle)
    }

    fn lex_html(&mut self) {
        let start = self.pos;
        if let Some(found) = self.source[self.pos..].find("<?") {
            if found > 0 {
                self.pos += found;
                self.push(TokenKind::InlineHtml, start);
            }
            let tag_start = self.pos;
            self.pos += 2;
            if self.starts_with("php") {
                self.pos += 3;
            } else if self.peek() == b'=' {
                self.pos += 1;
            }
            self.push(TokenKind::OpenTag, tag_start);
            self.in_php = true;
        } else {
            self.pos = self.bytes.len();
            self.push(TokenKind::InlineHtml, start);
        }
    }

    fn lex_php(&mut self) {
        let start = self.pos;
        let c = self.peek();

        match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                while matches!(self.peek(), b' ' | b'\t' | b'\r' | b'\n') && self.pos < self.bytes.len() {
                    self.pos += 1;
                }
                self.push(TokenKind::Whitespace, start);
            }
            b'?' if self.peek_at(1) == b'>' => {
                self.pos += 2;
                self.push(TokenKind::CloseTag, start);
                self.in_php = false;
            }
            b'/' if self.peek_at(1) == b'/' => self.line_comment(start),
            b'#' if self.peek_at(1) == b'[' => self.attribute(start),
            b'#' => self.line_comment(start),
            b'/' if self.peek_at(1) == b'*' => self.block_comment(start),
            b'$' => self.variable(start),
            b'\'' => self.quoted_string(start, b'\'', TokenKind::SingleQuotedString),
            b'"' => self.quoted_string(start, b'"', TokenKind::DoubleQuotedString),
            b'0'..=b'9' => self.number(start),
            b'.' if self.peek_at(1).is_ascii_digit() => self.number(start),
            c if c == b'_' || c.is_ascii_alphabetic() || c >= 0x80 => self.identifier(start),
            _ => self.punctuation(start),
        }
    }

    fn line_comment(&mut self, start: usize) {
        while self.pos < self.bytes.len() && self.peek() != b'\n' {
            // A close tag ends a line comment too
            if self.peek() == b'?' && self.peek_at(1) == b'>' {
                break;
            }
            self.pos += 1;
        }
        self.push(TokenKind::LineComment, start);
    }

    fn block_comment(&mut self, start: usize) {
        let is_doc = self.starts_with("/**") && !self.starts_with("/**/");
        self.pos += 2;
        while self.pos < self.bytes.len() {
            if self.peek() == b'*' && self.peek_at(1) == b'/' {
                self.pos += 2;
                break;
            }
            self.pos += 1;
        }
        let kind = if is_doc {
            TokenKind::DocComment
        } else {
            TokenKind::BlockComment
        };
        self.push(kind, start);
    }

    /// Consume a whole `#[...]` attribute group as one token, honoring
    /// nested brackets and string contents.
    fn attribute(&mut self, start: usize) {
        self.pos += 2;
        let mut depth = 1usize;
        while self.pos < self.bytes.len() && depth > 0 {
            match self.peek() {
                b'[' => depth += 1,
                b']' => depth -= 1,
                b'\'' | b'"' => {
                    let quote = self.peek();
                    self.pos += 1;
                    while self.pos < self.bytes.len() && self.peek() != quote {
                        if self.peek() == b'\\' {
                            self.pos += 1;
                        }
                        self.pos += 1;
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        self.push(TokenKind::Attribute, start);
    }

    fn variable(&mut self, start: usize) {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            let c = self.peek();
            if c == b'_' || c.is_ascii_alphanumeric() || c >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        // A bare `$` is not a variable
        if self.pos == start + 1 {
            self.push(TokenKind::Unknown, start);
        } else {
            self.push(TokenKind::Variable, start);
        }
    }

    fn quoted_string(&mut self, start: usize, quote: u8, kind: TokenKind) {
        self.pos += 1;
        while self.pos < self.bytes.len() {
            let c = self.peek();
            if c == b'\\' {
                self.pos += 2;
                continue;
            }
            self.pos += 1;
            if c == quote {
                break;
            }
        }
        self.push(kind, start);
    }

    fn number(&mut self, start: usize) {
        while self.pos < self.bytes.len() {
            let c = self.peek();
            if c.is_ascii_alphanumeric() || c == b'.' || c == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, start);
    }

    fn identifier(&mut self, start: usize) {
        while self.pos < self.bytes.len() {
            let c = self.peek();
            if c == b'_' || c.is_ascii_alphanumeric() || c >= 0x80 {
                self.pos += 1;
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let kind = keyword_kind(text).unwrap_or(TokenKind::Identifier);
        self.push(kind, start);
    }

    fn punctuation(&mut self, start: usize) {
        let rest = &self.source[self.pos..];
        // Longest match first
        static THREE: &[(&str, TokenKind)] = &[
            ("...", TokenKind::Ellipsis),
            ("===", TokenKind::Operator),
            ("!==", TokenKind::Operator),
            ("**=", TokenKind::CompoundAssign),
            ("<<=", TokenKind::CompoundAssign),
            (">>=", TokenKind::CompoundAssign),
            ("??=", TokenKind::CompoundAssign),
            ("<=>", TokenKind::Operator),
            ("?->", TokenKind::NullsafeArrow),
        ];
        static TWO: &[(&str, TokenKind)] = &[
            ("->", TokenKind::Arrow),
            ("::", TokenKind::DoubleColon),
            ("=>", TokenKind::DoubleArrow),
            ("==", TokenKind::Operator),
            ("!=", TokenKind::Operator),
            ("<=", TokenKind::Operator),
            (">=", TokenKind::Operator),
            ("&&", TokenKind::Operator),
            ("||", TokenKind::Operator),
            ("??", TokenKind::Operator),
            ("<<", TokenKind::Operator),
            (">>", TokenKind::Operator),
            ("++", TokenKind::Increment),
            ("--", TokenKind::Decrement),
            ("+=", TokenKind::CompoundAssign),
            ("-=", TokenKind::CompoundAssign),
            ("*=", TokenKind::CompoundAssign),
            ("/=", TokenKind::CompoundAssign),
            (".=", TokenKind::CompoundAssign),
            ("%=", TokenKind::CompoundAssign),
            ("&=", TokenKind::CompoundAssign),
            ("|=", TokenKind::CompoundAssign),
            ("^=", TokenKind::CompoundAssign),
            ("**", TokenKind::Operator),
        ];

        for (text, kind) in THREE {
            if rest.starts_with(text) {
                self.pos += 3;
                self.push(*kind, start);
                return;
            }
        }
        for (text, kind) in TWO {
            if rest.starts_with(text) {
                self.pos += 2;
                self.push(*kind, start);
                return;
            }
        }

        let kind = match self.peek() {
            b'(' => TokenKind::OpenParen,
            b')' => TokenKind::CloseParen,
            b'{' => TokenKind::OpenBrace,
            b'}' => TokenKind::CloseBrace,
            b'[' => TokenKind::OpenBracket,
            b']' => TokenKind::CloseBracket,
            b';' => TokenKind::Semicolon,
            b',' => TokenKind::Comma,
            b'=' => TokenKind::Equal,
            b'&' => TokenKind::Ampersand,
            b'|' => TokenKind::Pipe,
            b'?' => TokenKind::Question,
            b':' => TokenKind::Colon,
            b'+' | b'-' | b'*' | b'/' | b'%' | b'.' | b'<' | b'>' | b'!' | b'~' | b'^' | b'@' => {
                TokenKind::Operator
            }
            _ => TokenKind::Unknown,
        };
        self.pos += 1;
        self.push(kind, start);
    }
}

fn keyword_kind(text: &str) -> Option<TokenKind> {
    let lower = text.to_ascii_lowercase();
    let kind = match lower.as_str() {
        "class" => TokenKind::Class,
        "interface" => TokenKind::Interface,
        "trait" => TokenKind::Trait,
        "enum" => TokenKind::Enum,
        "abstract" => TokenKind::Abstract,
        "final" => TokenKind::Final,
        "function" => TokenKind::Function,
        "fn" => TokenKind::Fn,
        "public" => TokenKind::Public,
        "protected" => TokenKind::Protected,
        "private" => TokenKind::Private,
        "readonly" => TokenKind::Readonly,
        "static" => TokenKind::Static,
        "const" => TokenKind::Const,
        "var" => TokenKind::Var,
        "callable" => TokenKind::Callable,
        "if" => TokenKind::If,
        "elseif" => TokenKind::ElseIf,
        "else" => TokenKind::Else,
        "switch" => TokenKind::Switch,
        "case" => TokenKind::Case,
        "match" => TokenKind::Match,
        "while" => TokenKind::While,
        "for" => TokenKind::For,
        "foreach" => TokenKind::Foreach,
        "do" => TokenKind::Do,
        "try" => TokenKind::Try,
        "catch" => TokenKind::Catch,
        "finally" => TokenKind::Finally,
        "use" => TokenKind::Use,
        "namespace" => TokenKind::Namespace,
        "return" => TokenKind::Return,
        "new" => TokenKind::New,
        _ => return None,
    };
    Some(kind)
}
