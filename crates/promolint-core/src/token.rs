//! Lexical tokens with structural metadata

use mago_span::Span;

/// Kind of a lexical token.
///
/// Only the distinctions the rules actually reason about get their own
/// variant; every other piece of punctuation or operator falls into a
/// coarse bucket (`Operator`, `Unknown`) with the raw text preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// `<?php` or `<?=`
    OpenTag,
    /// `?>`
    CloseTag,
    /// Anything outside PHP tags
    InlineHtml,

    Whitespace,
    /// `// ...` or `# ...`
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// `/** ... */`
    DocComment,
    /// A whole `#[...]` attribute group, brackets included
    Attribute,

    /// `$name`
    Variable,
    Identifier,
    Number,
    SingleQuotedString,
    DoubleQuotedString,

    // Keywords the rules care about
    Class,
    Interface,
    Trait,
    Enum,
    Abstract,
    Final,
    Function,
    Fn,
    Public,
    Protected,
    Private,
    Readonly,
    Static,
    Const,
    Var,
    Callable,
    If,
    ElseIf,
    Else,
    Switch,
    Case,
    Match,
    While,
    For,
    Foreach,
    Do,
    Try,
    Catch,
    Finally,
    Use,
    Namespace,
    Return,
    New,

    /// `=`
    Equal,
    /// `+=` `-=` `*=` `/=` `.=` `%=` `**=` `&=` `|=` `^=` `<<=` `>>=` `??=`
    CompoundAssign,
    /// `++`
    Increment,
    /// `--`
    Decrement,
    /// `->`
    Arrow,
    /// `?->`
    NullsafeArrow,
    /// `::`
    DoubleColon,
    /// `=>`
    DoubleArrow,
    /// `...`
    Ellipsis,
    /// `&`
    Ampersand,
    /// `|`
    Pipe,
    /// `?`
    Question,
    Colon,

    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Comma,

    /// Comparison, arithmetic and other operators the rules never inspect
    Operator,
    Unknown,
}

impl TokenKind {
    /// Whitespace, comments and attributes never take part in
    /// structural matching.
    pub fn is_effective(self) -> bool {
        !matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::LineComment
                | TokenKind::BlockComment
                | TokenKind::DocComment
                | TokenKind::Attribute
        )
    }

    /// `=` or any compound assignment operator.
    pub fn is_assignment(self) -> bool {
        matches!(self, TokenKind::Equal | TokenKind::CompoundAssign)
    }

    /// Visibility keyword (`public`, `protected`, `private`).
    pub fn is_visibility(self) -> bool {
        matches!(
            self,
            TokenKind::Public | TokenKind::Protected | TokenKind::Private
        )
    }

    /// Keyword that owns a `{ ... }` scope when one follows it.
    pub fn is_scope_owner(self) -> bool {
        matches!(
            self,
            TokenKind::Class
                | TokenKind::Interface
                | TokenKind::Trait
                | TokenKind::Enum
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::ElseIf
                | TokenKind::Else
                | TokenKind::Switch
                | TokenKind::Match
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Foreach
                | TokenKind::Do
                | TokenKind::Try
                | TokenKind::Catch
                | TokenKind::Finally
        )
    }

    /// Branching constructs that make an enclosed assignment conditional.
    pub fn is_conditional(self) -> bool {
        matches!(
            self,
            TokenKind::If | TokenKind::ElseIf | TokenKind::Else | TokenKind::Switch
        )
    }

    /// Class-like scope owners (property declarations live directly
    /// inside these).
    pub fn is_class_like(self) -> bool {
        matches!(
            self,
            TokenKind::Class | TokenKind::Trait | TokenKind::Enum
        )
    }
}

/// A single lexical token.
///
/// Structural metadata (`matching_bracket`, `scope_opener`/`scope_closer`,
/// `conditions`) is filled in by a post-pass after lexing; synthetic
/// streams built by tests get the same treatment through
/// [`crate::TokenStream::link`].
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
    /// For bracket tokens, the index of the partner bracket
    pub matching_bracket: Option<usize>,
    /// For scope-owning keywords, the index of the opening `{`
    pub scope_opener: Option<usize>,
    /// For scope-owning keywords, the index of the closing `}`
    pub scope_closer: Option<usize>,
    /// Enclosing scope-owner token indices, outermost first
    pub conditions: Vec<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
            matching_bracket: None,
            scope_opener: None,
            scope_closer: None,
            conditions: Vec::new(),
        }
    }

    pub fn start_offset(&self) -> usize {
        self.span.start.offset as usize
    }

    pub fn end_offset(&self) -> usize {
        self.span.end.offset as usize
    }
}
