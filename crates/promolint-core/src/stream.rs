//! Immutable, indexed token sequence with bounded lookups
//!
//! The stream is the only view of the source the rules get: indexed
//! access plus "find next/previous token of kind(s)" searches that can
//! be bounded and can skip insignificant tokens. Rules never walk raw
//! source text for structure.

use crate::token::{Token, TokenKind};

/// An immutable sequence of tokens with structural metadata.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Build a stream from raw tokens, computing bracket matching,
    /// scope openers/closers and per-token condition chains.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        link(&mut tokens);
        Self { tokens }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|t| t.kind)
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|t| t.text.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Find the next token whose kind is in `kinds`, starting at `from`
    /// (inclusive), stopping before `until` when given.
    pub fn find_next(
        &self,
        kinds: &[TokenKind],
        from: usize,
        until: Option<usize>,
    ) -> Option<usize> {
        let end = until.unwrap_or(self.tokens.len()).min(self.tokens.len());
        (from..end).find(|&i| kinds.contains(&self.tokens[i].kind))
    }

    /// Find the previous token whose kind is in `kinds`, starting at
    /// `from` (inclusive) and walking backwards, stopping at `until`
    /// (inclusive lower bound) when given.
    pub fn find_prev(
        &self,
        kinds: &[TokenKind],
        from: usize,
        until: Option<usize>,
    ) -> Option<usize> {
        let low = until.unwrap_or(0);
        let from = from.min(self.tokens.len().saturating_sub(1));
        (low..=from)
            .rev()
            .find(|&i| kinds.contains(&self.tokens[i].kind))
    }

    /// Next token that is not whitespace, a comment or an attribute.
    pub fn find_next_effective(&self, from: usize) -> Option<usize> {
        (from..self.tokens.len()).find(|&i| self.tokens[i].kind.is_effective())
    }

    /// Previous token that is not whitespace, a comment or an attribute.
    pub fn find_prev_effective(&self, from: usize) -> Option<usize> {
        if self.tokens.is_empty() {
            return None;
        }
        let from = from.min(self.tokens.len() - 1);
        (0..=from).rev().find(|&i| self.tokens[i].kind.is_effective())
    }

    /// All tokens of `kind` in `from..until`.
    pub fn find_all(&self, kind: TokenKind, from: usize, until: usize) -> Vec<usize> {
        let end = until.min(self.tokens.len());
        (from..end)
            .filter(|&i| self.tokens[i].kind == kind)
            .collect()
    }

    /// Does the token at `index` sit under a conditional construct that
    /// is itself nested inside the scope owned by `owner`?
    pub fn is_conditional_within(&self, index: usize, owner: usize) -> bool {
        let Some(token) = self.tokens.get(index) else {
            return false;
        };
        token
            .conditions
            .iter()
            .any(|&c| c > owner && self.tokens[c].kind.is_conditional())
    }

    /// Innermost enclosing class-like scope owner of the token at `index`.
    pub fn enclosing_class(&self, index: usize) -> Option<usize> {
        let token = self.tokens.get(index)?;
        token
            .conditions
            .iter()
            .rev()
            .copied()
            .find(|&c| self.tokens[c].kind.is_class_like())
    }
}

/// Post-pass: match brackets, attach scopes to their owning keywords and
/// record each token's chain of enclosing scope owners.
fn link(tokens: &mut [Token]) {
    // Bracket matching first, one stack per bracket family.
    let mut parens = Vec::new();
    let mut braces = Vec::new();
    let mut squares = Vec::new();
    for i in 0..tokens.len() {
        match tokens[i].kind {
            TokenKind::OpenParen => parens.push(i),
            TokenKind::OpenBrace => braces.push(i),
            TokenKind::OpenBracket => squares.push(i),
            TokenKind::CloseParen => {
                if let Some(open) = parens.pop() {
                    tokens[open].matching_bracket = Some(i);
                    tokens[i].matching_bracket = Some(open);
                }
            }
            TokenKind::CloseBrace => {
                if let Some(open) = braces.pop() {
                    tokens[open].matching_bracket = Some(i);
                    tokens[i].matching_bracket = Some(open);
                }
            }
            TokenKind::CloseBracket => {
                if let Some(open) = squares.pop() {
                    tokens[open].matching_bracket = Some(i);
                    tokens[i].matching_bracket = Some(open);
                }
            }
            _ => {}
        }
    }

    // Scope ownership and condition chains. A keyword stays "pending"
    // until its `{` opens or a statement-level `;` discards it (an
    // abstract method declaration, for instance).
    let mut pending: Option<usize> = None;
    let mut paren_depth = 0usize;
    // (brace index, owner keyword index if any)
    let mut stack: Vec<(usize, Option<usize>)> = Vec::new();
    let mut owners: Vec<usize> = Vec::new();

    for i in 0..tokens.len() {
        let kind = tokens[i].kind;
        tokens[i].conditions = owners.clone();

        match kind {
            k if k.is_scope_owner() => pending = Some(i),
            TokenKind::OpenParen => paren_depth += 1,
            TokenKind::CloseParen => paren_depth = paren_depth.saturating_sub(1),
            TokenKind::Semicolon if paren_depth == 0 => pending = None,
            TokenKind::OpenBrace => {
                let owner = pending.take();
                if let Some(o) = owner {
                    tokens[o].scope_opener = Some(i);
                    owners.push(o);
                }
                stack.push((i, owner));
            }
            TokenKind::CloseBrace => {
                if let Some((_, owner)) = stack.pop() {
                    if let Some(o) = owner {
                        tokens[o].scope_closer = Some(i);
                        owners.pop();
                        // The closer itself is outside the scope.
                        tokens[i].conditions = owners.clone();
                    }
                }
            }
            _ => {}
        }
    }
}
