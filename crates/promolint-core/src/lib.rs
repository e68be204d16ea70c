//! promolint-core: Core abstractions for PHP style checking
//!
//! This crate provides:
//! - `Token` / `TokenStream`: an immutable, indexed token sequence with
//!   bracket matching, scope ownership and condition chains
//! - `lex()`: a minimal, total PHP lexer producing a linked stream
//! - `DocComment`: structured access to `/** ... */` blocks
//! - `Edit` / `Changeset`: span-based modifications applied atomically
//! - `DiagnosticSink`: how rules report violations and request fixes

mod doc_comment;
mod edit;
pub mod lexer;
mod stream;
mod token;

pub mod diagnostics;

pub use diagnostics::{CollectingSink, DiagnosticSink, Violation};
pub use doc_comment::{Annotation, DocComment};
pub use edit::{apply_changesets, apply_edits, Changeset, Edit, EditError};
pub use lexer::lex;
pub use stream::TokenStream;
pub use token::{Token, TokenKind};
