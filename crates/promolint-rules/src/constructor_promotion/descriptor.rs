//! Descriptor extraction for constructor promotion analysis
//!
//! A read-only pass over the token stream that turns a constructor and
//! its enclosing class into plain data the analyzer can reason about.
//! Nothing here decides anything; it only records what is there.

use promolint_core::{DocComment, TokenKind, TokenStream};

/// How a constructor parameter relates to promotion. The three
/// categories are mutually exclusive; a parameter that already carries
/// a promotion modifier is `Promoted` regardless of anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    /// No promotion modifier, promotion syntax could express it
    Plain,
    /// Already carries a visibility or readonly modifier
    Promoted,
    /// Variadic, by-reference or callable-typed: promotion syntax
    /// cannot express this parameter
    Impossible,
}

/// One constructor parameter, read from the declaration list.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    /// Index of the `$name` variable token
    pub pointer: usize,
    /// Parameter name including the `$` sigil
    pub name: String,
    pub kind: ParameterKind,
    /// Type hint text with whitespace removed, e.g. `?string`, `int|null`
    pub type_hint: Option<String>,
    pub has_default: bool,
    /// Index of the parameter's first effective token (type or variable)
    pub start: usize,
}

/// One instance property of the enclosing class.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Index of the `$name` variable token
    pub pointer: usize,
    /// Property name including the `$` sigil
    pub name: String,
    pub type_hint: Option<String>,
    /// Visibility keyword text; `var` and bare declarations read as public
    pub visibility: String,
    pub is_readonly: bool,
    /// Raw default value text after `=`, if any
    pub default_value: Option<String>,
    /// Doc block with a description or a non-type annotation
    pub has_useful_doc: bool,
    pub has_attribute: bool,
    /// Index of the preceding `/** ... */` token, if any
    pub doc_opener: Option<usize>,
    /// Index of the first effective token of the declaration
    pub declaration_start: usize,
    /// Index of the terminating `;`
    pub end: usize,
}

/// Everything the analyzer needs to know about one constructor.
#[derive(Debug)]
pub struct ConstructorDescriptor {
    /// Index of the `function` keyword token
    pub function: usize,
    pub scope_opener: usize,
    pub scope_closer: usize,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterDescriptor>,
    /// Instance properties of the enclosing class
    pub properties: Vec<PropertyDescriptor>,
}

const VISIBILITY: &[TokenKind] = &[TokenKind::Public, TokenKind::Protected, TokenKind::Private];

/// Extract descriptors for the function at `function`, or `None` when
/// the rule is inapplicable: not named `__construct`, abstract or
/// bodyless, or not inside a class-like scope.
pub fn extract(stream: &TokenStream, source: &str, function: usize) -> Option<ConstructorDescriptor> {
    if stream.kind(function) != Some(TokenKind::Function) {
        return None;
    }

    let name = stream.find_next_effective(function + 1)?;
    if stream.kind(name) != Some(TokenKind::Identifier)
        || !stream.text(name)?.eq_ignore_ascii_case("__construct")
    {
        return None;
    }

    if is_abstract(stream, function) {
        return None;
    }

    let function_token = stream.get(function)?;
    let scope_opener = function_token.scope_opener?;
    let scope_closer = function_token.scope_closer?;

    let paren_open = stream.find_next(&[TokenKind::OpenParen], name + 1, Some(scope_opener))?;
    let paren_close = stream.get(paren_open)?.matching_bracket?;

    let parameters: Vec<ParameterDescriptor> = stream
        .find_all(TokenKind::Variable, paren_open + 1, paren_close)
        .into_iter()
        .filter_map(|pointer| extract_parameter(stream, pointer))
        .collect();

    let class = stream.enclosing_class(function)?;
    let properties = extract_properties(stream, source, class);

    Some(ConstructorDescriptor {
        function,
        scope_opener,
        scope_closer,
        parameters,
        properties,
    })
}

/// Walk the modifiers in front of the `function` keyword looking for
/// `abstract`.
fn is_abstract(stream: &TokenStream, function: usize) -> bool {
    let mut index = function;
    while index > 0 {
        let Some(prev) = stream.find_prev_effective(index - 1) else {
            return false;
        };
        match stream.kind(prev) {
            Some(TokenKind::Abstract) => return true,
            Some(
                TokenKind::Final
                | TokenKind::Static
                | TokenKind::Public
                | TokenKind::Protected
                | TokenKind::Private,
            ) => index = prev,
            _ => return false,
        }
    }
    false
}

fn extract_parameter(stream: &TokenStream, pointer: usize) -> Option<ParameterDescriptor> {
    let name = stream.text(pointer)?.to_string();

    let before_start = stream.find_prev(
        &[TokenKind::Comma, TokenKind::OpenParen],
        pointer.checked_sub(1)?,
        None,
    )?;
    let start = stream.find_next_effective(before_start + 1)?;

    let kind = classify_parameter(stream, pointer, start);

    let type_hint = join_type_hint(stream, start, pointer);

    let has_default = stream
        .find_next_effective(pointer + 1)
        .and_then(|i| stream.kind(i))
        == Some(TokenKind::Equal);

    Some(ParameterDescriptor {
        pointer,
        name,
        kind,
        type_hint,
        has_default,
        start,
    })
}

fn classify_parameter(stream: &TokenStream, pointer: usize, start: usize) -> ParameterKind {
    let first = stream.kind(start);
    if matches!(first, Some(k) if k.is_visibility() || k == TokenKind::Readonly) {
        return ParameterKind::Promoted;
    }

    // Variadic, by-reference and callable-typed parameters cannot be
    // expressed in promoted form.
    if let Some(i) = stream.find_prev_effective(pointer.saturating_sub(1)) {
        if matches!(
            stream.kind(i),
            Some(TokenKind::Ellipsis | TokenKind::Ampersand | TokenKind::Callable)
        ) {
            return ParameterKind::Impossible;
        }
    }

    ParameterKind::Plain
}

/// Concatenate the effective tokens of a type hint, dropping modifiers
/// and the reference/variadic markers. Whitespace never survives, so
/// `int | null` and `int|null` compare equal.
fn join_type_hint(stream: &TokenStream, start: usize, pointer: usize) -> Option<String> {
    let mut text = String::new();
    for i in start..pointer {
        let token = stream.get(i)?;
        if !token.kind.is_effective() {
            continue;
        }
        match token.kind {
            k if k.is_visibility() => continue,
            TokenKind::Readonly
            | TokenKind::Static
            | TokenKind::Var
            | TokenKind::Ampersand
            | TokenKind::Ellipsis => continue,
            _ => text.push_str(&token.text),
        }
    }
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Collect instance properties declared directly in the class body,
/// jumping over nested scopes so method parameters and local variables
/// never count. Static members are excluded.
fn extract_properties(
    stream: &TokenStream,
    source: &str,
    class: usize,
) -> Vec<PropertyDescriptor> {
    let Some(class_token) = stream.get(class) else {
        return Vec::new();
    };
    let (Some(opener), Some(closer)) = (class_token.scope_opener, class_token.scope_closer) else {
        return Vec::new();
    };

    let mut properties = Vec::new();
    let mut i = opener + 1;
    while i < closer {
        match stream.kind(i) {
            Some(TokenKind::OpenParen | TokenKind::OpenBrace | TokenKind::OpenBracket) => {
                i = stream
                    .get(i)
                    .and_then(|t| t.matching_bracket)
                    .map(|m| m + 1)
                    .unwrap_or(i + 1);
            }
            Some(TokenKind::Variable) => {
                if let Some(property) = extract_property(stream, source, i, opener) {
                    properties.push(property);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    properties
}

fn extract_property(
    stream: &TokenStream,
    source: &str,
    pointer: usize,
    class_opener: usize,
) -> Option<PropertyDescriptor> {
    let boundary_kinds = [
        TokenKind::Semicolon,
        TokenKind::OpenBrace,
        TokenKind::CloseBrace,
        TokenKind::Attribute,
        TokenKind::DocComment,
    ];
    let boundary = stream
        .find_prev(&boundary_kinds, pointer - 1, Some(class_opener))
        .unwrap_or(class_opener);
    let declaration_start = stream.find_next_effective(boundary + 1)?;

    // Static members are not instance fields
    if stream
        .find_prev(&[TokenKind::Static], pointer - 1, Some(declaration_start))
        .is_some()
    {
        return None;
    }

    let visibility = stream
        .find_prev(VISIBILITY, pointer - 1, Some(declaration_start))
        .and_then(|i| stream.text(i))
        .unwrap_or("public")
        .to_string();

    let is_readonly = stream
        .find_prev(&[TokenKind::Readonly], pointer - 1, Some(declaration_start))
        .is_some();

    let end = stream.find_next(&[TokenKind::Semicolon], pointer + 1, None)?;

    let default_value = stream
        .find_next(&[TokenKind::Equal], pointer + 1, Some(end))
        .map(|eq| {
            let from = stream.get(eq).map(|t| t.end_offset()).unwrap_or(0);
            let to = stream.get(end).map(|t| t.start_offset()).unwrap_or(from);
            source[from..to].trim().to_string()
        });

    let has_attribute = stream
        .find_prev(
            &[
                TokenKind::Attribute,
                TokenKind::Semicolon,
                TokenKind::OpenBrace,
                TokenKind::CloseBrace,
            ],
            pointer - 1,
            Some(class_opener),
        )
        .map(|i| stream.kind(i) == Some(TokenKind::Attribute))
        .unwrap_or(false);

    let doc_opener = find_doc_opener(stream, pointer, class_opener);
    let has_useful_doc = doc_opener
        .and_then(|i| stream.text(i))
        .map(|text| DocComment::parse(text).is_useful())
        .unwrap_or(false);

    let type_hint = join_type_hint(stream, declaration_start, pointer);

    Some(PropertyDescriptor {
        pointer,
        name: stream.text(pointer)?.to_string(),
        type_hint,
        visibility,
        is_readonly,
        default_value,
        has_useful_doc,
        has_attribute,
        doc_opener,
        declaration_start,
        end,
    })
}

/// Find the doc block in front of a property, skipping over attribute
/// groups that sit between the two.
fn find_doc_opener(stream: &TokenStream, pointer: usize, class_opener: usize) -> Option<usize> {
    let kinds = [
        TokenKind::DocComment,
        TokenKind::Attribute,
        TokenKind::Semicolon,
        TokenKind::OpenBrace,
        TokenKind::CloseBrace,
    ];
    let mut from = pointer - 1;
    loop {
        let found = stream.find_prev(&kinds, from, Some(class_opener))?;
        match stream.kind(found) {
            Some(TokenKind::DocComment) => return Some(found),
            Some(TokenKind::Attribute) if found > class_opener => from = found - 1,
            _ => return None,
        }
    }
}
