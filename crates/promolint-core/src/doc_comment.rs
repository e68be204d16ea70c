//! Structured access to `/** ... */` doc comments
//!
//! The rules only need two facts about a doc block: does it carry a
//! free-text description, and which annotations does it hold. For
//! `@var` annotations the type expression and optional `$name` are
//! stripped off so a trailing description is visible on its own.

/// One `@tag` line (plus continuation lines) of a doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Tag name without the `@`, e.g. `var`, `param`, `deprecated`
    pub tag: String,
    /// Raw value following the tag
    pub value: String,
}

impl Annotation {
    /// For a `@var` annotation, the free-text description left after
    /// removing the type expression and an optional `$name`.
    ///
    /// The type expression is taken as the first whitespace-delimited
    /// chunk, balancing `<>`, `()`, `{}` and `[]` so generics like
    /// `array<int, string>` survive.
    pub fn var_description(&self) -> &str {
        let value = self.value.trim();
        if value.is_empty() {
            return "";
        }
        let mut depth = 0i32;
        let mut type_end = value.len();
        for (i, c) in value.char_indices() {
            match c {
                '<' | '(' | '{' | '[' => depth += 1,
                '>' | ')' | '}' | ']' => depth -= 1,
                c if c.is_whitespace() && depth <= 0 => {
                    type_end = i;
                    break;
                }
                _ => {}
            }
        }
        let mut rest = value[type_end..].trim_start();
        if rest.starts_with('$') {
            match rest.find(char::is_whitespace) {
                Some(i) => rest = rest[i..].trim_start(),
                None => rest = "",
            }
        }
        rest
    }
}

/// Parsed doc comment contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    /// Free text before the first annotation, if any
    pub description: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl DocComment {
    /// Parse the raw text of a `/** ... */` token.
    pub fn parse(raw: &str) -> Self {
        let inner = raw
            .trim_start_matches("/**")
            .trim_end_matches("*/");

        let mut description_lines: Vec<&str> = Vec::new();
        let mut annotations: Vec<Annotation> = Vec::new();

        for line in inner.lines() {
            let line = line.trim().trim_start_matches('*').trim();
            if let Some(tag_line) = line.strip_prefix('@') {
                let (tag, value) = match tag_line.find(char::is_whitespace) {
                    Some(i) => (&tag_line[..i], tag_line[i..].trim()),
                    None => (tag_line, ""),
                };
                if tag.is_empty() {
                    continue;
                }
                annotations.push(Annotation {
                    tag: tag.to_string(),
                    value: value.to_string(),
                });
            } else if !line.is_empty() {
                match annotations.last_mut() {
                    // Continuation of the previous annotation value
                    Some(last) => {
                        if !last.value.is_empty() {
                            last.value.push(' ');
                        }
                        last.value.push_str(line);
                    }
                    None => description_lines.push(line),
                }
            }
        }

        let description = if description_lines.is_empty() {
            None
        } else {
            Some(description_lines.join(" "))
        };

        Self {
            description,
            annotations,
        }
    }

    /// A doc comment is "useful" when it says anything the promoted
    /// form could not: a description, any annotation other than `@var`,
    /// or a `@var` annotation carrying free text beyond its type.
    pub fn is_useful(&self) -> bool {
        if self.description.is_some() {
            return true;
        }
        self.annotations.iter().any(|annotation| {
            annotation.tag != "var" || !annotation.var_description().is_empty()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_doc_is_not_useful() {
        let doc = DocComment::parse("/** */");
        assert_eq!(doc.description, None);
        assert!(doc.annotations.is_empty());
        assert!(!doc.is_useful());
    }

    #[test]
    fn description_makes_doc_useful() {
        let doc = DocComment::parse("/**\n * The user's display name.\n */");
        assert_eq!(
            doc.description.as_deref(),
            Some("The user's display name.")
        );
        assert!(doc.is_useful());
    }

    #[test]
    fn type_only_var_is_not_useful() {
        let doc = DocComment::parse("/** @var string */");
        assert!(!doc.is_useful());
        let doc = DocComment::parse("/** @var string $name */");
        assert!(!doc.is_useful());
    }

    #[test]
    fn var_with_description_is_useful() {
        let doc = DocComment::parse("/** @var string $name the display name */");
        assert!(doc.is_useful());
        assert_eq!(
            doc.annotations[0].var_description(),
            "the display name"
        );
    }

    #[test]
    fn generic_var_type_is_not_split_at_inner_space() {
        let doc = DocComment::parse("/** @var array<int, string> */");
        assert!(!doc.is_useful());
        let doc = DocComment::parse("/** @var array<int, string> values by id */");
        assert_eq!(doc.annotations[0].var_description(), "values by id");
        assert!(doc.is_useful());
    }

    #[test]
    fn non_var_annotation_is_useful() {
        let doc = DocComment::parse("/** @deprecated */");
        assert!(doc.is_useful());
    }

    #[test]
    fn multi_line_annotation_values_are_joined() {
        let doc = DocComment::parse("/**\n * @param string $a first\n *   continued\n */");
        assert_eq!(doc.annotations[0].value, "string $a first continued");
    }
}
