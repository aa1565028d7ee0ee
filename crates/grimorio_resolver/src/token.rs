//! Splitting template bodies into literal text and `{{reference}}` tokens.

/// One piece of a template body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Text emitted as-is
    Literal(&'a str),
    /// Trimmed content of a `{{...}}` span
    Reference(&'a str),
    /// Unclosed, nested or empty span, emitted as-is and counted as an error
    Malformed(&'a str),
}

/// Scan `body` left to right into segments.
///
/// - `{{name}}` yields `Reference("name")` (content trimmed)
/// - `{{` without a later `}}` yields `Malformed` for the rest of the body
/// - `{{` followed by another `{{` before any `}}` yields `Malformed` for the
///   text up to the inner `{{`, and scanning resumes there
/// - `{{}}` or `{{   }}` yields `Malformed`
///
/// Never fails; concatenating the original text of every segment reproduces
/// `body`.
///
/// # Example
///
/// ```
/// use grimorio_resolver::{Segment, tokenize};
///
/// let segments = tokenize("Hola {{ npc.nombre }}!");
/// assert_eq!(
///     segments,
///     vec![
///         Segment::Literal("Hola "),
///         Segment::Reference("npc.nombre"),
///         Segment::Literal("!"),
///     ]
/// );
/// ```
pub fn tokenize(body: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = body;

    while !rest.is_empty() {
        let Some(open) = rest.find("{{") else {
            segments.push(Segment::Literal(rest));
            break;
        };
        if open > 0 {
            segments.push(Segment::Literal(&rest[..open]));
        }

        let after = &rest[open + 2..];
        let Some(close) = after.find("}}") else {
            segments.push(Segment::Malformed(&rest[open..]));
            break;
        };

        if let Some(inner_open) = after.find("{{").filter(|&inner| inner < close) {
            segments.push(Segment::Malformed(&rest[open..open + 2 + inner_open]));
            rest = &after[inner_open..];
            continue;
        }

        let content = after[..close].trim();
        if content.is_empty() {
            segments.push(Segment::Malformed(&rest[open..open + 2 + close + 2]));
        } else {
            segments.push(Segment::Reference(content));
        }
        rest = &after[close + 2..];
    }

    segments
}

/// Reference names in `body`, in textual order.
pub fn references(body: &str) -> impl Iterator<Item = &str> {
    tokenize(body).into_iter().filter_map(|segment| match segment {
        Segment::Reference(name) => Some(name),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_only() {
        assert_eq!(tokenize("sin variables"), vec![Segment::Literal("sin variables")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_adjacent_references() {
        assert_eq!(
            tokenize("{{a}}{{b}}"),
            vec![Segment::Reference("a"), Segment::Reference("b")]
        );
    }

    #[test]
    fn test_unclosed_span() {
        assert_eq!(
            tokenize("Hola {{npc.nombre"),
            vec![Segment::Literal("Hola "), Segment::Malformed("{{npc.nombre")]
        );
    }

    #[test]
    fn test_empty_span() {
        assert_eq!(
            tokenize("a {{  }} b"),
            vec![
                Segment::Literal("a "),
                Segment::Malformed("{{  }}"),
                Segment::Literal(" b"),
            ]
        );
    }

    #[test]
    fn test_nested_span_resumes_at_inner_open() {
        assert_eq!(
            tokenize("x {{a {{b}} y"),
            vec![
                Segment::Literal("x "),
                Segment::Malformed("{{a "),
                Segment::Reference("b"),
                Segment::Literal(" y"),
            ]
        );
    }

    #[test]
    fn test_stray_closing_braces_are_literal() {
        assert_eq!(tokenize("a }} b"), vec![Segment::Literal("a }} b")]);
    }

    #[test]
    fn test_references_iterator() {
        let names: Vec<_> = references("{{a}} y {{ b.c }} {{}}").collect();
        assert_eq!(names, vec!["a", "b.c"]);
    }
}
