//! Line-oriented handler extraction.
//!
//! This is a block scanner, not a parser. A handler starts at any line that
//! looks like `[async] function name(` and ends at the first line starting
//! with `}` at column zero, whatever follows it (`};`, `});`, `} // end`).
//! Blocks do not nest: a declaration seen while a handler is open is kept as
//! body text.

use std::sync::LazyLock;

use regex::Regex;

use crate::handler::{END_OF_BLOCK_MARKER, Handler};

static DECLARATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*)function\s+([A-Za-z0-9_]*)\((.*)$").expect("valid declaration regex")
});

/// Parse a declaration line into an empty handler.
pub fn parse_declaration(line: &str) -> Option<Handler> {
    let caps = DECLARATION_RE.captures(line)?;
    Some(Handler::new(
        &caps[2],
        caps[1].contains("async"),
        &caps[3],
    ))
}

/// Whether a line closes the open handler.
///
/// The closing line itself is replaced by the end-of-block marker.
pub fn is_terminator(line: &str) -> bool {
    line.starts_with('}')
}

/// Lazy iterator over the completed handlers of a line sequence.
///
/// Holds at most one partially built handler. A handler still open when the
/// lines run out is dropped.
pub struct HandlerExtractor<I> {
    lines: I,
    current: Option<Handler>,
}

impl<I> HandlerExtractor<I> {
    pub fn new(lines: I) -> Self {
        Self {
            lines,
            current: None,
        }
    }
}

impl<I, S> Iterator for HandlerExtractor<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = Handler;

    fn next(&mut self) -> Option<Handler> {
        for line in self.lines.by_ref() {
            let line = line.as_ref();

            match self.current.take() {
                None => self.current = parse_declaration(line),
                Some(mut handler) if is_terminator(line) => {
                    handler.body_lines.push(END_OF_BLOCK_MARKER.to_string());
                    return Some(handler);
                }
                Some(mut handler) => {
                    handler.body_lines.push(line.to_string());
                    self.current = Some(handler);
                }
            }
        }

        if let Some(open) = self.current.take() {
            tracing::debug!(
                "Dropping unterminated handler '{}' ({} body lines)",
                open.name,
                open.body_lines.len()
            );
        }

        None
    }
}

/// Extract handlers from any sequence of lines.
pub fn extract_handlers<I, S>(lines: I) -> HandlerExtractor<I::IntoIter>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    HandlerExtractor::new(lines.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_parsing() {
        let handler = parse_declaration("async function GET_status(request, response) {").unwrap();
        assert_eq!(handler.name, "GET_status");
        assert!(handler.is_async);
        assert_eq!(handler.param_signature, "request, response) {");

        let handler = parse_declaration("function PUB_ping() {").unwrap();
        assert_eq!(handler.name, "PUB_ping");
        assert!(!handler.is_async);
        assert_eq!(handler.param_signature, ") {");
    }

    #[test]
    fn test_declaration_any_indentation() {
        let handler = parse_declaration("    function PRIV_inner(a) {").unwrap();
        assert_eq!(handler.name, "PRIV_inner");
    }

    #[test]
    fn test_non_declarations() {
        assert!(parse_declaration("const x = 1;").is_none());
        assert!(parse_declaration("// functional style").is_none());
        assert!(parse_declaration("function PUB_x").is_none());
    }

    #[test]
    fn test_terminator() {
        assert!(is_terminator("}"));
        assert!(is_terminator("}  "));
        assert!(is_terminator("};"));
        assert!(is_terminator("});"));
        assert!(is_terminator("} // end"));
        assert!(!is_terminator("  }"));
        assert!(!is_terminator("\t};"));
        assert!(!is_terminator("const x = {};"));
    }

    #[test]
    fn test_closer_with_trailing_text_ends_handler() {
        let source = "function PUB_tail() {\n  return 1;\n} // end\nfunction PUB_after() {\n  return 2;\n}\n";
        let names: Vec<_> = extract_handlers(source.lines()).map(|h| h.name).collect();
        assert_eq!(names, ["PUB_tail", "PUB_after"]);

        let source = "const PUB_expr = function PUB_expr() {\n  return 1;\n};\nfunction PUB_next() {\n}\n";
        let handlers: Vec<_> = extract_handlers(source.lines()).collect();
        assert_eq!(handlers.len(), 2);
        assert_eq!(handlers[0].body_lines, ["  return 1;", END_OF_BLOCK_MARKER]);
        assert_eq!(handlers[1].name, "PUB_next");
    }

    #[test]
    fn test_extracts_handlers_in_order() {
        let source = r#"
function PUB_ping() {
  return "pong";
}

// not a handler
const y = 2;

async function GET_status(request, response) {
  try {
    return {ok: true};
  } catch (error) {
    return {ok: false};
  }
}
"#;
        let handlers: Vec<_> = extract_handlers(source.lines()).collect();
        assert_eq!(handlers.len(), 2);

        assert_eq!(handlers[0].name, "PUB_ping");
        assert_eq!(handlers[0].body_lines, vec!["  return \"pong\";", "};"]);

        assert_eq!(handlers[1].name, "GET_status");
        assert!(handlers[1].is_async);
        assert_eq!(handlers[1].body_lines.len(), 6);
        assert_eq!(handlers[1].body_lines.last().unwrap(), END_OF_BLOCK_MARKER);
    }

    #[test]
    fn test_unterminated_handler_is_dropped() {
        let source = "function PUB_a() {\n  return 1;\n}\nfunction PUB_b() {\n  return 2;\n";
        let handlers: Vec<_> = extract_handlers(source.lines()).collect();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].name, "PUB_a");
    }

    #[test]
    fn test_nested_declaration_is_body_text() {
        let source = r#"function PRIV_outer() {
  function PRIV_inner() {
    return 1;
  }
  return PRIV_inner();
}
"#;
        let handlers: Vec<_> = extract_handlers(source.lines()).collect();
        assert_eq!(handlers.len(), 1);
        assert_eq!(handlers[0].name, "PRIV_outer");
        assert_eq!(handlers[0].body_lines[0], "  function PRIV_inner() {");
    }

    #[test]
    fn test_lazy_iteration() {
        let source = "function PUB_a() {\n}\nfunction PUB_b() {\n}\n";
        let mut extractor = extract_handlers(source.lines());
        assert_eq!(extractor.next().unwrap().name, "PUB_a");
        assert_eq!(extractor.next().unwrap().name, "PUB_b");
        assert!(extractor.next().is_none());
    }
}
