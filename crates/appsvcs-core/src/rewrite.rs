//! Cross-handler invocation rewriting.
//!
//! Deployed functions cannot reference each other as plain values, so every
//! call to another transferable handler is routed through the platform's
//! name-based dispatch:
//!
//! ```text
//! const num = await PRIV_count(coll, filter);
//! const num = await context.functions.execute('PRIV_count', coll, filter);
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::directive::EffectiveLine;
use crate::handler::TRANSFERABLE_PREFIXES;

static CALL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    TRANSFERABLE_PREFIXES
        .iter()
        .map(|prefix| {
            Regex::new(&format!(
                r"^(.*)({}.*)\((.*)\)(.*)$",
                regex::escape(prefix)
            ))
            .expect("valid call-site regex")
        })
        .collect()
});

/// A call to a transferable handler found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite<'a> {
    /// Text before the callee.
    pub leading: &'a str,
    /// Callee name.
    pub handler: &'a str,
    /// Raw argument text, empty when called without arguments.
    pub args: &'a str,
    /// Text after the closing parenthesis.
    pub trailing: &'a str,
}

impl CallSite<'_> {
    /// Argument text, if any.
    pub fn args(&self) -> Option<&str> {
        (!self.args.is_empty()).then_some(self.args)
    }

    /// Render the line with the call replaced by the dispatcher's expression.
    pub fn render<D: Dispatcher + ?Sized>(&self, dispatcher: &D) -> String {
        format!(
            "{}{}{}",
            self.leading,
            dispatcher.dispatch_expr(self.handler, self.args()),
            self.trailing
        )
    }
}

/// Find the call site to rewrite in a line.
///
/// Prefixes are tried in order and the first that matches wins, so at most
/// one call per line is found.
pub fn find_call_site(line: &str) -> Option<CallSite<'_>> {
    CALL_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(line)?;
        Some(CallSite {
            leading: caps.get(1)?.as_str(),
            handler: caps.get(2)?.as_str(),
            args: caps.get(3)?.as_str(),
            trailing: caps.get(4)?.as_str(),
        })
    })
}

/// Platform capability: invoke a deployed handler by name with an argument list.
pub trait Dispatcher {
    /// Expression that invokes `handler` with the given argument text.
    fn dispatch_expr(&self, handler: &str, args: Option<&str>) -> String;
}

/// App Services dispatch through `context.functions.execute`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppServicesDispatch;

impl Dispatcher for AppServicesDispatch {
    fn dispatch_expr(&self, handler: &str, args: Option<&str>) -> String {
        match args {
            Some(args) => format!("context.functions.execute('{handler}', {args})"),
            None => format!("context.functions.execute('{handler}')"),
        }
    }
}

/// Rewrites the effective body of a handler.
#[derive(Debug, Clone, Default)]
pub struct InvocationRewriter<D = AppServicesDispatch> {
    dispatcher: D,
}

impl<D: Dispatcher> InvocationRewriter<D> {
    pub fn new(dispatcher: D) -> Self {
        Self { dispatcher }
    }

    /// Rewrite a single line, borrowing it unchanged when it has no call site.
    pub fn rewrite_line<'a>(&self, line: &'a str) -> Cow<'a, str> {
        match find_call_site(line) {
            Some(call) => Cow::Owned(call.render(&self.dispatcher)),
            None => Cow::Borrowed(line),
        }
    }

    /// Rewrite an effective body. Directive output is passed through untouched.
    pub fn rewrite_body(&self, lines: Vec<EffectiveLine>) -> Vec<String> {
        lines
            .into_iter()
            .map(|line| match line {
                EffectiveLine::Plain(text) => self.rewrite_line(&text).into_owned(),
                EffectiveLine::Directed(text) => text,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(line: &str) -> String {
        InvocationRewriter::<AppServicesDispatch>::default()
            .rewrite_line(line)
            .into_owned()
    }

    #[test]
    fn test_call_site_with_args() {
        let call = find_call_site("  const coll = PRIV_getDBCollection(a, b);").unwrap();
        assert_eq!(call.leading, "  const coll = ");
        assert_eq!(call.handler, "PRIV_getDBCollection");
        assert_eq!(call.args(), Some("a, b"));
        assert_eq!(call.trailing, ";");
    }

    #[test]
    fn test_rewrite_with_args() {
        assert_eq!(
            rewrite("  return PRIV_logError(error, response);"),
            "  return context.functions.execute('PRIV_logError', error, response);"
        );
    }

    #[test]
    fn test_rewrite_without_args() {
        assert_eq!(
            rewrite("  const num = await PRIV_querySomething();"),
            "  const num = await context.functions.execute('PRIV_querySomething');"
        );
    }

    #[test]
    fn test_rewrite_keeps_trailing_member_access() {
        assert_eq!(
            rewrite("  const name = PRIV_getConstants().COLL_NAME;"),
            "  const name = context.functions.execute('PRIV_getConstants').COLL_NAME;"
        );
    }

    #[test]
    fn test_rewrite_nested_in_outer_call() {
        assert_eq!(
            rewrite("  console.log(PUB_ping(x));"),
            "  console.log(context.functions.execute('PUB_ping', x));"
        );
    }

    #[test]
    fn test_no_call_passes_through() {
        let rewriter = InvocationRewriter::<AppServicesDispatch>::default();
        let line = "  const x = helper(1);";
        assert!(matches!(rewriter.rewrite_line(line), Cow::Borrowed(_)));
        assert_eq!(rewriter.rewrite_line("  PRIV_flag = true;"), "  PRIV_flag = true;");
    }

    #[test]
    fn test_first_matching_prefix_wins() {
        let call = find_call_site("  PRIV_a(GET_b(1));").unwrap();
        // GET_ is tried before PRIV_.
        assert_eq!(call.handler, "GET_b");
        assert_eq!(call.leading, "  PRIV_a(");

        let out = rewrite("  PRIV_a(1); PUB_b(2);");
        assert_eq!(out.matches("context.functions.execute").count(), 1);
    }

    #[test]
    fn test_directed_lines_are_not_rewritten() {
        let rewriter = InvocationRewriter::<AppServicesDispatch>::default();
        let out = rewriter.rewrite_body(vec![
            EffectiveLine::Directed("  //PRIV_x();".to_string()),
            EffectiveLine::Plain("  PRIV_x();".to_string()),
        ]);
        assert_eq!(out, ["  //PRIV_x();", "  context.functions.execute('PRIV_x');"]);
    }

    struct NamedCall;

    impl Dispatcher for NamedCall {
        fn dispatch_expr(&self, handler: &str, args: Option<&str>) -> String {
            format!("invoke({handler:?}, [{}])", args.unwrap_or_default())
        }
    }

    #[test]
    fn test_custom_dispatcher() {
        let rewriter = InvocationRewriter::new(NamedCall);
        assert_eq!(
            rewriter.rewrite_line("x = PRIV_sum(1, 2);"),
            r#"x = invoke("PRIV_sum", [1, 2]);"#
        );
    }
}
