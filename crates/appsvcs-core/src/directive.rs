//! Line-editing directives embedded in handler bodies.
//!
//! An annotation line such as `// ACTION: UNCOMMENT` edits the single line
//! that follows it:
//!
//! ```text
//! // ACTION: UNCOMMENT
//! //const docs = await coll.find(filter, projection).toArray();   ->  const docs = ...
//! // ACTION: REMOVE
//! const docs = await coll.find(filter, options).toArray();        ->  (dropped)
//! ```
//!
//! Lines with no pending directive get the platform accessor substitution.

use std::sync::LazyLock;

use regex::Regex;

static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ACTION:\s*(\S+)").expect("valid directive regex"));

/// Environment accessor used by handlers when run standalone.
pub const ENV_ACCESSOR: &str = "context_values_get";

/// Platform equivalent of [`ENV_ACCESSOR`].
pub const PLATFORM_ENV_ACCESSOR: &str = "context.values.get";

const COMMENT_MARKER: &str = "//";

/// A one-shot edit applied to the line after its annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Comment,
    Uncomment,
    Remove,
}

impl Directive {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "COMMENT" => Some(Directive::Comment),
            "UNCOMMENT" => Some(Directive::Uncomment),
            "REMOVE" => Some(Directive::Remove),
            _ => None,
        }
    }

    /// Apply the directive to a line. `None` means the line is dropped.
    pub fn apply(self, line: &str) -> Option<String> {
        match self {
            Directive::Remove => None,
            Directive::Comment => Some(format!("  {COMMENT_MARKER}{line}")),
            Directive::Uncomment => Some(line.replacen(COMMENT_MARKER, "", 1)),
        }
    }
}

/// Parse an annotation line.
///
/// Returns `None` if the line is not an annotation, `Some(None)` if it is one
/// with an unrecognised token.
pub fn parse_annotation(line: &str) -> Option<Option<Directive>> {
    ANNOTATION_RE
        .captures(line)
        .map(|caps| Directive::from_token(&caps[1]))
}

/// State of the directive scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectiveState {
    #[default]
    Idle,
    Pending(Directive),
}

/// A body line after directive processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveLine {
    /// Passed through the idle path; eligible for call rewriting.
    Plain(String),
    /// Produced by a directive; emitted as is.
    Directed(String),
}

impl EffectiveLine {
    pub fn text(&self) -> &str {
        match self {
            EffectiveLine::Plain(text) | EffectiveLine::Directed(text) => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            EffectiveLine::Plain(text) | EffectiveLine::Directed(text) => text,
        }
    }
}

/// Two-state machine applying directives over a line scan.
#[derive(Debug, Default)]
pub struct DirectiveProcessor {
    state: DirectiveState,
}

impl DirectiveProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DirectiveState {
        self.state
    }

    /// Feed one line, returning what it contributes to the effective body.
    pub fn process_line(&mut self, line: &str) -> Option<EffectiveLine> {
        if let Some(directive) = parse_annotation(line) {
            // Last annotation wins when two arrive back to back.
            self.state = match directive {
                Some(directive) => DirectiveState::Pending(directive),
                None => {
                    tracing::warn!("Ignoring unrecognised directive: {}", line.trim());
                    DirectiveState::Idle
                }
            };
            return None;
        }

        match std::mem::take(&mut self.state) {
            DirectiveState::Idle => Some(EffectiveLine::Plain(
                line.replace(ENV_ACCESSOR, PLATFORM_ENV_ACCESSOR),
            )),
            DirectiveState::Pending(directive) => directive.apply(line).map(EffectiveLine::Directed),
        }
    }
}

/// Apply directives to a whole body.
pub fn apply_directives<I, S>(lines: I) -> Vec<EffectiveLine>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut processor = DirectiveProcessor::new();
    lines
        .into_iter()
        .filter_map(|line| processor.process_line(line.as_ref()))
        .collect()
}
