//! Handler records and the naming convention that classifies them.
//!
//! A handler's name prefix decides everything about its deployment:
//!
//! | Prefix                                   | Registry         | Endpoint        |
//! |------------------------------------------|------------------|-----------------|
//! | `PUB_`                                   | public function  | none            |
//! | `PRIV_`                                  | private function | none            |
//! | `GET_` `POST_` `PUT_` `DELETE_` `PATCH_` | private function | `/<Resource>`   |
//! | anything else                            | not emitted      | none            |

use std::fmt;

/// Name prefixes of handlers that are carried over to the generated project,
/// in the order the invocation rewriter tries them.
pub const TRANSFERABLE_PREFIXES: [&str; 7] =
    ["GET_", "POST_", "PUT_", "DELETE_", "PATCH_", "PUB_", "PRIV_"];

/// Synthetic line appended to a handler body in place of its closing brace.
pub const END_OF_BLOCK_MARKER: &str = "};";

/// HTTP verb recognised as a handler name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpVerb {
    /// All recognised verbs.
    pub const ALL: [HttpVerb; 5] = [
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Put,
        HttpVerb::Delete,
        HttpVerb::Patch,
    ];

    /// Parse a verb token (case-sensitive, upper case only).
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|verb| verb.as_str() == token)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Patch => "PATCH",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deployment category derived from a handler name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `<VERB>_<Resource>`: private function plus an HTTPS endpoint.
    Http(HttpVerb),
    /// `PUB_<name>`: public function.
    Public,
    /// `PRIV_<name>`: private function.
    Private,
    /// No recognised prefix. Extracted but never emitted.
    Excluded,
}

impl Category {
    /// Classify a handler name.
    ///
    /// The prefix runs up to the first underscore and the remainder must be
    /// non-empty, so `PUB_` alone is excluded. Names with more underscores
    /// keep them in the remainder: `PRIV_do_thing` is private.
    pub fn from_name(name: &str) -> Self {
        let Some((prefix, rest)) = name.split_once('_') else {
            return Category::Excluded;
        };
        if rest.is_empty() {
            return Category::Excluded;
        }

        match prefix {
            "PUB" => Category::Public,
            "PRIV" => Category::Private,
            token => HttpVerb::from_token(token)
                .map(Category::Http)
                .unwrap_or(Category::Excluded),
        }
    }

    /// Whether handlers of this category get an artifact and a registry entry.
    pub fn is_transferable(&self) -> bool {
        !matches!(self, Category::Excluded)
    }

    /// Registry privacy flag: only `PUB_` handlers are callable by clients.
    pub fn is_private(&self) -> bool {
        !matches!(self, Category::Public)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Http(_) => "http",
            Category::Public => "public",
            Category::Private => "private",
            Category::Excluded => "excluded",
        }
    }
}

/// HTTPS endpoint binding derived from a `<VERB>_<Resource>` handler name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub verb: HttpVerb,
    pub resource: String,
}

impl Endpoint {
    /// Derive the endpoint for a handler name, if it has one.
    pub fn from_name(name: &str) -> Option<Self> {
        let Category::Http(verb) = Category::from_name(name) else {
            return None;
        };
        let (_, resource) = name.split_once('_')?;
        Some(Self {
            verb,
            resource: resource.to_string(),
        })
    }

    pub fn route(&self) -> String {
        format!("/{}", self.resource)
    }
}

/// A handler block recovered from a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    /// Identifier following the block keyword.
    pub name: String,

    /// Whether an `async` modifier preceded the declaration.
    pub is_async: bool,

    /// Remainder of the declaration line after `name(`, e.g. `request, response) {`.
    pub param_signature: String,

    /// Raw body lines, terminated by [`END_OF_BLOCK_MARKER`] once the block is complete.
    pub body_lines: Vec<String>,
}

impl Handler {
    pub fn new(name: impl Into<String>, is_async: bool, param_signature: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_async,
            param_signature: param_signature.into(),
            body_lines: Vec::new(),
        }
    }

    pub fn category(&self) -> Category {
        Category::from_name(&self.name)
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        Endpoint::from_name(&self.name)
    }
}
