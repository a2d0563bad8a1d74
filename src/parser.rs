//! Command text parsing.
//!
//! Pure classification of raw input text: either the text is addressed to
//! this tool (first token matches a configured invocation prefix) and the
//! argument tail is extracted, or it is someone else's text and `None` is
//! returned. Not-mine is a normal signal, never an error; the parser never
//! panics for any input.

/// Ordered set of invocation prefixes that identify input directed at this
/// tool. Immutable after construction; duplicates are dropped, first
/// occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationPrefixSet {
    prefixes: Vec<String>,
}

impl InvocationPrefixSet {
    /// Build a prefix set, preserving order and dropping duplicates.
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for p in prefixes {
            let p = p.into();
            if !out.contains(&p) {
                out.push(p);
            }
        }
        Self { prefixes: out }
    }

    /// Whether `token` exactly (case-sensitively) matches a prefix.
    pub fn contains(&self, token: &str) -> bool {
        self.prefixes.iter().any(|p| p == token)
    }

    /// The prefixes in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.prefixes.iter().map(String::as_str)
    }

    /// True when no prefixes are configured (the parser matches nothing).
    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

/// Parser for raw command-like input text.
#[derive(Debug, Clone)]
pub struct InvocationParser {
    prefixes: InvocationPrefixSet,
}

impl InvocationParser {
    /// Create a parser over the given prefix set.
    pub fn new(prefixes: InvocationPrefixSet) -> Self {
        Self { prefixes }
    }

    /// The configured prefix set.
    pub fn prefixes(&self) -> &InvocationPrefixSet {
        &self.prefixes
    }

    /// Parse `raw` into the argument tail, or `None` when the text is not
    /// addressed to this tool.
    ///
    /// Splitting is on the single-space delimiter. With
    /// `keep_trailing_empty = false` (chat interception) trailing empty
    /// fields are discarded; with `true` (tab-complete) they are preserved,
    /// so a trailing space yields one empty trailing argument requesting the
    /// next argument's suggestions.
    pub fn parse(&self, raw: &str, keep_trailing_empty: bool) -> Option<Vec<String>> {
        let mut tokens: Vec<&str> = raw.split(' ').collect();
        if !keep_trailing_empty {
            while tokens.last() == Some(&"") {
                tokens.pop();
            }
        }

        let first = tokens.first()?;
        if !self.prefixes.contains(first) {
            return None;
        }

        Some(tokens[1..].iter().map(|s| s.to_string()).collect())
    }
}
