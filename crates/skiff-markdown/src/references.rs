//! Reference-style link definitions.
//!
//! Definitions look like `[id]: http://example.com "Optional Title"`. They are
//! removed from the text before block processing and resolved later by the
//! span pass.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::{encode_amps_and_angles, encode_code};

/// A definition line: up to three leading spaces, `[id]:`, the address
/// (optionally in angle brackets) and an optional quoted or parenthesized
/// title. Whitespace around the address may span one line break.
static DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^ {0,3}\[([^\]]+)\]: *\n? *<?(\S+?)>? *\n? *(?:["'(](.+?)["')])? *$"#,
    )
    .expect("invalid link definition regex")
});

/// Target of a reference-style link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LinkReference {
    /// Address, ampersand and angle-bracket encoded.
    pub(crate) url: String,
    /// Title, entity-escaped.
    pub(crate) title: Option<String>,
}

/// Link definitions keyed by lowercased id.
#[derive(Debug, Default)]
pub(crate) struct ReferenceTable {
    links: HashMap<String, LinkReference>,
}

impl ReferenceTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record a definition. A later definition of the same id replaces the
    /// earlier one.
    pub(crate) fn insert(&mut self, id: &str, reference: LinkReference) {
        self.links.insert(id.to_lowercase(), reference);
    }

    /// Look up an id, ignoring case.
    pub(crate) fn get(&self, id: &str) -> Option<&LinkReference> {
        self.links.get(&id.to_lowercase())
    }

    pub(crate) fn len(&self) -> usize {
        self.links.len()
    }
}

/// Remove link definitions from `text`, recording them in `table`.
pub(crate) fn strip_link_definitions(text: &str, table: &mut ReferenceTable) -> String {
    DEFINITION
        .replace_all(text, |caps: &Captures| {
            let title = caps
                .get(3)
                .map(|m| encode_code(m.as_str()))
                .filter(|t| !t.is_empty());
            table.insert(
                &caps[1],
                LinkReference {
                    url: encode_amps_and_angles(&caps[2]),
                    title,
                },
            );
            String::new()
        })
        .into_owned()
}
