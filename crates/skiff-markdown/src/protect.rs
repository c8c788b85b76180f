//! Block-level HTML protection.
//!
//! Finds HTML blocks that start at column 0 and swaps them for placeholder
//! tokens so that no later pass rewrites them or wraps them in `<p>`.
//! Matching is per tag name and stops at the first literal closing tag of
//! that name; nested elements of the same name are not balanced.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::placeholder::PlaceholderStore;

/// Tags whose closing tag must start at column 0.
const STRICT_TAGS: &[&str] = &[
    "p",
    "div",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "blockquote",
    "pre",
    "table",
    "dl",
    "ol",
    "ul",
    "script",
    "noscript",
    "form",
    "fieldset",
    "iframe",
    "math",
];

/// Tags matched only by the permissive pass.
const EXTENDED_TAGS: &[&str] = &["ins", "del"];

/// Matchers for one tag name.
struct TagMatcher {
    name: &'static str,
    /// Closing tag on a line of its own.
    strict: Regex,
    /// Closing tag anywhere on the final line.
    permissive: Regex,
}

static TAG_MATCHERS: LazyLock<Vec<TagMatcher>> = LazyLock::new(|| {
    STRICT_TAGS
        .iter()
        .chain(EXTENDED_TAGS)
        .map(|&name| TagMatcher {
            name,
            strict: Regex::new(&format!(r"(?m)^<{name}\b(?:.*\n)*?</{name}> *$"))
                .expect("invalid strict block regex"),
            permissive: Regex::new(&format!(r"(?m)^<{name}\b(?:.*\n)*?.*</{name}> *$"))
                .expect("invalid permissive block regex"),
        })
        .collect()
});

/// Opening tags of the strict tier at the start of a line.
static STRICT_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^<({})\b", STRICT_TAGS.join("|")))
        .expect("invalid strict opener regex")
});

/// Opening tags of the extended tier at the start of a line.
static EXTENDED_OPENER: LazyLock<Regex> = LazyLock::new(|| {
    let tags: Vec<&str> = STRICT_TAGS.iter().chain(EXTENDED_TAGS).copied().collect();
    Regex::new(&format!(r"(?m)^<({})\b", tags.join("|")))
        .expect("invalid extended opener regex")
});

/// Standalone `<hr>` after a blank line (or at the start) and before one.
static HR_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\n\n|\A\n?) {0,3}<hr\b[^<>]*?/?> *\n\n+").expect("invalid hr block regex")
});

/// Run of HTML comments bounded by blank lines.
static COMMENT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(?:\n\n|\A\n?) {0,3}(?:<!--.*?--\s*)+> *\n\n+")
        .expect("invalid comment block regex")
});

/// Replace HTML blocks in `text` with placeholder tokens.
pub(crate) fn hash_html_blocks(text: &str, store: &mut PlaceholderStore) -> String {
    let mut text = text.to_owned();

    for matcher in observed(&STRICT_OPENER, &text) {
        text = matcher
            .strict
            .replace_all(&text, |caps: &Captures| store.protect(&caps[0]))
            .into_owned();
    }

    for matcher in observed(&EXTENDED_OPENER, &text) {
        text = matcher
            .permissive
            .replace_all(&text, |caps: &Captures| store.protect(&caps[0]))
            .into_owned();
    }

    let text = protect_all(&HR_BLOCK, text, store);
    protect_all(&COMMENT_BLOCK, text, store)
}

/// Matchers for the tag names that open a line in `text`, in order of first
/// appearance.
fn observed(opener: &Regex, text: &str) -> Vec<&'static TagMatcher> {
    let mut found: Vec<&'static TagMatcher> = Vec::new();
    for caps in opener.captures_iter(text) {
        let name = &caps[1];
        if found.iter().any(|m| m.name == name) {
            continue;
        }
        if let Some(matcher) = TAG_MATCHERS.iter().find(|m| m.name == name) {
            found.push(matcher);
        }
    }
    found
}

/// Protect every match of a blank-line-delimited pattern.
///
/// A match consumes the blank lines after it, which the next adjacent block
/// needs as its prefix. The inserted token restores that padding, so the
/// pattern is applied until the text stops changing.
fn protect_all(pattern: &Regex, mut text: String, store: &mut PlaceholderStore) -> String {
    loop {
        let next = pattern
            .replace_all(&text, |caps: &Captures| store.protect(&caps[0]))
            .into_owned();
        if next == text {
            return text;
        }
        text = next;
    }
}
