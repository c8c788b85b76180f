//! Content-addressed store for finished HTML fragments.
//!
//! Fragments that must not be touched by later passes (raw HTML blocks,
//! generated code blocks, lists and blockquotes) are swapped out of the
//! buffer for a SHA-256 digest of their text. Paragraph formation swaps them
//! back in.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use sha2::{Digest, Sha256};

/// Any token that could be a placeholder key.
static KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9a-f]{64}\b").expect("invalid placeholder key regex"));

/// Compute the placeholder key for a fragment.
///
/// SHA-256 of the exact fragment text, hex encoded (64 characters).
#[must_use]
pub(crate) fn digest(fragment: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fragment.as_bytes());
    hex::encode(hasher.finalize())
}

/// Mapping from placeholder key to the fragment it stands for.
///
/// Entries are never overwritten: identical fragments collapse to one key.
#[derive(Debug, Default)]
pub(crate) struct PlaceholderStore {
    blocks: HashMap<String, String>,
}

impl PlaceholderStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Replace `matched` with a placeholder token.
    ///
    /// The key is the digest of `matched` as found in the buffer. The stored
    /// fragment drops the surrounding blank-line padding. Returns the token,
    /// which is the key surrounded by blank lines so that it forms its own
    /// paragraph unit.
    pub(crate) fn protect(&mut self, matched: &str) -> String {
        let key = digest(matched);
        self.blocks
            .entry(key.clone())
            .or_insert_with(|| matched.trim_matches('\n').to_owned());
        format!("\n\n{key}\n\n")
    }

    /// Look up the fragment stored under `key`.
    pub(crate) fn get(&self, key: &str) -> Option<&str> {
        self.blocks.get(key).map(String::as_str)
    }

    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Substitute every known key left in `text` with its fragment.
    ///
    /// Fragments may themselves contain keys, so substitution repeats until
    /// nothing changes. Each round resolves at least one nesting level and
    /// nesting cannot exceed the number of entries.
    pub(crate) fn restore(&self, text: &str) -> String {
        let mut current = text.to_owned();
        for _ in 0..=self.blocks.len() {
            let mut replaced = false;
            let next = KEY_PATTERN
                .replace_all(&current, |caps: &Captures| match self.get(&caps[0]) {
                    Some(fragment) => {
                        replaced = true;
                        fragment.to_owned()
                    }
                    None => caps[0].to_owned(),
                })
                .into_owned();
            current = next;
            if !replaced {
                break;
            }
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_hex() {
        let key = digest("<div>\nhello\n</div>");
        assert_eq!(key, digest("<div>\nhello\n</div>"));
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(key, digest("<div>\nbye\n</div>"));
    }

    #[test]
    fn test_protect_returns_padded_token() {
        let mut store = PlaceholderStore::new();
        let token = store.protect("<hr />");
        let key = digest("<hr />");
        assert_eq!(token, format!("\n\n{key}\n\n"));
        assert_eq!(store.get(&key), Some("<hr />"));
    }

    #[test]
    fn test_protect_strips_blank_line_padding() {
        let mut store = PlaceholderStore::new();
        let token = store.protect("\n\n<hr>\n\n");
        assert_eq!(store.get(token.trim()), Some("<hr>"));
    }

    #[test]
    fn test_identical_fragments_share_key() {
        let mut store = PlaceholderStore::new();
        let first = store.protect("<p>same</p>");
        let second = store.protect("<p>same</p>");
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_restore_nested_keys() {
        let mut store = PlaceholderStore::new();
        let inner = store.protect("<pre><code>x\n</code></pre>");
        let outer = store.protect(&format!("<blockquote>{inner}</blockquote>"));
        let restored = store.restore(outer.trim());
        assert_eq!(
            restored,
            "<blockquote>\n\n<pre><code>x\n</code></pre>\n\n</blockquote>"
        );
    }

    #[test]
    fn test_restore_leaves_unknown_hex() {
        let store = PlaceholderStore::new();
        let text = "a".repeat(64);
        assert_eq!(store.restore(&text), text);
    }
}
