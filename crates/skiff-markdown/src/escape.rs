//! Entity encoding helpers shared by the block and span passes.

use std::sync::LazyLock;

use regex::Regex;

/// Characters that carry meaning for markup or HTML and must not survive
/// literally inside code.
const CODE_SIGNIFICANT: &[char] = &[
    '&', '\'', '<', '>', '"', '*', '{', '}', '[', ']', '_', '\\',
];

/// Anchored pattern for an entity reference starting at `&`.
static ENTITY_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z][A-Za-z0-9]*);")
        .expect("invalid entity regex")
});

/// Escape markup-significant characters for use inside `<code>`.
///
/// Returns the input unchanged when it contains none of the significant
/// characters. An `&` that already starts an entity reference is kept, so
/// escaping escaped text is a no-op.
///
/// # Examples
///
/// ```
/// use skiff_markdown::encode_code;
///
/// assert_eq!(encode_code("a < b"), "a &lt; b");
/// assert_eq!(encode_code(&encode_code("*x*")), "&#42;x&#42;");
/// ```
pub fn encode_code(text: &str) -> String {
    if !text.contains(CODE_SIGNIFICANT) {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len() + text.len() / 2);
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' if starts_entity(&text[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            '*' => out.push_str("&#42;"),
            '_' => out.push_str("&#95;"),
            '{' => out.push_str("&#123;"),
            '}' => out.push_str("&#125;"),
            '[' => out.push_str("&#91;"),
            ']' => out.push_str("&#93;"),
            '\\' => out.push_str("&#92;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Encode ampersands and angle brackets that cannot be part of HTML.
///
/// An `&` is kept when it starts an entity reference, otherwise it becomes
/// `&amp;`. A `<` is kept when followed by a letter, `/`, `?`, `$` or `!`
/// (something that looks like a tag), otherwise it becomes `&lt;`.
///
/// # Examples
///
/// ```
/// use skiff_markdown::encode_amps_and_angles;
///
/// assert_eq!(encode_amps_and_angles("AT&T &copy; <b>"), "AT&amp;T &copy; <b>");
/// assert_eq!(encode_amps_and_angles("1 < 2"), "1 &lt; 2");
/// ```
pub fn encode_amps_and_angles(text: &str) -> String {
    if !text.contains(['&', '<']) {
        return text.to_owned();
    }

    let mut out = String::with_capacity(text.len() + 16);
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' if !starts_entity(&text[idx..]) => out.push_str("&amp;"),
            '<' if !starts_tag(&text[idx + 1..]) => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn starts_entity(rest: &str) -> bool {
    ENTITY_PREFIX.is_match(rest)
}

fn starts_tag(after: &str) -> bool {
    after
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || matches!(c, '/' | '?' | '$' | '!'))
}
