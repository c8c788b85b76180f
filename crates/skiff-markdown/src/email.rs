//! Scraper-resistant encoding of `mailto:` addresses.

use std::fmt::Write;

use rand::RngExt;

/// Encode every character of `address` as itself, a decimal entity or a hex
/// entity, picked at random per character.
///
/// `@` and `:` are always encoded. The output differs between calls; it is
/// only stable after entity decoding.
///
/// # Examples
///
/// ```
/// use skiff_markdown::obfuscate_email;
///
/// let encoded = obfuscate_email("mailto:me@example.com");
/// assert!(!encoded.contains('@'));
/// ```
#[must_use]
pub fn obfuscate_email(address: &str) -> String {
    let mut rng = rand::rng();
    let mut out = String::with_capacity(address.len() * 6);

    for ch in address.chars() {
        let choice = if matches!(ch, '@' | ':') {
            rng.random_range(1..3u8)
        } else {
            rng.random_range(0..3u8)
        };
        let code = u32::from(ch);
        match choice {
            0 => out.push(ch),
            1 => write!(out, "&#{code};").unwrap(),
            _ => write!(out, "&#x{code:X};").unwrap(),
        }
    }
    out
}

/// Returns `true` when `url` uses the `mailto:` scheme.
pub(crate) fn is_mailto(url: &str) -> bool {
    url.get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::LazyLock;

    use regex::{Captures, Regex};

    use super::*;

    static NUMERIC_ENTITY: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"&#([xX]?)([0-9a-fA-F]+);").unwrap());

    /// Decode the numeric entities produced by [`obfuscate_email`].
    pub(crate) fn decode_entities(text: &str) -> String {
        NUMERIC_ENTITY
            .replace_all(text, |caps: &Captures| {
                let radix = if caps[1].is_empty() { 10 } else { 16 };
                let code = u32::from_str_radix(&caps[2], radix).unwrap();
                char::from_u32(code).unwrap().to_string()
            })
            .into_owned()
    }

    #[test]
    fn test_obfuscated_address_decodes_to_original() {
        for _ in 0..50 {
            let encoded = obfuscate_email("mailto:someone@example.com");
            assert_eq!(decode_entities(&encoded), "mailto:someone@example.com");
        }
    }

    #[test]
    fn test_at_and_colon_never_literal() {
        for _ in 0..50 {
            let encoded = obfuscate_email("mailto:a@b.c");
            assert!(!encoded.contains('@'), "{encoded}");
            assert!(!encoded.contains(':'), "{encoded}");
        }
    }

    #[test]
    fn test_non_ascii_characters() {
        let encoded = obfuscate_email("mailto:jürgen@exämple.de");
        assert_eq!(decode_entities(&encoded), "mailto:jürgen@exämple.de");
    }

    #[test]
    fn test_empty_address() {
        assert_eq!(obfuscate_email(""), "");
    }

    #[test]
    fn test_is_mailto() {
        assert!(is_mailto("mailto:a@b.c"));
        assert!(is_mailto("MAILTO:a@b.c"));
        assert!(!is_mailto("http://a.b"));
        assert!(!is_mailto("mail"));
    }
}
