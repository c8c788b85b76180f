//! Span gamut: inline constructs inside one block of text.
//!
//! Order matters. Code spans run first so their content is escaped before
//! link and emphasis rules can see it; links run before emphasis so that
//! URLs are percent-encoded out of its reach.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::email::{is_mailto, obfuscate_email};
use crate::escape::{encode_amps_and_angles, encode_code};
use crate::references::ReferenceTable;

static BACKTICK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`+").expect("invalid backtick regex"));

/// `[text][id]`, `[text] [id]` or `[text][]`, optionally prefixed by `!`.
static REFERENCE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(!?)\[([^\]]*)\] ?(?:\n *)?\[([^\]]*)\]").expect("invalid reference link regex")
});

/// `[text](url)` or `[text](url "title")`, optionally prefixed by `!`.
static INLINE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(!?)\[([^\]]*)\]\(([^'"]+?)(?:'(.+?)'|"(.+?)")?\)"#)
        .expect("invalid inline link regex")
});

/// `<scheme:address>`.
static AUTOLINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<([a-zA-Z]+):([^'">\s]+)>"#).expect("invalid autolink regex")
});

static STRONG_EM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*\*(\S(?:.*?\S)?)\*\*\*|\b___(\S(?:.*?\S)?)___\b")
        .expect("invalid strong emphasis regex")
});

static STRONG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*(\S(?:.*?\S)?)\*\*|\b__(\S(?:.*?\S)?)__\b").expect("invalid strong regex")
});

static EMPHASIS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*(\S(?:.*?\S)?)\*|\b_(\S(?:.*?\S)?)_\b").expect("invalid emphasis regex")
});

static HARD_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}\n").expect("invalid hard break regex"));

/// Escaped backtick.
const BACKTICK_ENTITY: &str = "&#96;";

/// Apply the inline rules to `text`.
pub(crate) fn run_span_gamut(text: &str, references: &ReferenceTable) -> String {
    let text = do_code_spans(text);
    let text = do_links(&text, references);
    let text = encode_amps_and_angles(&text);
    let text = do_italics_and_bold(&text);
    HARD_BREAK.replace_all(&text, "<br />\n").into_owned()
}

/// Convert backtick-delimited code spans.
///
/// A run of backticks opens a span and the next run at least as long closes
/// it. Shorter runs in between are literal backticks. A span never crosses a
/// blank line; an opener without a closer is emitted as literal backticks.
fn do_code_spans(text: &str) -> String {
    if !text.contains('`') {
        return text.to_owned();
    }

    let runs: Vec<_> = BACKTICK_RUN.find_iter(text).collect();
    let mut out = String::with_capacity(text.len() + 32);
    let mut cursor = 0;
    let mut idx = 0;
    // First blank line at or after the current opener; only moves forward.
    let mut limit = 0;

    while idx < runs.len() {
        let open = runs[idx];
        if limit < open.end() {
            limit = text[open.end()..]
                .find("\n\n")
                .map_or(text.len(), |pos| open.end() + pos);
        }
        let closer = runs[idx + 1..]
            .iter()
            .take_while(|run| run.start() < limit)
            .position(|run| run.len() >= open.len())
            .map(|offset| idx + 1 + offset);

        out.push_str(&text[cursor..open.start()]);
        let Some(close_idx) = closer else {
            out.push_str(&BACKTICK_ENTITY.repeat(open.len()));
            cursor = open.end();
            idx += 1;
            continue;
        };

        let mut content = String::new();
        let mut pos = open.end();
        for inner in &runs[idx + 1..close_idx] {
            content.push_str(&text[pos..inner.start()]);
            content.push_str(&BACKTICK_ENTITY.repeat(inner.len()));
            pos = inner.end();
        }
        content.push_str(&text[pos..runs[close_idx].start()]);

        write!(
            out,
            "<code>{}</code>",
            encode_code(content.trim_matches([' ', '\t']))
        )
        .unwrap();
        cursor = runs[close_idx].end();
        idx = close_idx + 1;
    }

    out.push_str(&text[cursor..]);
    out
}

/// Convert reference links, inline links and autolinks.
fn do_links(text: &str, references: &ReferenceTable) -> String {
    let text = REFERENCE_LINK.replace_all(text, |caps: &Captures| {
        let id = if caps[3].is_empty() { &caps[2] } else { &caps[3] };
        match references.get(id) {
            Some(link) => link_html(
                !caps[1].is_empty(),
                &link.url,
                &encode_code(&caps[2]),
                link.title.as_deref(),
            ),
            None => caps[0].to_owned(),
        }
    });

    let text = INLINE_LINK.replace_all(&text, |caps: &Captures| {
        let url = caps[3].trim_matches(['<', '>', ' ', '\n']);
        let title = caps.get(4).or_else(|| caps.get(5)).map(|m| encode_code(m.as_str()));
        link_html(
            !caps[1].is_empty(),
            url,
            &encode_code(&caps[2]),
            title.as_deref(),
        )
    });

    AUTOLINK
        .replace_all(&text, |caps: &Captures| {
            let url = &caps[0][1..caps[0].len() - 1];
            if is_mailto(url) {
                format!(
                    r#"<a href="{}">{}</a>"#,
                    obfuscate_email(url),
                    obfuscate_email(&caps[2])
                )
            } else {
                format!(r#"<a href="{}">{}</a>"#, protect_url(url), encode_code(url))
            }
        })
        .into_owned()
}

/// Render an anchor or image tag.
fn link_html(image: bool, url: &str, text: &str, title: Option<&str>) -> String {
    let url = if is_mailto(url) {
        protect_url(&obfuscate_email(url))
    } else {
        protect_url(url)
    };

    let title_attr = title.map_or_else(String::new, |t| format!(r#" title="{t}""#));
    if image {
        format!(r#"<img src="{url}" alt="{text}"{title_attr} />"#)
    } else {
        format!(r#"<a href="{url}"{title_attr}>{text}</a>"#)
    }
}

/// Percent-encode the emphasis delimiters so the emphasis pass cannot
/// touch the URL.
fn protect_url(url: &str) -> String {
    url.replace('_', "%5F").replace('*', "%2A")
}

/// Convert `***`, `**`/`__` and `*`/`_` emphasis, strongest first.
fn do_italics_and_bold(text: &str) -> String {
    let text = STRONG_EM.replace_all(text, "<strong><em>${1}${2}</em></strong>");
    let text = STRONG.replace_all(&text, "<strong>${1}${2}</strong>");
    EMPHASIS
        .replace_all(&text, "<em>${1}${2}</em>")
        .into_owned()
}
