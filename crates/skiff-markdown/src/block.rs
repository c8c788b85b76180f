//! Block gamut: headers, rules, code blocks, lists, blockquotes and
//! paragraphs.
//!
//! The rules run in a fixed order over the whole buffer. Every rule that
//! produces finished HTML registers it in the placeholder store so that the
//! rules after it, and paragraph formation, leave it alone.

use std::fmt::Write;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::context::Context;
use crate::escape::encode_code;
use crate::placeholder::PlaceholderStore;
use crate::protect::hash_html_blocks;
use crate::span::run_span_gamut;

static SETEXT_H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(.+?) *\n=+ *\n+").expect("invalid setext h1 regex"));

static SETEXT_H2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(.+?) *\n-+ *\n+").expect("invalid setext h2 regex"));

static ATX_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(#{1,6}) *(.+?) *#*\n+").expect("invalid atx header regex"));

static HORIZONTAL_RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^ {0,3}(?:(?:\* ?){3,}|(?:- ?){3,}|(?:_ ?){3,}) *$")
        .expect("invalid horizontal rule regex")
});

/// Indented lines after a blank line, trailing blank lines included.
static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\n\n|\A\n?)((?: {4}.*\n+)+)").expect("invalid code block regex")
});

/// A marker line followed by lazy continuation lines, indented lines and
/// further marker lines. Blank lines stay inside the list only when the
/// next line continues it.
static LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:[*+-]|\d+\.) .+\n(?:\S.*\n|\n*(?:[*+-]|\d+\.)? .+\n)*")
        .expect("invalid list regex")
});

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^(?:[*+-]|\d+\.) ").expect("invalid list marker regex"));

static BLOCKQUOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\A|\n+)((?:> .+\n(?:.+\n)*\n*)+)").expect("invalid blockquote regex")
});

static QUOTE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^> ?").expect("invalid quote prefix regex"));

/// One level of indentation.
static INDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?m)^ {{1,{}}}", crate::TAB_WIDTH)).expect("invalid indent regex")
});

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n+").expect("invalid paragraph break regex"));

/// Run the block rules over `text`, which must end with a blank line.
pub(crate) fn run_block_gamut(text: &str, ctx: &mut Context) -> String {
    let text = do_headers(text);
    let text = HORIZONTAL_RULE.replace_all(&text, "\n<hr />\n");
    let text = do_code_blocks(&text, &mut ctx.placeholders);
    let text = run_span_gamut(&text, &ctx.references);
    let text = do_lists(&text, ctx);
    let text = do_blockquotes(&text, ctx);
    let text = hash_html_blocks(&text, &mut ctx.placeholders);
    form_paragraphs(&text, &ctx.placeholders)
}

fn do_headers(text: &str) -> String {
    let text = SETEXT_H1.replace_all(text, "<h1>${1}</h1>\n\n");
    let text = SETEXT_H2.replace_all(&text, "<h2>${1}</h2>\n\n");
    ATX_HEADER
        .replace_all(&text, |caps: &Captures| {
            let level = caps[1].len();
            format!("<h{level}>{}</h{level}>\n\n", &caps[2])
        })
        .into_owned()
}

fn do_code_blocks(text: &str, store: &mut PlaceholderStore) -> String {
    CODE_BLOCK
        .replace_all(text, |caps: &Captures| {
            let code = encode_code(&outdent(&caps[1]));
            store.protect(&format!(
                "<pre><code>{}\n</code></pre>",
                code.trim_matches('\n')
            ))
        })
        .into_owned()
}

fn do_lists(text: &str, ctx: &mut Context) -> String {
    LIST.replace_all(text, |caps: &Captures| {
        let list = &caps[0];
        let tag = if list.starts_with(|c: char| c.is_ascii_digit()) {
            "ol"
        } else {
            "ul"
        };

        let mut html = format!("<{tag}>\n");
        for item in LIST_MARKER.split(list) {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            let body = if item.contains('\n') {
                run_nested(&outdent(item), ctx)
            } else {
                item.to_owned()
            };
            writeln!(html, "<li>{body}</li>").unwrap();
        }
        write!(html, "</{tag}>").unwrap();

        ctx.placeholders.protect(&html)
    })
    .into_owned()
}

fn do_blockquotes(text: &str, ctx: &mut Context) -> String {
    BLOCKQUOTE
        .replace_all(text, |caps: &Captures| {
            let body = QUOTE_PREFIX.replace_all(caps[1].trim(), "");
            let inner = run_nested(&body, ctx);
            ctx.placeholders
                .protect(&format!("<blockquote>\n{inner}\n</blockquote>"))
        })
        .into_owned()
}

/// Run the block gamut over a list item or blockquote body.
///
/// Past the depth limit the body is returned as is; it has already been
/// through the span gamut of the enclosing block.
fn run_nested(body: &str, ctx: &mut Context) -> String {
    if ctx.depth >= ctx.max_depth {
        tracing::warn!(
            depth = ctx.depth,
            "Nesting limit reached, skipping block rules for nested body"
        );
        return body.trim().to_owned();
    }

    ctx.depth += 1;
    let html = run_block_gamut(&format!("{body}\n\n"), ctx);
    ctx.depth -= 1;
    html.trim().to_owned()
}

/// Strip one level of indentation from every line.
fn outdent(text: &str) -> String {
    INDENT.replace_all(text, "").into_owned()
}

/// Wrap the remaining text runs in `<p>` and swap placeholder keys back for
/// their fragments.
fn form_paragraphs(text: &str, store: &PlaceholderStore) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for unit in PARAGRAPH_BREAK.split(text.trim()) {
        let unit = unit.trim();
        if unit.is_empty() {
            continue;
        }
        match store.get(unit) {
            Some(fragment) => out.push_str(fragment),
            None => write!(out, "<p>{unit}</p>").unwrap(),
        }
        out.push_str("\n\n");
    }
    out
}
