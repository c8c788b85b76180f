//! Top-level conversion entry points.

use crate::block::run_block_gamut;
use crate::context::Context;
use crate::normalize::normalize;
use crate::protect::hash_html_blocks;
use crate::references::strip_link_definitions;

/// Default limit for list and blockquote nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Markup to HTML converter.
///
/// Holds only immutable options. Every call builds its own conversion state,
/// so one converter can be shared freely between threads.
///
/// # Example
///
/// ```
/// use skiff_markdown::Converter;
///
/// let html = Converter::new().convert("Hello *world*");
/// assert_eq!(html, "<p>Hello <em>world</em></p>\n\n");
/// ```
#[derive(Clone, Debug)]
pub struct Converter {
    max_depth: usize,
}

impl Converter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Limit how deep lists and blockquotes are processed recursively.
    ///
    /// Bodies nested deeper than `depth` keep their inline formatting but are
    /// not split into paragraphs, lists or quotes.
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Convert `text` to HTML.
    ///
    /// Never fails: constructs that cannot be parsed are rendered as text.
    #[must_use]
    pub fn convert(&self, text: &str) -> String {
        let mut ctx = Context::new(self.max_depth);

        let text = normalize(text);
        let text = hash_html_blocks(&text, &mut ctx.placeholders);
        let text = strip_link_definitions(&text, &mut ctx.references);
        let html = run_block_gamut(&text, &mut ctx);
        let html = ctx.placeholders.restore(&html);

        tracing::debug!(
            placeholders = ctx.placeholders.len(),
            references = ctx.references.len(),
            "Conversion completed"
        );
        html
    }

    /// Convert a post made of a lead (excerpt) and a body.
    ///
    /// The two parts are rendered as one document, so link definitions in
    /// either part apply to both.
    #[must_use]
    pub fn render_post(&self, lead: &str, body: &str) -> String {
        let mut text = String::with_capacity(lead.len() + body.len());
        text.push_str(lead);
        text.push_str(body);
        self.convert(&text)
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert `text` to HTML with default options.
#[must_use]
pub fn convert(text: &str) -> String {
    Converter::new().convert(text)
}

/// Convert a lead and body with default options.
#[must_use]
pub fn render_post(lead: &str, body: &str) -> String {
    Converter::new().render_post(lead, body)
}
