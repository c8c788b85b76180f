//! Lightweight markup to HTML conversion.
//!
//! The converter is a pipeline of whole-buffer rewrites:
//!
//! 1. Normalize line endings, tabs and trailing blank lines
//! 2. Swap raw HTML blocks for content-addressed placeholders
//! 3. Collect and remove `[id]: url "title"` link definitions
//! 4. Run the block rules (headers, rules, code blocks, lists, blockquotes,
//!    paragraphs), which run the inline rules on each block
//! 5. Put the protected fragments back
//!
//! Code spans and indented code blocks escape markup characters, but an `&`
//! that already starts an entity reference is left alone. Both `` `&copy;` ``
//! and an indented `&copy;` line therefore show ©. Write `&amp;copy;` to show
//! the entity text itself.
//!
//! All state lives in a per-call context, so conversions are independent of
//! each other and safe to run concurrently.
//!
//! # Example
//!
//! ```
//! let html = skiff_markdown::convert("# Title\n\nSome *text*.");
//! assert_eq!(html, "<h1>Title</h1>\n\n<p>Some <em>text</em>.</p>\n\n");
//! ```

mod block;
mod context;
mod converter;
mod email;
mod escape;
mod normalize;
mod placeholder;
mod protect;
mod references;
mod span;

pub use converter::{Converter, DEFAULT_MAX_DEPTH, convert, render_post};
pub use email::obfuscate_email;
pub use escape::{encode_amps_and_angles, encode_code};
pub use normalize::normalize;

/// Number of columns a tab advances to, and the indentation of one nesting
/// level.
pub const TAB_WIDTH: usize = 4;
