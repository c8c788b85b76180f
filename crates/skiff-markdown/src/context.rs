//! Per-conversion state.

use crate::placeholder::PlaceholderStore;
use crate::references::ReferenceTable;

/// State owned by one top-level conversion and threaded through every pass.
///
/// A fresh context is built for each call, so concurrent conversions never
/// see each other's placeholders or link definitions.
#[derive(Debug)]
pub(crate) struct Context {
    pub(crate) placeholders: PlaceholderStore,
    pub(crate) references: ReferenceTable,
    /// Current list/blockquote nesting level.
    pub(crate) depth: usize,
    pub(crate) max_depth: usize,
}

impl Context {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            placeholders: PlaceholderStore::new(),
            references: ReferenceTable::new(),
            depth: 0,
            max_depth,
        }
    }
}
