//! The annotation sink: where rule engines publish their results.
//!
//! The sink stands in for the host's two output channels:
//!
//! - **diagnostic collections**, one per rule, each mapping a document URI to its diagnostics;
//! - **decoration sets**, keyed by `(editor, style)`, painted with a registered
//!   [`DecorationStyle`].
//!
//! Engines never mutate published state in place. They hand the sink a batch of
//! [`AnnotationEdit`]s that each replace one list wholesale; [`AnnotationSink::apply`] runs the
//! whole batch before any subscriber hears about it.

use crate::decorations::{Decoration, DecorationStyle, StyleHandle};
use crate::diagnostics::Diagnostic;
use crate::workspace::EditorId;
use std::collections::BTreeMap;
use tracing::debug;

/// Handle to a diagnostic collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionId(u64);

impl CollectionId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A wholesale replacement of published annotation state.
#[derive(Debug, Clone)]
pub enum AnnotationEdit {
    /// Replace the diagnostics of one document in one collection.
    ReplaceDiagnostics {
        /// Target collection.
        collection: CollectionId,
        /// Document URI.
        uri: String,
        /// The complete new list (empty clears the entry).
        diagnostics: Vec<Diagnostic>,
    },
    /// Replace the decorations drawn with one style in one editor.
    ReplaceDecorations {
        /// Target editor.
        editor: EditorId,
        /// Decoration style.
        style: StyleHandle,
        /// The complete new list (empty clears the entry).
        decorations: Vec<Decoration>,
    },
}

/// What kind of published state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkChangeType {
    /// Diagnostics were replaced or cleared.
    DiagnosticsChanged,
    /// Decorations were replaced or cleared.
    DecorationsChanged,
    /// A collection or style was created or released.
    ResourcesChanged,
}

/// A sink change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkChange {
    /// Change kind.
    pub change_type: SinkChangeType,
    /// Sink version before the change.
    pub old_version: u64,
    /// Sink version after the change.
    pub new_version: u64,
}

/// Sink change callback function type.
pub type SinkChangeCallback = Box<dyn FnMut(&SinkChange) + Send>;

#[derive(Debug, Default)]
struct DiagnosticCollection {
    name: String,
    entries: BTreeMap<String, Vec<Diagnostic>>,
}

/// In-memory diagnostics + decorations store.
#[derive(Default)]
pub struct AnnotationSink {
    next_collection_id: u64,
    collections: BTreeMap<CollectionId, DiagnosticCollection>,

    next_style_id: u64,
    styles: BTreeMap<StyleHandle, DecorationStyle>,
    decorations: BTreeMap<(EditorId, StyleHandle), Vec<Decoration>>,

    version: u64,
    callbacks: Vec<SinkChangeCallback>,
}

impl std::fmt::Debug for AnnotationSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationSink")
            .field("collection_count", &self.collections.len())
            .field("style_count", &self.styles.len())
            .field("decoration_sets", &self.decorations.len())
            .field("version", &self.version)
            .finish()
    }
}

impl AnnotationSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version; incremented once per notified change.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Subscribe to change notifications.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: FnMut(&SinkChange) + Send + 'static,
    {
        self.callbacks.push(Box::new(callback));
    }

    // ---- collections ----

    /// Create a diagnostic collection.
    pub fn create_collection(&mut self, name: impl Into<String>) -> CollectionId {
        let id = CollectionId(self.next_collection_id);
        self.next_collection_id = self.next_collection_id.saturating_add(1);
        self.collections.insert(
            id,
            DiagnosticCollection {
                name: name.into(),
                entries: BTreeMap::new(),
            },
        );
        self.notify([SinkChangeType::ResourcesChanged]);
        id
    }

    /// Returns the collection's name, or `None` if it does not exist.
    pub fn collection_name(&self, id: CollectionId) -> Option<&str> {
        self.collections.get(&id).map(|c| c.name.as_str())
    }

    /// Returns the number of live collections.
    pub fn collection_count(&self) -> usize {
        self.collections.len()
    }

    /// Diagnostics published by one collection for one document.
    pub fn diagnostics(&self, collection: CollectionId, uri: &str) -> &[Diagnostic] {
        self.collections
            .get(&collection)
            .and_then(|c| c.entries.get(uri))
            .map_or(&[], Vec::as_slice)
    }

    /// All diagnostics for a document across collections (the problems-panel view).
    pub fn diagnostics_for_uri(&self, uri: &str) -> Vec<&Diagnostic> {
        self.collections
            .values()
            .filter_map(|c| c.entries.get(uri))
            .flatten()
            .collect()
    }

    /// URIs that currently have at least one diagnostic, in sorted order.
    pub fn uris_with_diagnostics(&self) -> Vec<&str> {
        let mut uris: Vec<&str> = self
            .collections
            .values()
            .flat_map(|c| c.entries.keys().map(String::as_str))
            .collect();
        uris.sort_unstable();
        uris.dedup();
        uris
    }

    /// Total number of published diagnostics.
    pub fn diagnostic_count(&self) -> usize {
        self.collections
            .values()
            .flat_map(|c| c.entries.values())
            .map(Vec::len)
            .sum()
    }

    /// Remove every entry of a collection, keeping the collection alive.
    pub fn clear_collection(&mut self, id: CollectionId) {
        let Some(collection) = self.collections.get_mut(&id) else {
            return;
        };
        if collection.entries.is_empty() {
            return;
        }
        collection.entries.clear();
        self.notify([SinkChangeType::DiagnosticsChanged]);
    }

    /// Dispose a collection (and its entries). Returns `false` if it did not exist.
    pub fn dispose_collection(&mut self, id: CollectionId) -> bool {
        let Some(collection) = self.collections.remove(&id) else {
            return false;
        };
        if collection.entries.is_empty() {
            self.notify([SinkChangeType::ResourcesChanged]);
        } else {
            self.notify([
                SinkChangeType::DiagnosticsChanged,
                SinkChangeType::ResourcesChanged,
            ]);
        }
        true
    }

    /// Drop a document's diagnostics from every collection (the document was closed).
    pub fn forget_document(&mut self, uri: &str) {
        let mut removed = false;
        for collection in self.collections.values_mut() {
            removed |= collection.entries.remove(uri).is_some();
        }
        if removed {
            self.notify([SinkChangeType::DiagnosticsChanged]);
        }
    }

    // ---- styles and decorations ----

    /// Register a decoration style.
    pub fn register_style(&mut self, style: DecorationStyle) -> StyleHandle {
        let handle = StyleHandle(self.next_style_id);
        self.next_style_id = self.next_style_id.saturating_add(1);
        self.styles.insert(handle, style);
        self.notify([SinkChangeType::ResourcesChanged]);
        handle
    }

    /// Look up a registered style.
    pub fn style(&self, handle: StyleHandle) -> Option<&DecorationStyle> {
        self.styles.get(&handle)
    }

    /// Returns the number of registered styles.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Release a style, removing its decorations from every editor.
    pub fn release_style(&mut self, handle: StyleHandle) -> bool {
        if self.styles.remove(&handle).is_none() {
            return false;
        }
        let before = self.decorations.len();
        self.decorations.retain(|(_, style), _| *style != handle);
        if self.decorations.len() != before {
            self.notify([
                SinkChangeType::DecorationsChanged,
                SinkChangeType::ResourcesChanged,
            ]);
        } else {
            self.notify([SinkChangeType::ResourcesChanged]);
        }
        true
    }

    /// Decorations drawn with one style in one editor.
    pub fn decorations(&self, editor: EditorId, style: StyleHandle) -> &[Decoration] {
        self.decorations
            .get(&(editor, style))
            .map_or(&[], Vec::as_slice)
    }

    /// All decoration sets of one editor, by style.
    pub fn decorations_for_editor(
        &self,
        editor: EditorId,
    ) -> impl Iterator<Item = (StyleHandle, &[Decoration])> + '_ {
        self.decorations
            .range((editor, StyleHandle(0))..=(editor, StyleHandle(u64::MAX)))
            .map(|((_, style), decorations)| (*style, decorations.as_slice()))
    }

    /// Drop every decoration of an editor (the editor was closed).
    pub fn forget_editor(&mut self, editor: EditorId) {
        let before = self.decorations.len();
        self.decorations.retain(|(e, _), _| *e != editor);
        if self.decorations.len() != before {
            self.notify([SinkChangeType::DecorationsChanged]);
        }
    }

    // ---- publishing ----

    /// Apply a batch of replacements.
    ///
    /// All edits land before any notification is sent, and each change kind is notified at
    /// most once per batch. Edits that target a disposed collection or a released style are
    /// dropped.
    pub fn apply<I>(&mut self, edits: I)
    where
        I: IntoIterator<Item = AnnotationEdit>,
    {
        let mut diagnostics_changed = false;
        let mut decorations_changed = false;

        for edit in edits {
            match edit {
                AnnotationEdit::ReplaceDiagnostics {
                    collection,
                    uri,
                    diagnostics,
                } => {
                    let Some(target) = self.collections.get_mut(&collection) else {
                        debug!(?collection, "dropping diagnostics for a disposed collection");
                        continue;
                    };
                    let changed = if diagnostics.is_empty() {
                        target.entries.remove(&uri).is_some()
                    } else {
                        target.entries.insert(uri, diagnostics);
                        true
                    };
                    diagnostics_changed |= changed;
                }
                AnnotationEdit::ReplaceDecorations {
                    editor,
                    style,
                    decorations,
                } => {
                    if !self.styles.contains_key(&style) {
                        debug!(?style, "dropping decorations for a released style");
                        continue;
                    }
                    let changed = if decorations.is_empty() {
                        self.decorations.remove(&(editor, style)).is_some()
                    } else {
                        self.decorations.insert((editor, style), decorations);
                        true
                    };
                    decorations_changed |= changed;
                }
            }
        }

        let mut kinds = Vec::with_capacity(2);
        if diagnostics_changed {
            kinds.push(SinkChangeType::DiagnosticsChanged);
        }
        if decorations_changed {
            kinds.push(SinkChangeType::DecorationsChanged);
        }
        self.notify(kinds);
    }

    fn notify<I>(&mut self, kinds: I)
    where
        I: IntoIterator<Item = SinkChangeType>,
    {
        for change_type in kinds {
            let old_version = self.version;
            self.version += 1;
            let change = SinkChange {
                change_type,
                old_version,
                new_version: self.version,
            };
            for callback in &mut self.callbacks {
                callback(&change);
            }
        }
    }
}
