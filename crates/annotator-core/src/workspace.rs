//! Workspace of open documents and editors.
//!
//! `annotator-core` is UI-agnostic, but the refresh policy needs a small host model:
//!
//! - open documents (`DocumentId` -> [`TextDocument`]), unique by URI;
//! - editors (`EditorId`), each showing one document; several editors may show the same one;
//! - at most one active editor.
//!
//! The workspace itself does not emit events. [`Session`](crate::Session) wraps the mutating
//! calls and forwards the resulting [`HostEvent`](crate::HostEvent)s to the rule engines.

use crate::document::TextDocument;
use crate::error::WorkspaceError;
use std::collections::{BTreeMap, HashMap};
use std::ops::Range;

/// Opaque identifier for an open document in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

/// Opaque identifier for an editor in a [`Workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditorId(u64);

impl EditorId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct EditorEntry {
    document: DocumentId,
}

/// A collection of open documents and the editors showing them.
#[derive(Debug, Default)]
pub struct Workspace {
    next_document_id: u64,
    documents: BTreeMap<DocumentId, TextDocument>,
    uri_to_document: HashMap<String, DocumentId>,

    next_editor_id: u64,
    editors: BTreeMap<EditorId, EditorEntry>,
    active_editor: Option<EditorId>,
}

impl Workspace {
    /// Create an empty workspace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of open documents.
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Returns the number of open editors.
    pub fn editor_count(&self) -> usize {
        self.editors.len()
    }

    /// Open a document.
    pub fn open_document(
        &mut self,
        uri: impl Into<String>,
        language_id: impl Into<String>,
        text: &str,
    ) -> Result<DocumentId, WorkspaceError> {
        let uri = uri.into();
        if self.uri_to_document.contains_key(&uri) {
            return Err(WorkspaceError::UriAlreadyOpen(uri));
        }

        let id = DocumentId(self.next_document_id);
        self.next_document_id = self.next_document_id.saturating_add(1);

        self.documents
            .insert(id, TextDocument::new(uri.clone(), language_id, text));
        self.uri_to_document.insert(uri, id);
        Ok(id)
    }

    /// Close a document and every editor showing it. Returns the closed editors.
    pub fn close_document(&mut self, id: DocumentId) -> Result<Vec<EditorId>, WorkspaceError> {
        let Some(document) = self.documents.remove(&id) else {
            return Err(WorkspaceError::DocumentNotFound(id));
        };
        self.uri_to_document.remove(document.uri());

        let closed = self.editors_for_document(id);
        for editor in &closed {
            self.editors.remove(editor);
        }
        self.repair_active_editor();
        Ok(closed)
    }

    /// Open an editor on a document. The first editor opened becomes active.
    pub fn open_editor(&mut self, document: DocumentId) -> Result<EditorId, WorkspaceError> {
        if !self.documents.contains_key(&document) {
            return Err(WorkspaceError::DocumentNotFound(document));
        }

        let id = EditorId(self.next_editor_id);
        self.next_editor_id = self.next_editor_id.saturating_add(1);
        self.editors.insert(id, EditorEntry { document });

        if self.active_editor.is_none() {
            self.active_editor = Some(id);
        }
        Ok(id)
    }

    /// Close an editor. The document stays open.
    pub fn close_editor(&mut self, id: EditorId) -> Result<(), WorkspaceError> {
        if self.editors.remove(&id).is_none() {
            return Err(WorkspaceError::EditorNotFound(id));
        }
        self.repair_active_editor();
        Ok(())
    }

    /// Return the active editor id (if any).
    pub fn active_editor(&self) -> Option<EditorId> {
        self.active_editor
    }

    /// Return the document shown in the active editor (if any).
    pub fn active_document(&self) -> Option<DocumentId> {
        let editor = self.active_editor?;
        self.editors.get(&editor).map(|e| e.document)
    }

    /// Set (or clear) the active editor.
    pub fn set_active_editor(&mut self, id: Option<EditorId>) -> Result<(), WorkspaceError> {
        if let Some(id) = id
            && !self.editors.contains_key(&id)
        {
            return Err(WorkspaceError::EditorNotFound(id));
        }
        self.active_editor = id;
        Ok(())
    }

    /// Get a document.
    pub fn document(&self, id: DocumentId) -> Option<&TextDocument> {
        self.documents.get(&id)
    }

    /// Look up a document by URI.
    pub fn document_id_for_uri(&self, uri: &str) -> Option<DocumentId> {
        self.uri_to_document.get(uri).copied()
    }

    /// Iterate over open documents in id order.
    pub fn documents(&self) -> impl Iterator<Item = (DocumentId, &TextDocument)> + '_ {
        self.documents.iter().map(|(id, doc)| (*id, doc))
    }

    /// Get the document an editor is showing.
    pub fn editor_document(&self, id: EditorId) -> Result<DocumentId, WorkspaceError> {
        self.editors
            .get(&id)
            .map(|e| e.document)
            .ok_or(WorkspaceError::EditorNotFound(id))
    }

    /// All editors showing a document, in id order.
    pub fn editors_for_document(&self, document: DocumentId) -> Vec<EditorId> {
        self.editors
            .iter()
            .filter_map(|(id, e)| (e.document == document).then_some(*id))
            .collect()
    }

    /// Replace a character range of a document.
    pub fn edit_document(
        &mut self,
        id: DocumentId,
        range: Range<usize>,
        text: &str,
    ) -> Result<(), WorkspaceError> {
        self.document_mut(id)?.replace(range, text);
        Ok(())
    }

    /// Replace a document's whole text.
    pub fn set_document_text(&mut self, id: DocumentId, text: &str) -> Result<(), WorkspaceError> {
        self.document_mut(id)?.set_text(text);
        Ok(())
    }

    /// Change a document's language id.
    pub fn set_document_language(
        &mut self,
        id: DocumentId,
        language_id: impl Into<String>,
    ) -> Result<(), WorkspaceError> {
        self.document_mut(id)?.set_language_id(language_id);
        Ok(())
    }

    fn document_mut(&mut self, id: DocumentId) -> Result<&mut TextDocument, WorkspaceError> {
        self.documents
            .get_mut(&id)
            .ok_or(WorkspaceError::DocumentNotFound(id))
    }

    fn repair_active_editor(&mut self) {
        if self
            .active_editor
            .is_some_and(|active| !self.editors.contains_key(&active))
        {
            self.active_editor = self.editors.keys().next().copied();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_document_rejects_duplicate_uri() {
        let mut ws = Workspace::new();
        ws.open_document("file:///a.rs", "rust", "").unwrap();
        let err = ws.open_document("file:///a.rs", "rust", "").unwrap_err();
        assert_eq!(err, WorkspaceError::UriAlreadyOpen("file:///a.rs".to_string()));
    }

    #[test]
    fn test_first_editor_becomes_active() {
        let mut ws = Workspace::new();
        let doc = ws.open_document("file:///a.rs", "rust", "").unwrap();
        let first = ws.open_editor(doc).unwrap();
        let second = ws.open_editor(doc).unwrap();

        assert_eq!(ws.active_editor(), Some(first));
        assert_eq!(ws.active_document(), Some(doc));
        assert_eq!(ws.editors_for_document(doc), vec![first, second]);
    }

    #[test]
    fn test_close_active_editor_moves_focus() {
        let mut ws = Workspace::new();
        let a = ws.open_document("file:///a", "plaintext", "").unwrap();
        let b = ws.open_document("file:///b", "plaintext", "").unwrap();
        let ea = ws.open_editor(a).unwrap();
        let eb = ws.open_editor(b).unwrap();

        ws.close_editor(ea).unwrap();
        assert_eq!(ws.active_editor(), Some(eb));

        let closed = ws.close_document(b).unwrap();
        assert_eq!(closed, vec![eb]);
        assert_eq!(ws.active_editor(), None);
        assert_eq!(ws.document_id_for_uri("file:///b"), None);
    }

    #[test]
    fn test_unknown_ids() {
        let mut ws = Workspace::new();
        let doc = ws.open_document("file:///a", "plaintext", "").unwrap();
        let editor = ws.open_editor(doc).unwrap();
        ws.close_editor(editor).unwrap();

        assert_eq!(
            ws.set_active_editor(Some(editor)),
            Err(WorkspaceError::EditorNotFound(editor))
        );
        ws.close_document(doc).unwrap();
        assert_eq!(
            ws.edit_document(doc, 0..0, "x"),
            Err(WorkspaceError::DocumentNotFound(doc))
        );
    }
}
