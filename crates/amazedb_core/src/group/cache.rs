//! The optional in-memory mirror of a group's documents.

use amazedb_codec::Document;

/// In-process copy of a group's decoded sequence.
///
/// A mirror is valid only for reads issued through the group that owns it,
/// and only since that group's last successful write. Writes made by other
/// `Group` instances or other processes are not observed until
/// [`Group::refresh`](super::Group::refresh).
///
/// The owning group replaces the mirror with exactly the sequence it wrote
/// after every successful save, and leaves it untouched when a save fails.
#[derive(Debug, Clone, Default)]
pub(crate) struct CacheMirror {
    documents: Vec<Document>,
}

impl CacheMirror {
    pub(crate) fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub(crate) fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Replaces the mirror with what was just written to disk.
    pub(crate) fn replace(&mut self, written: &[Document]) {
        self.documents = written.to_vec();
    }

    pub(crate) fn len(&self) -> usize {
        self.documents.len()
    }
}
