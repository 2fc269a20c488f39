//! Insert, update, and remove.
//!
//! Matching runs against the mirror when the group is preloaded and against
//! disk otherwise, but every write starts from a fresh load of the blob.
//! A matched document is located in that fresh sequence by equality and the
//! first equal occurrence is replaced or removed. If the mirror was stale
//! and the document is no longer on disk, it is skipped.

use super::Group;
use crate::error::CoreResult;
use crate::query::{self, Filter};
use amazedb_codec::Document;
use tracing::{debug, warn};

impl Group {
    /// Appends one document.
    ///
    /// # Errors
    ///
    /// Returns load or save errors; the stored sequence is unchanged on
    /// failure.
    pub fn insert(&mut self, document: Document) -> CoreResult<()> {
        self.insert_many(std::iter::once(document))
    }

    /// Appends a batch of documents in one load-modify-save cycle.
    ///
    /// # Errors
    ///
    /// Returns load or save errors; none of the batch is stored on failure.
    pub fn insert_many<I>(&mut self, documents: I) -> CoreResult<()>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut stored = self.load_from_disk()?;
        let before = stored.len();
        stored.extend(documents);
        debug!(group = %self.name, added = stored.len() - before, "inserting");
        self.write(stored)
    }

    /// Merges `values` into the first document matching `filter`.
    ///
    /// Fields in `values` overwrite or extend the document's top-level
    /// fields. The updated document moves to the end of the sequence.
    /// Returns whether a document was updated.
    ///
    /// # Errors
    ///
    /// Returns load, filter, or save errors.
    pub fn update_one(&mut self, filter: &Filter, values: &Document) -> CoreResult<bool> {
        let matched = self.find_one(filter, None)?;
        let updated = self.rewrite(matched.into_iter().collect(), Some(values))?;
        Ok(updated > 0)
    }

    /// Merges `values` into every document matching `filter` and returns
    /// how many were updated.
    ///
    /// # Errors
    ///
    /// Returns load, filter, or save errors.
    pub fn update(&mut self, filter: &Filter, values: &Document) -> CoreResult<usize> {
        let matched = self.find_all(filter, None)?;
        self.rewrite(matched, Some(values))
    }

    /// Removes the first document matching `filter`. Returns whether a
    /// document was removed.
    ///
    /// # Errors
    ///
    /// Returns load, filter, or save errors.
    pub fn remove_one(&mut self, filter: &Filter) -> CoreResult<bool> {
        let matched = self.find_one(filter, None)?;
        let removed = self.rewrite(matched.into_iter().collect(), None)?;
        Ok(removed > 0)
    }

    /// Removes every document matching `filter` and returns how many were
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns load, filter, or save errors.
    pub fn remove(&mut self, filter: &Filter) -> CoreResult<usize> {
        let matched = self.find_all(filter, None)?;
        self.rewrite(matched, None)
    }

    /// Removes each matched document from a fresh load and, with `values`,
    /// appends its merged replacement. Returns how many were found on disk.
    fn rewrite(&mut self, matched: Vec<Document>, values: Option<&Document>) -> CoreResult<usize> {
        if matched.is_empty() {
            return Ok(0);
        }

        let mut stored = self.load_from_disk()?;
        let mut replacements = Vec::new();
        let mut affected = 0;

        for original in matched {
            let Some(index) = stored.iter().position(|doc| *doc == original) else {
                warn!(group = %self.name, "matched document is no longer stored, skipping");
                continue;
            };
            stored.remove(index);
            if let Some(values) = values {
                replacements.push(original.merged(values));
            }
            affected += 1;
        }

        stored.extend(replacements);
        debug!(group = %self.name, affected, "rewriting");
        self.write(stored)?;
        Ok(affected)
    }
}
