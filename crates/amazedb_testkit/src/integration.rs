//! Cross-crate integration test helpers.
//!
//! [`GroupHarness`] applies mutations to a real group and to a plain
//! in-memory model side by side, so tests can check that the stored
//! sequence always matches what a naive implementation would hold.

use crate::generators::MutationOperation;
use amazedb_codec::{Document, Value};
use amazedb_core::{Filter, Group};

/// A group paired with the sequence it is expected to hold.
pub struct GroupHarness {
    /// The group under test.
    pub group: Group,
    expected: Vec<Document>,
}

impl GroupHarness {
    /// Wraps an empty group.
    pub fn new(group: Group) -> Self {
        assert!(
            group.is_empty().expect("Failed to read group"),
            "harness needs an empty group"
        );
        Self {
            group,
            expected: Vec::new(),
        }
    }

    /// Applies one mutation to both the group and the model.
    ///
    /// Returns the count reported by the group (1 for inserts).
    pub fn apply(&mut self, op: &MutationOperation) -> usize {
        match op {
            MutationOperation::Insert(doc) => {
                self.group.insert(doc.clone()).expect("Failed to insert");
                self.expected.push(doc.clone());
                1
            }
            MutationOperation::Update {
                field,
                value,
                values,
            } => {
                let count = self
                    .group
                    .update(&Filter::new().eq(field.as_str(), *value), values)
                    .expect("Failed to update");
                let (matched, mut kept) = self.split(field, *value);
                kept.extend(matched.iter().map(|doc| doc.merged(values)));
                self.expected = kept;
                count
            }
            MutationOperation::Remove { field, value } => {
                let count = self
                    .group
                    .remove(&Filter::new().eq(field.as_str(), *value))
                    .expect("Failed to remove");
                let (_, kept) = self.split(field, *value);
                self.expected = kept;
                count
            }
        }
    }

    /// Returns the sequence the group is expected to hold.
    pub fn expected(&self) -> &[Document] {
        &self.expected
    }

    /// Asserts that the group holds exactly the expected sequence.
    pub fn verify(&self) {
        let actual = self.group.documents().expect("Failed to read group");
        assert_eq!(actual, self.expected, "group diverged from model");
    }

    fn split(&self, field: &str, value: i64) -> (Vec<Document>, Vec<Document>) {
        let target = Value::from(value);
        self.expected
            .iter()
            .cloned()
            .partition(|doc| doc.get(field) == Some(&target))
    }
}
