//! Property-based test generators using proptest.
//!
//! Provides strategies for generating documents, names, filters, and
//! mutation sequences.

use amazedb_codec::{Document, Value};
use amazedb_core::Filter;
use proptest::prelude::*;

/// Field names drawn from a small pool so that documents overlap.
pub const FIELD_POOL: &[&str] = &["id", "name", "age", "tags", "active"];

/// Strategy for generating valid database and group names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-]{1,24}").expect("Invalid regex")
}

/// Strategy for generating field names from [`FIELD_POOL`].
pub fn field_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(FIELD_POOL).prop_map(str::to_string)
}

/// Strategy for generating scalar values.
///
/// Floats are multiples of 0.25, exactly representable in JSON text.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(Value::Integer),
        (-4000i32..4000).prop_map(|n| Value::Float(f64::from(n) / 4.0)),
        "[a-zA-Z ]{0,12}".prop_map(Value::Text),
    ]
}

/// Strategy for generating values, including nested arrays and maps.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
                .prop_map(|pairs| Value::Map(pairs.into_iter().collect())),
        ]
    })
}

/// Strategy for generating documents over [`FIELD_POOL`].
pub fn document_strategy() -> impl Strategy<Value = Document> {
    prop::collection::vec((field_strategy(), value_strategy()), 0..5)
        .prop_map(|pairs| pairs.into_iter().collect::<Document>())
}

/// Strategy for generating single-equality filters with small integer
/// operands, likely to match documents from [`id_document_strategy`].
pub fn equality_filter_strategy() -> impl Strategy<Value = Filter> {
    (field_strategy(), 0i64..8).prop_map(|(field, v)| Filter::new().eq(field, v))
}

/// Strategy for generating documents whose fields hold small integers.
pub fn id_document_strategy() -> impl Strategy<Value = Document> {
    prop::collection::vec((field_strategy(), 0i64..8), 1..4)
        .prop_map(|pairs| pairs.into_iter().collect::<Document>())
}

/// A group mutation.
#[derive(Debug, Clone)]
pub enum MutationOperation {
    /// Insert a document
    Insert(Document),
    /// Update every document whose `field` equals `value`
    Update {
        /// Filter field
        field: String,
        /// Filter value
        value: i64,
        /// Values merged into each match
        values: Document,
    },
    /// Remove every document whose `field` equals `value`
    Remove {
        /// Filter field
        field: String,
        /// Filter value
        value: i64,
    },
}

/// Strategy for generating group mutations.
pub fn mutation_strategy() -> impl Strategy<Value = MutationOperation> {
    prop_oneof![
        3 => id_document_strategy().prop_map(MutationOperation::Insert),
        1 => (field_strategy(), 0i64..8, id_document_strategy())
            .prop_map(|(field, value, values)| MutationOperation::Update { field, value, values }),
        1 => (field_strategy(), 0i64..8)
            .prop_map(|(field, value)| MutationOperation::Remove { field, value }),
    ]
}

/// Strategy for generating a sequence of mutations.
pub fn mutation_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<MutationOperation>> {
    prop::collection::vec(mutation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
