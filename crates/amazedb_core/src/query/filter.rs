//! Filter specifications and document matching.
//!
//! A [`Filter`] is a list of per-field [`Condition`]s combined with AND.
//! A condition is either plain equality or a set of [`Operator`]s that must
//! all hold. Filters are built with the typed API:
//!
//! ```
//! use amazedb_core::query::Filter;
//!
//! let filter = Filter::new().eq("status", "open").gt("age", 30);
//! assert_eq!(filter.len(), 2);
//! ```
//!
//! or parsed from their serialized JSON form, where an object value is an
//! operator mapping keyed by `__ne`, `__gt`, `__lt`, `__lte`, `__gte`, `__re`:
//!
//! ```
//! use amazedb_codec::document_from_json;
//! use amazedb_core::query::Filter;
//!
//! let spec = document_from_json(r#"{"age": {"__gt": 30}, "name": "Alice"}"#).unwrap();
//! let filter = Filter::from_document(&spec).unwrap();
//! assert_eq!(filter.len(), 2);
//! ```

use crate::error::{CoreError, CoreResult, PredicateError};
use amazedb_codec::{Document, Value};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

type PredicateFn = dyn Fn(&Value) -> Result<bool, PredicateError> + Send + Sync;

/// A caller-supplied predicate over a field value.
#[derive(Clone)]
pub struct Predicate {
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Wraps a fallible predicate.
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Value) -> Result<bool, PredicateError> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(func),
        }
    }

    /// Wraps a predicate that cannot fail.
    pub fn infallible<F>(func: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(move |value| Ok(func(value)))
    }

    /// Runs the predicate.
    ///
    /// # Errors
    ///
    /// Returns whatever failure the predicate reports.
    pub fn evaluate(&self, value: &Value) -> Result<bool, PredicateError> {
        (self.func)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// A regex-match operand, compiled once when the filter is built.
///
/// An invalid pattern is kept as-is and only reported when the filter is
/// evaluated against a document carrying the field.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: Result<Regex, regex::Error>,
}

impl Pattern {
    /// Compiles a pattern anchored at the start of the input.
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let compiled = Regex::new(&format!("^(?:{source})"));
        Self { source, compiled }
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    fn is_match(&self, field: &str, text: &str) -> CoreResult<bool> {
        match &self.compiled {
            Ok(regex) => Ok(regex.is_match(text)),
            Err(e) => Err(CoreError::invalid_regexp(field, &self.source, e.to_string())),
        }
    }
}

/// A single comparison applied to a field value.
#[derive(Debug, Clone)]
pub enum Operator {
    /// Value differs from the operand.
    NotEquals(Value),
    /// Value orders after the operand.
    GreaterThan(Value),
    /// Value orders before the operand.
    LessThan(Value),
    /// Value orders before or equal to the operand.
    LessOrEqual(Value),
    /// Value orders after or equal to the operand.
    GreaterOrEqual(Value),
    /// The stringified value matches the pattern from its start.
    Regex(Pattern),
    /// The predicate accepts the value.
    Custom(Predicate),
}

impl Operator {
    /// Builds an operator from its serialized tag and operand.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilter` for an unknown tag, for `__cf` (predicates
    /// cannot be serialized), or for a `__re` operand that is not a string.
    pub fn from_tag(field: &str, tag: &str, operand: Value) -> CoreResult<Self> {
        match tag {
            "__ne" => Ok(Operator::NotEquals(operand)),
            "__gt" => Ok(Operator::GreaterThan(operand)),
            "__lt" => Ok(Operator::LessThan(operand)),
            "__lte" => Ok(Operator::LessOrEqual(operand)),
            "__gte" => Ok(Operator::GreaterOrEqual(operand)),
            "__re" => match operand {
                Value::Text(source) => Ok(Operator::Regex(Pattern::new(source))),
                other => Err(CoreError::invalid_filter(
                    field,
                    format!("`__re` expects a string pattern, got {}", other.type_name()),
                )),
            },
            "__cf" => Err(CoreError::invalid_filter(
                field,
                "custom predicates cannot be expressed in a serialized filter",
            )),
            other => Err(CoreError::invalid_filter(
                field,
                format!(
                    "unknown operator `{other}`; expected one of __ne, __gt, __lt, __lte, __gte, __re"
                ),
            )),
        }
    }

    /// Returns the serialized tag of this operator.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Operator::NotEquals(_) => "__ne",
            Operator::GreaterThan(_) => "__gt",
            Operator::LessThan(_) => "__lt",
            Operator::LessOrEqual(_) => "__lte",
            Operator::GreaterOrEqual(_) => "__gte",
            Operator::Regex(_) => "__re",
            Operator::Custom(_) => "__cf",
        }
    }

    /// Evaluates this operator against a field value.
    ///
    /// Ordering operators never match values that cannot be ordered against
    /// the operand (for example a string against a number).
    ///
    /// # Errors
    ///
    /// Returns `InvalidRegExp` for a malformed pattern and `InvalidFilter`
    /// when a custom predicate fails.
    pub fn matches(&self, field: &str, value: &Value) -> CoreResult<bool> {
        let ordering = |operand: &Value| value.compare(operand);
        Ok(match self {
            Operator::NotEquals(operand) => value != operand,
            Operator::GreaterThan(operand) => ordering(operand) == Some(Ordering::Greater),
            Operator::LessThan(operand) => ordering(operand) == Some(Ordering::Less),
            Operator::LessOrEqual(operand) => {
                matches!(ordering(operand), Some(Ordering::Less | Ordering::Equal))
            }
            Operator::GreaterOrEqual(operand) => {
                matches!(ordering(operand), Some(Ordering::Greater | Ordering::Equal))
            }
            Operator::Regex(pattern) => pattern.is_match(field, &value.to_string())?,
            Operator::Custom(predicate) => predicate
                .evaluate(value)
                .map_err(|cause| CoreError::predicate_failed(field, cause))?,
        })
    }
}

/// The match condition for one field.
#[derive(Debug, Clone)]
pub enum Condition {
    /// The field equals this literal.
    Equals(Value),
    /// Every operator holds for the field.
    Operators(Vec<Operator>),
}

impl Condition {
    /// Parses a serialized condition: an object is an operator mapping,
    /// anything else is a literal to compare for equality.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilter` if the mapping holds an unknown operator tag.
    pub fn from_value(field: &str, value: Value) -> CoreResult<Self> {
        match value {
            Value::Map(ops) => ops
                .into_iter()
                .map(|(tag, operand)| Operator::from_tag(field, &tag, operand))
                .collect::<CoreResult<Vec<_>>>()
                .map(Condition::Operators),
            literal => Ok(Condition::Equals(literal)),
        }
    }

    /// Returns the literal if this is plain equality.
    #[must_use]
    pub fn as_equality(&self) -> Option<&Value> {
        match self {
            Condition::Equals(value) => Some(value),
            Condition::Operators(_) => None,
        }
    }

    /// Evaluates this condition against a field value.
    ///
    /// # Errors
    ///
    /// Propagates operator evaluation errors.
    pub fn matches(&self, field: &str, value: &Value) -> CoreResult<bool> {
        match self {
            Condition::Equals(expected) => Ok(value == expected),
            Condition::Operators(ops) => {
                for op in ops {
                    if !op.matches(field, value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }
}

/// A conjunction of per-field conditions.
///
/// The empty filter matches every document.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Condition)>,
}

impl Filter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a filter from its serialized document form.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFilter` if any field holds an unknown operator tag.
    pub fn from_document(spec: &Document) -> CoreResult<Self> {
        let clauses = spec
            .iter()
            .map(|(field, value)| {
                Condition::from_value(field, value.clone()).map(|c| (field.to_string(), c))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        Ok(Self { clauses })
    }

    /// Adds a condition on a field.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, condition: Condition) -> Self {
        self.clauses.push((field.into(), condition));
        self
    }

    /// Adds an operator on a field, joining an existing operator clause on
    /// the same field if there is one.
    #[must_use]
    pub fn with_operator(mut self, field: impl Into<String>, op: Operator) -> Self {
        let field = field.into();
        let existing = self.clauses.iter_mut().find_map(|(f, c)| match c {
            Condition::Operators(ops) if *f == field => Some(ops),
            _ => None,
        });
        match existing {
            Some(ops) => ops.push(op),
            None => self.clauses.push((field, Condition::Operators(vec![op]))),
        }
        self
    }

    /// Requires `field == value`.
    #[must_use]
    pub fn eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(field, Condition::Equals(value.into()))
    }

    /// Requires `field != value`.
    #[must_use]
    pub fn ne(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_operator(field, Operator::NotEquals(value.into()))
    }

    /// Requires `field > value`.
    #[must_use]
    pub fn gt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_operator(field, Operator::GreaterThan(value.into()))
    }

    /// Requires `field < value`.
    #[must_use]
    pub fn lt(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_operator(field, Operator::LessThan(value.into()))
    }

    /// Requires `field <= value`.
    #[must_use]
    pub fn lte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_operator(field, Operator::LessOrEqual(value.into()))
    }

    /// Requires `field >= value`.
    #[must_use]
    pub fn gte(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_operator(field, Operator::GreaterOrEqual(value.into()))
    }

    /// Requires the stringified field to match `pattern` from its start.
    #[must_use]
    pub fn regex(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.with_operator(field, Operator::Regex(Pattern::new(pattern)))
    }

    /// Requires `predicate` to accept the field.
    #[must_use]
    pub fn custom(self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.with_operator(field, Operator::Custom(predicate))
    }

    /// Returns the number of field clauses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Returns whether the filter has no clauses.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Iterates over the field clauses.
    pub fn clauses(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.clauses.iter().map(|(f, c)| (f.as_str(), c))
    }

    /// Returns the field and literal when this filter is exactly one plain
    /// equality clause.
    #[must_use]
    pub fn single_equality(&self) -> Option<(&str, &Value)> {
        match self.clauses.as_slice() {
            [(field, condition)] => condition.as_equality().map(|v| (field.as_str(), v)),
            _ => None,
        }
    }

    /// Evaluates the filter against a document.
    ///
    /// Clauses are checked in order. A document lacking a filtered field
    /// does not match; that is not an error.
    ///
    /// # Errors
    ///
    /// Propagates operator evaluation errors from the clauses reached.
    pub fn matches(&self, doc: &Document) -> CoreResult<bool> {
        for (field, condition) in &self.clauses {
            let Some(value) = doc.get(field) else {
                return Ok(false);
            };
            if !condition.matches(field, value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
