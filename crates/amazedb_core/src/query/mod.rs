//! Filtering, ordering, and lookup over document sequences.
//!
//! - [`Filter`] - conjunction of per-field conditions
//! - [`merge_sort`] - stable sort by one field
//! - [`binary_search`] - leftmost lookup in a sorted sequence
//! - [`find_one`] / [`find_all`] - the query paths groups use

mod filter;
mod planner;
mod search;
mod sort;

pub use filter::{Condition, Filter, Operator, Pattern, Predicate};
pub use planner::{find_all, find_one};
pub use search::binary_search;
pub use sort::merge_sort;
