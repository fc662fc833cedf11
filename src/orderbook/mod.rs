//! Order book storage for the matching engine.
//!
//! ## Architecture
//!
//! The book is a pair of singly-linked lists threaded through an arena of
//! order records:
//!
//! - **Slab-based storage**: O(1) record insertion, removal and lookup
//! - **Id links**: `Order::next` holds the successor's id, never a pointer
//! - **Sentinels**: a zero-amount record per side terminates each list and
//!   is the head of an empty side
//!
//! ## Components
//!
//! - [`OrderStore`]: records, heads and the id counter
//! - [`BookIter`]: best-to-worst traversal of one side
//!
//! ## Performance
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | Insert | O(depth) |
//! | Pop / consume head | O(1) |
//! | Lookup by id | O(1) |
//! | Unlink arbitrary order | O(depth) |

pub mod iter;
pub mod store;

pub use iter::{depth, BookIter};
pub use store::{InvariantViolation, OrderStore};
