//! In-memory storage backend.
//!
//! Useful for tests and dry runs. It reproduces the parts of DynamoDB's
//! behavior the maintenance pipeline depends on: `Limit` counts items
//! evaluated before filtering, pages end with the last evaluated key, batch
//! writes accept at most 25 puts, and capacity limits surface either as
//! unprocessed items or as throttling errors.

mod store;

pub use store::InMemoryStore;
