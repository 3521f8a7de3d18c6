//! Core of the Event Integration Platform maintenance tooling.
//!
//! Store-agnostic types and traits, the backoff policy, the item transformer
//! contract with its expiry enrichment, the event schema validator and the
//! scan/transform/write pipeline. Store implementations live in `eip_store`.

pub mod backoff;
pub mod maintenance;
pub mod schema;
pub mod storage;
pub mod transform;
