//! Background work behind the bulk endpoint.
//!
//! - `BulkOrchestrator`: deduplicated range workers over the result cache

pub mod bulk;

pub use bulk::{BulkOrchestrator, BulkOutcome, LOADING_PLACEHOLDER};
