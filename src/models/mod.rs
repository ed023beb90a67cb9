// src/models/mod.rs

//! Domain models for the result API.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
pub mod hallticket;
mod listing;
mod query;
mod result;

// Re-export all public types
pub use config::{
    BulkConfig, CacheConfig, Config, DEFAULT_REDIS_URL, PortalConfig, PortalSelectors,
    ServerConfig, TtlConfig,
};
pub use hallticket::{HallticketRange, MAX_RANGE_SPAN};
pub use listing::{ExamLink, ExamsByDegree, ListingSet, Notification};
pub use query::{BulkRequest, DEFAULT_RESULT, ExamQuery};
pub use result::{DataEnvelope, SemesterResult, StudentDetails, StudentResult, SubjectGrade, is_passing};
