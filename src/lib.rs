// src/lib.rs

//! Result crawler library: a cached HTTP API over the university's
//! examination result portal.

pub mod cache;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
pub mod web;
