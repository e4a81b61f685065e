//! Harvest module - batch fetch-and-reshape pipeline for SIDRA tables

pub mod fetch;
pub mod municipalities;
pub mod pipeline;
pub mod request;
pub mod table;
pub mod types;
pub mod validate;
pub mod write;

pub use types::*;
