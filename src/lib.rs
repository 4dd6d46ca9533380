//! Bento box layout designer.
//!
//! A pure core (geometry, records, validation, placement and suggestion
//! scoring) plus the service around it: an ingredient catalog, JSON
//! persistence and an HTTP API.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod layout;
pub mod logging;
pub mod model;
pub mod placement;
pub mod store;
pub mod suggestion;
pub mod types;
pub mod validation;
