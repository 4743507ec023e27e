//! Postcode CLI Library
//!
//! Exposes the API client, cache store, configuration and CLI modules for use
//! by the binary and integration tests.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
