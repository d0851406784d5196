//! # projectdesk API Server Library
//!
//! HTTP surface over the projectdesk authorization and scoping core.
//!
//! ## Modules
//!
//! - `app`: application state, router and bearer authentication
//! - `config`: configuration management
//! - `error`: error handling and HTTP response mapping
//! - `extract`: JSON body extraction with field-level errors
//! - `routes`: route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
