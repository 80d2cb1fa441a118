//! gacounter - analytics pageview counter
//!
//! Polls an analytics reporting API for per-path pageview counts, stores
//! them locally and attributes them to content items.
//!
//! # Features
//! - **server**: HTTP server mode (default)
//! - **cli**: Command-line interface
//!
//! # Architecture
//! - `analytics`: Reporting API client and date ranges
//! - `counter`: Authentication, fetching, aggregation and display
//! - `queue`: Cron jobs and the persistent work queue
//! - `storage`: SeaORM backed tables and state
//! - `api`: HTTP services and middleware
//! - `interfaces`: CLI commands
//! - `config`: Static and database-backed configuration
//! - `runtime`: Startup wiring and execution modes
//! - `system`: Logging

pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod counter;
pub mod errors;
pub mod interfaces;
pub mod queue;
pub mod runtime;
pub mod storage;
pub mod system;
