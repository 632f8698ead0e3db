//! Statistics control service
//!
//! HTTP endpoints to read and change the statistics interval and to fetch or
//! reset aggregated query statistics, backed by an in-memory stats engine.
//! The engine is public so the component resolving queries can feed it
//! through [`stats::StatsEngine::record`].

pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod server;
pub mod stats;
