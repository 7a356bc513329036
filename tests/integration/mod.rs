//! Integration test modules.
//!
//! Each module drives the tag scenario, or part of the client, against the
//! stub API over HTTP.

pub mod config_tests;
pub mod scenario_tests;
