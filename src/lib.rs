//! India Weather CLI Library
//!
//! Exposes the cache, fetch orchestration, formatting and interactive
//! session for use by the binary and by integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod display;
pub mod service;
pub mod session;
