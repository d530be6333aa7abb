//! In-memory cache for weather API responses
//!
//! This module provides a time-bounded key-value store used to avoid repeated
//! network calls for the same location. Entries expire after a configurable
//! duration and are purged lazily on read or in bulk by an explicit sweep.
//! Nothing is persisted across process restarts.

mod store;

pub use store::{WeatherCache, DEFAULT_EXPIRY_MINUTES};
