//! HTTP surface for near-duplicate source code detection.
//!
//! Exposes `/api/duplicate-check` (coarse SimHash chunk matching) and
//! `/api/duplicate-check-v2` (winnowing offset-alignment matching) behind
//! API-key auth and a per-key sliding rate limit, backed by an
//! [`index::Index`].

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;
pub mod store;
