//! Library crate for volley-score: the volleyball match scoring engine and its
//! HTTP control adapter, exposed for the binaries and integration tests.

/// Configuration loading.
pub mod config;
/// Request and response shapes of the HTTP adapter.
pub mod dto;
/// Engine and HTTP error types.
pub mod error;
/// Axum routers.
pub mod routes;
/// Operations over the match.
pub mod services;
/// Match model, rules, set automaton and undo ledger.
pub mod state;
