//! Depot Client Library
//!
//! Client-side execution model for the Depot upload service: session-aware
//! HTTP access, background login/registration, cancellable streaming uploads
//! with live progress, and polling-based synchronization of the uploaded
//! file listing.
//!
//! Every controller runs as a background task and reports back over a
//! channel, so the consuming surface (the CLI in `main.rs`) never blocks on
//! network I/O.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod sync;
pub mod types;
pub mod upload;
