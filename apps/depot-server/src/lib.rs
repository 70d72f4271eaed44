//! Depot Server Library
//!
//! An authenticated file-upload service: users register and log in, then
//! upload files that are streamed to local disk and recorded in SQLite so
//! everyone can see who uploaded what, when.
//!
//! The server binary lives in `main.rs`; this crate exposes the modules so
//! integration tests can build the router against a scratch database.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
