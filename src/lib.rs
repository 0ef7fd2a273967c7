//! # User records service
//!
//! A small CRUD HTTP service over a single `users` table:
//! - `app`: routes, handlers and the user record service
//! - `core`: error mapping, shared response bodies, middleware
//! - `infrastructure`: MySQL gateway, in-memory gateway, event log, console logging
//! - `config`: file and environment configuration

pub mod app;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use app::{router, AppState};
pub use config::Config;
