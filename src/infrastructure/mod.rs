//! Infrastructure: database access, event log and console logging

pub mod database;
pub mod event_log;
pub mod logger;
pub mod memory_store;
