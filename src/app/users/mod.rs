//! User records: model, persistence port, service and HTTP handlers

pub mod handler;
pub mod model;
pub mod repository;
pub mod service;
