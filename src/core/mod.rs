//! Core layer: error mapping, shared response bodies and middleware

pub mod error;
pub mod middleware;
pub mod response;
