//! HTTP boundary over the engine.
//!
//! Translates requests into engine calls and errors into JSON responses. Click
//! context is derived here, never inside the engine.
//!
//! # Modules
//!
//! - [`dto`] - Request/response types
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
