//! Helper functions shared by the engine and the HTTP boundary.
//!
//! - [`code_generator`] - Random code drawing and custom code validation
//! - [`url_validator`] - Target address validation
//! - [`click_context`] - Click context extraction from request headers

pub mod click_context;
pub mod code_generator;
pub mod url_validator;
