//! Utility functions for slug generation, URL processing, and request handling.
//!
//! - [`clock`] - Injectable time source
//! - [`code_generator`] - Random slug generation
//! - [`url_normalizer`] - Redirect target parsing and sanitization
//! - [`client_meta`] - Click metadata extraction from HTTP headers

pub mod client_meta;
pub mod clock;
pub mod code_generator;
pub mod url_normalizer;
