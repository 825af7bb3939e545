//! Shared building blocks for the blog server crates: wire types that every
//! layer agrees on and the tracing bootstrap.

pub mod types;
pub mod utils;
