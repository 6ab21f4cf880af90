#![forbid(unsafe_code)]
#![doc = "Common error types for the symforge symmetric primitives."]

pub mod error;

pub use error::*;
