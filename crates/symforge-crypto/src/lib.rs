#![doc = "Symmetric cipher engines and generic modes of operation."]
#![forbid(unsafe_code)]

// Core traits
pub mod alias;
pub mod provider;

// Block ciphers
#[cfg(feature = "loki97")]
pub mod loki97;
#[cfg(feature = "sm4")]
pub mod sm4;

// Stream ciphers
#[cfg(feature = "enigma")]
pub mod enigma;
#[cfg(feature = "wake")]
pub mod wake;

// Modes of operation
#[cfg(feature = "modes")]
pub mod modes;

pub mod cipher {
    //! Unified symmetric cipher interface.
    pub use super::provider::{BlockCipher, BlockMode, StreamCipher, StreamMode};
}

pub use symforge_types::CryptoError;
