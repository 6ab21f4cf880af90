/// Symmetric primitive errors.
///
/// Every variant is a precondition violation detected before any output
/// byte is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
    #[error("operation not supported")]
    NotSupported,

    // Key / IV errors
    #[error("invalid key length: {got}")]
    InvalidKeyLength { got: usize },
    #[error("invalid iv length: expected {expected}, got {got}")]
    InvalidIvLength { expected: usize, got: usize },
    #[error("invalid round count: {rounds}")]
    InvalidRounds { rounds: usize },

    // Buffer errors
    #[error("buffer length not enough: need {need}, got {got}")]
    BufferTooSmall { need: usize, got: usize },
    #[error("invalid buffer overlap")]
    InvalidOverlap,
    #[error("input not full blocks: {len} bytes with block size {block_size}")]
    PartialBlock { len: usize, block_size: usize },
}
