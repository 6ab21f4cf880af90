//! Block cipher modes of operation.
//!
//! This module provides propagating cipher block chaining (PCBC), 64-bit
//! cipher feedback (CFB64) and doubled-IV output feedback. Each mode
//! operates on top of any block cipher through the
//! [`BlockCipher`](crate::provider::BlockCipher) trait; the cipher is held by
//! value, so pass `&cipher` to share one key schedule between adapters.
//!
//! IVs are copied into adapter-owned storage at construction and on
//! `set_iv`. No padding is ever applied.

pub mod cfb;
pub mod ofb;
pub mod pcbc;

pub use cfb::{Cfb64Decryptor, Cfb64Encryptor, CFB64_SEGMENT_SIZE};
pub use ofb::DoubledOfb;
pub use pcbc::{PcbcDecryptor, PcbcEncryptor};

use symforge_types::CryptoError;

fn check_iv_len(iv: &[u8], expected: usize) -> Result<(), CryptoError> {
    if iv.len() != expected {
        return Err(CryptoError::InvalidIvLength {
            expected,
            got: iv.len(),
        });
    }
    Ok(())
}

fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= s;
    }
}
