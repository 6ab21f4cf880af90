//! Doubled-IV OFB (Output Feedback) mode of operation.
//!
//! The IV is two cipher blocks long and seeds a register `[A | B]`. Each
//! keystream block is `E(A)`; the register then slides left by one block
//! and `E(A)` becomes the new tail, so the register is always a window over
//! the last two inputs of the keystream sequence. Encryption and decryption
//! are the same operation.
//!
//! Keystream is generated in batches and buffered between calls.

use symforge_types::CryptoError;
use zeroize::Zeroize;

use super::{check_iv_len, xor_in_place};
use crate::provider::{BlockCipher, StreamMode};

/// Target size of one keystream refill; rounded up to whole blocks.
pub const OFB_BUFFER_SIZE: usize = 512;

/// Doubled-IV OFB stream over any block cipher.
pub struct DoubledOfb<C: BlockCipher> {
    cipher: C,
    register: Vec<u8>,
    buffer: Vec<u8>,
    /// Read position in `buffer`; `buffer.len()` means exhausted.
    offset: usize,
}

impl<C: BlockCipher> DoubledOfb<C> {
    /// Wrap `cipher` with an IV of exactly two blocks.
    ///
    /// Fails with [`CryptoError::NotSupported`] for a zero block size.
    pub fn new(cipher: C, iv: &[u8]) -> Result<Self, CryptoError> {
        let bs = cipher.block_size();
        if bs == 0 {
            return Err(CryptoError::NotSupported);
        }
        check_iv_len(iv, 2 * bs)?;
        let buf_len = OFB_BUFFER_SIZE.div_ceil(bs) * bs;
        tracing::debug!(mode = "ofb2", block_size = bs, buf_len, "stream created");
        Ok(Self {
            cipher,
            register: iv.to_vec(),
            buffer: vec![0u8; buf_len],
            offset: buf_len,
        })
    }

    fn refill(&mut self) -> Result<(), CryptoError> {
        let bs = self.cipher.block_size();
        for block in self.buffer.chunks_exact_mut(bs) {
            block.copy_from_slice(&self.register[..bs]);
            self.cipher.encrypt_block(block)?;
            self.register.copy_within(bs.., 0);
            self.register[bs..].copy_from_slice(block);
        }
        self.offset = 0;
        tracing::trace!(mode = "ofb2", bytes = self.buffer.len(), "keystream refilled");
        Ok(())
    }
}

impl<C: BlockCipher> StreamMode for DoubledOfb<C> {
    fn xor_keystream_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        let mut done = 0;
        while done < buf.len() {
            if self.offset == self.buffer.len() {
                self.refill()?;
            }
            let n = (buf.len() - done).min(self.buffer.len() - self.offset);
            xor_in_place(
                &mut buf[done..done + n],
                &self.buffer[self.offset..self.offset + n],
            );
            done += n;
            self.offset += n;
        }
        Ok(())
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CryptoError> {
        check_iv_len(iv, self.register.len())?;
        self.register.copy_from_slice(iv);
        self.buffer.as_mut_slice().zeroize();
        self.offset = self.buffer.len();
        tracing::debug!(mode = "ofb2", "iv reset");
        Ok(())
    }
}

impl<C: BlockCipher> Drop for DoubledOfb<C> {
    fn drop(&mut self) {
        self.register.zeroize();
        self.buffer.zeroize();
    }
}
