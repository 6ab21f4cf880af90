//! Trait-based provider mechanism for symmetric primitives.
//!
//! These traits define the capabilities that every cipher engine and mode
//! adapter exposes. Mode adapters are generic over [`BlockCipher`] and never
//! look behind it, so any conforming implementation can be wrapped.

use symforge_types::CryptoError;

use crate::alias::{check_block_io, check_full_blocks, check_stream_io};

/// A block cipher (e.g., SM4, LOKI97).
///
/// The key schedule is fixed at construction, so all operations take
/// `&self` and an instance may be shared between threads.
pub trait BlockCipher: Send + Sync {
    /// Block size in bytes.
    fn block_size(&self) -> usize;

    /// Encrypt the first `block_size()` bytes of `block` in place.
    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;

    /// Decrypt the first `block_size()` bytes of `block` in place.
    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError>;

    /// Encrypt one block from `src` into `dst`.
    ///
    /// Fails with [`CryptoError::BufferTooSmall`] if either buffer is shorter
    /// than one block and with [`CryptoError::InvalidOverlap`] if the two
    /// blocks overlap at different offsets.
    fn encrypt(&self, dst: &mut [u8], src: &[u8]) -> Result<(), CryptoError> {
        let bs = self.block_size();
        check_block_io(dst, src, bs)?;
        dst[..bs].copy_from_slice(&src[..bs]);
        self.encrypt_block(&mut dst[..bs])
    }

    /// Decrypt one block from `src` into `dst`.
    fn decrypt(&self, dst: &mut [u8], src: &[u8]) -> Result<(), CryptoError> {
        let bs = self.block_size();
        check_block_io(dst, src, bs)?;
        dst[..bs].copy_from_slice(&src[..bs]);
        self.decrypt_block(&mut dst[..bs])
    }
}

impl<C: BlockCipher + ?Sized> BlockCipher for &C {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        (**self).decrypt_block(block)
    }
}

impl<C: BlockCipher + ?Sized> BlockCipher for Box<C> {
    fn block_size(&self) -> usize {
        (**self).block_size()
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        (**self).encrypt_block(block)
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        (**self).decrypt_block(block)
    }
}

/// A self-clocked byte-stream cipher (e.g., WAKE, the rotor cipher).
///
/// Run state advances with every byte, so the same call sequence on two
/// instances built from the same key yields the same output.
pub trait StreamCipher {
    /// Byte-wise block contract: always 1.
    fn block_size(&self) -> usize {
        1
    }

    /// Encrypt `data` in place.
    fn encrypt_in_place(&mut self, data: &mut [u8]);

    /// Decrypt `data` in place.
    fn decrypt_in_place(&mut self, data: &mut [u8]);

    /// Encrypt all of `src` into the front of `dst`.
    fn encrypt(&mut self, dst: &mut [u8], src: &[u8]) -> Result<(), CryptoError> {
        check_stream_io(dst, src)?;
        let out = &mut dst[..src.len()];
        out.copy_from_slice(src);
        self.encrypt_in_place(out);
        Ok(())
    }

    /// Decrypt all of `src` into the front of `dst`.
    fn decrypt(&mut self, dst: &mut [u8], src: &[u8]) -> Result<(), CryptoError> {
        check_stream_io(dst, src)?;
        let out = &mut dst[..src.len()];
        out.copy_from_slice(src);
        self.decrypt_in_place(out);
        Ok(())
    }
}

/// A block-granular mode of operation (e.g., PCBC).
pub trait BlockMode {
    /// Block size of the underlying cipher.
    fn block_size(&self) -> usize;

    /// Transform whole blocks in place.
    ///
    /// `buf.len()` must be a multiple of `block_size()`.
    fn crypt_blocks_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError>;

    /// Re-arm the feedback register for a new message.
    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CryptoError>;

    /// Transform whole blocks from `src` into the front of `dst`.
    fn crypt_blocks(&mut self, dst: &mut [u8], src: &[u8]) -> Result<(), CryptoError> {
        check_full_blocks(src.len(), self.block_size())?;
        check_stream_io(dst, src)?;
        let out = &mut dst[..src.len()];
        out.copy_from_slice(src);
        self.crypt_blocks_in_place(out)
    }
}

/// A keystream mode of operation (e.g., CFB64, doubled-IV OFB).
pub trait StreamMode {
    /// XOR the keystream into `buf` in place. Any length is accepted.
    fn xor_keystream_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError>;

    /// Re-arm the feedback register and drop any buffered keystream.
    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CryptoError>;

    /// XOR the keystream with `src` into the front of `dst`.
    fn xor_keystream(&mut self, dst: &mut [u8], src: &[u8]) -> Result<(), CryptoError> {
        check_stream_io(dst, src)?;
        let out = &mut dst[..src.len()];
        out.copy_from_slice(src);
        self.xor_keystream_in_place(out)
    }
}
