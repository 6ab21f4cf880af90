//! CFB64 (64-bit Cipher Feedback) mode of operation.
//!
//! The feedback register is one cipher block wide. Each 8-byte segment of
//! input is XOR-ed with the first 8 bytes of `E(register)`; the register
//! then shifts left by 8 bytes and the segment's ciphertext fills the
//! vacated tail. Any input length is accepted and a partial segment carries
//! over to the next call.
//!
//! The underlying cipher must have a block size of at least 8 bytes.

use symforge_types::CryptoError;
use zeroize::Zeroize;

use super::check_iv_len;
use crate::provider::{BlockCipher, StreamMode};

/// CFB64 feedback segment size in bytes.
pub const CFB64_SEGMENT_SIZE: usize = 8;

struct Cfb64State<C: BlockCipher> {
    cipher: C,
    register: Vec<u8>,
    keystream: Vec<u8>,
    segment: [u8; CFB64_SEGMENT_SIZE],
    pos: usize,
}

impl<C: BlockCipher> Cfb64State<C> {
    fn new(cipher: C, iv: &[u8]) -> Result<Self, CryptoError> {
        let bs = cipher.block_size();
        if bs < CFB64_SEGMENT_SIZE {
            return Err(CryptoError::NotSupported);
        }
        check_iv_len(iv, bs)?;
        Ok(Self {
            cipher,
            register: iv.to_vec(),
            keystream: vec![0u8; bs],
            segment: [0u8; CFB64_SEGMENT_SIZE],
            pos: 0,
        })
    }

    fn process(&mut self, buf: &mut [u8], decrypting: bool) -> Result<(), CryptoError> {
        for byte in buf.iter_mut() {
            if self.pos == 0 {
                self.keystream.copy_from_slice(&self.register);
                self.cipher.encrypt_block(&mut self.keystream)?;
            }

            let input = *byte;
            let output = input ^ self.keystream[self.pos];
            *byte = output;
            self.segment[self.pos] = if decrypting { input } else { output };

            self.pos += 1;
            if self.pos == CFB64_SEGMENT_SIZE {
                let tail = self.register.len() - CFB64_SEGMENT_SIZE;
                self.register.copy_within(CFB64_SEGMENT_SIZE.., 0);
                self.register[tail..].copy_from_slice(&self.segment);
                self.pos = 0;
            }
        }
        Ok(())
    }

    fn reset(&mut self, iv: &[u8]) -> Result<(), CryptoError> {
        check_iv_len(iv, self.register.len())?;
        self.register.copy_from_slice(iv);
        self.keystream.as_mut_slice().zeroize();
        self.segment.zeroize();
        self.pos = 0;
        Ok(())
    }
}

impl<C: BlockCipher> Drop for Cfb64State<C> {
    fn drop(&mut self) {
        self.register.zeroize();
        self.keystream.zeroize();
        self.segment.zeroize();
    }
}

/// CFB64 encryptor over any block cipher with a block of 8 bytes or more.
pub struct Cfb64Encryptor<C: BlockCipher> {
    state: Cfb64State<C>,
}

/// CFB64 decryptor over any block cipher with a block of 8 bytes or more.
pub struct Cfb64Decryptor<C: BlockCipher> {
    state: Cfb64State<C>,
}

impl<C: BlockCipher> Cfb64Encryptor<C> {
    /// Wrap `cipher` with an IV of exactly one block.
    ///
    /// Fails with [`CryptoError::NotSupported`] if the cipher's block is
    /// shorter than one segment.
    pub fn new(cipher: C, iv: &[u8]) -> Result<Self, CryptoError> {
        let state = Cfb64State::new(cipher, iv)?;
        tracing::debug!(
            mode = "cfb64",
            block_size = state.register.len(),
            "encryptor created"
        );
        Ok(Self { state })
    }
}

impl<C: BlockCipher> Cfb64Decryptor<C> {
    /// Wrap `cipher` with an IV of exactly one block.
    pub fn new(cipher: C, iv: &[u8]) -> Result<Self, CryptoError> {
        let state = Cfb64State::new(cipher, iv)?;
        tracing::debug!(
            mode = "cfb64",
            block_size = state.register.len(),
            "decryptor created"
        );
        Ok(Self { state })
    }
}

impl<C: BlockCipher> StreamMode for Cfb64Encryptor<C> {
    fn xor_keystream_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.state.process(buf, false)
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CryptoError> {
        self.state.reset(iv)?;
        tracing::debug!(mode = "cfb64", "encryptor iv reset");
        Ok(())
    }
}

impl<C: BlockCipher> StreamMode for Cfb64Decryptor<C> {
    fn xor_keystream_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        self.state.process(buf, true)
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CryptoError> {
        self.state.reset(iv)?;
        tracing::debug!(mode = "cfb64", "decryptor iv reset");
        Ok(())
    }
}
