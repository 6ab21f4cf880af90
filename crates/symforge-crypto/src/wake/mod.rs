//! WAKE (Word Auto Key Encryption) stream cipher.
//!
//! WAKE keeps a 257-entry table of 32-bit words derived from the key and
//! four running registers. Each output byte is the input byte XOR-ed with
//! one byte of the last register; after every four bytes the ciphertext
//! word is fed back through the table to advance all four registers, so the
//! keystream depends on everything encrypted so far. The cipher therefore
//! cannot be rewound; build a new instance to start over.

use symforge_types::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::provider::StreamCipher;

/// WAKE key size in bytes (256 bits).
pub const WAKE_KEY_SIZE: usize = 32;

/// Longest IV consumed by [`Wake::with_iv`]; extra bytes are ignored.
pub const WAKE_MAX_IV_SIZE: usize = 32;

const TABLE_LEN: usize = 257;

// Substitution constants for the table recurrence.
const TT: [u32; 8] = [
    0x726a8f3b, 0xe69a3b5c, 0xd3c71fe5, 0xab3c73d2, 0x4d3a8eb3, 0x0396d6e8, 0x3d4c2f7a, 0x9ee27cf3,
];

/// A keyed WAKE stream.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Wake {
    table: [u32; TABLE_LEN],
    regs: [u32; 4],
    /// Ciphertext bytes of the current word, least significant first.
    feedback: u32,
    /// Byte position within the current word (0..4).
    counter: usize,
}

impl Wake {
    /// Create a WAKE stream from a 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != WAKE_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength { got: key.len() });
        }

        let mut k = [0u32; 8];
        for (word, chunk) in k.iter_mut().zip(key.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        let table = expand_table(&k);
        let regs = [k[0], k[1], k[2], k[3]];
        k.zeroize();

        tracing::debug!(algorithm = "wake", key_len = key.len(), "table initialised");
        Ok(Self {
            table,
            regs,
            feedback: 0,
            counter: 0,
        })
    }

    /// Create a WAKE stream and prime it with an IV.
    ///
    /// At most [`WAKE_MAX_IV_SIZE`] bytes are used, rounded down to a whole
    /// number of 4-byte words. The IV is encrypted once and the output
    /// discarded, so both ends must prime with the same IV.
    pub fn with_iv(key: &[u8], iv: &[u8]) -> Result<Self, CryptoError> {
        let mut wake = Self::new(key)?;
        let used = iv.len().min(WAKE_MAX_IV_SIZE) / 4 * 4;
        let mut scratch = [0u8; WAKE_MAX_IV_SIZE];
        scratch[..used].copy_from_slice(&iv[..used]);
        wake.process(&mut scratch[..used], true);
        scratch.zeroize();
        tracing::debug!(algorithm = "wake", iv_len = used, "stream primed");
        Ok(wake)
    }

    /// M(x, y): table lookup on the low byte of the sum, mixed with the rest.
    fn mix(&self, x: u32, y: u32) -> u32 {
        let w = x.wrapping_add(y);
        self.table[(w & 0xff) as usize] ^ (w >> 8)
    }

    fn clock(&mut self) {
        self.regs[0] = self.mix(self.regs[0], self.feedback);
        self.regs[1] = self.mix(self.regs[1], self.regs[0]);
        self.regs[2] = self.mix(self.regs[2], self.regs[1]);
        self.regs[3] = self.mix(self.regs[3], self.regs[2]);
        self.feedback = 0;
    }

    fn process(&mut self, data: &mut [u8], encrypting: bool) {
        for byte in data.iter_mut() {
            let input = *byte;
            let output = input ^ (self.regs[3] >> (8 * self.counter)) as u8;
            *byte = output;

            let cipher_byte = if encrypting { output } else { input };
            self.feedback |= (cipher_byte as u32) << (8 * self.counter);
            self.counter += 1;
            if self.counter == 4 {
                self.counter = 0;
                self.clock();
            }
        }
    }
}

fn expand_table(k: &[u32; 8]) -> [u32; TABLE_LEN] {
    let mut t = [0u32; TABLE_LEN];
    t[..8].copy_from_slice(k);

    for p in 8..256 {
        let x = t[p - 4].wrapping_add(t[p - 1]);
        t[p] = (x >> 3) ^ TT[(x & 7) as usize];
    }

    for p in 0..23 {
        t[p] = t[p].wrapping_add(t[p + 89]);
    }

    let mut x = t[33];
    let z = (t[59] | 0x0100_0001) & 0xff7f_ffff;
    for entry in t[..256].iter_mut() {
        x = (x & 0xff7f_ffff).wrapping_add(z);
        *entry = (*entry & 0x00ff_ffff) ^ x;
    }

    // Key-dependent shuffle of the table entries.
    t[256] = t[0];
    let mut x = (x & 0xff) as usize;
    for p in 0..256 {
        x = ((t[p ^ x] ^ x as u32) & 0xff) as usize;
        t[p] = t[x];
        t[x] = t[p + 1];
    }
    t
}

impl StreamCipher for Wake {
    fn encrypt_in_place(&mut self, data: &mut [u8]) {
        self.process(data, true);
    }

    fn decrypt_in_place(&mut self, data: &mut [u8]) {
        self.process(data, false);
    }
}
