//! SM4 block cipher implementation.
//!
//! SM4 is a 128-bit block cipher standardized by the Chinese government
//! (GB/T 32907-2016). It uses a 128-bit key and 32 unbalanced Feistel
//! rounds over four 32-bit words.
//!
//! The round function is available in two forms: a byte-wise S-box path and
//! a word-table path. The first and last four rounds always take the
//! byte-wise path so that the key-dependent table indices of the boundary
//! rounds are not exposed to cache-timing observation; the middle rounds use
//! the word tables. Both paths compute the same function.

use symforge_types::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::provider::BlockCipher;

/// SM4 block size in bytes (128 bits).
pub const SM4_BLOCK_SIZE: usize = 16;

/// SM4 key size in bytes (128 bits).
pub const SM4_KEY_SIZE: usize = 16;

const ROUNDS: usize = 32;

/// Rounds at each end of the schedule that use the byte-wise S-box path.
const BOUNDARY_ROUNDS: usize = 4;

// S-box (GB/T 32907-2016, table 1).
const SBOX: [u8; 256] = [
    0xd6, 0x90, 0xe9, 0xfe, 0xcc, 0xe1, 0x3d, 0xb7, 0x16, 0xb6, 0x14, 0xc2, 0x28, 0xfb, 0x2c, 0x05,
    0x2b, 0x67, 0x9a, 0x76, 0x2a, 0xbe, 0x04, 0xc3, 0xaa, 0x44, 0x13, 0x26, 0x49, 0x86, 0x06, 0x99,
    0x9c, 0x42, 0x50, 0xf4, 0x91, 0xef, 0x98, 0x7a, 0x33, 0x54, 0x0b, 0x43, 0xed, 0xcf, 0xac, 0x62,
    0xe4, 0xb3, 0x1c, 0xa9, 0xc9, 0x08, 0xe8, 0x95, 0x80, 0xdf, 0x94, 0xfa, 0x75, 0x8f, 0x3f, 0xa6,
    0x47, 0x07, 0xa7, 0xfc, 0xf3, 0x73, 0x17, 0xba, 0x83, 0x59, 0x3c, 0x19, 0xe6, 0x85, 0x4f, 0xa8,
    0x68, 0x6b, 0x81, 0xb2, 0x71, 0x64, 0xda, 0x8b, 0xf8, 0xeb, 0x0f, 0x4b, 0x70, 0x56, 0x9d, 0x35,
    0x1e, 0x24, 0x0e, 0x5e, 0x63, 0x58, 0xd1, 0xa2, 0x25, 0x22, 0x7c, 0x3b, 0x01, 0x21, 0x78, 0x87,
    0xd4, 0x00, 0x46, 0x57, 0x9f, 0xd3, 0x27, 0x52, 0x4c, 0x36, 0x02, 0xe7, 0xa0, 0xc4, 0xc8, 0x9e,
    0xea, 0xbf, 0x8a, 0xd2, 0x40, 0xc7, 0x38, 0xb5, 0xa3, 0xf7, 0xf2, 0xce, 0xf9, 0x61, 0x15, 0xa1,
    0xe0, 0xae, 0x5d, 0xa4, 0x9b, 0x34, 0x1a, 0x55, 0xad, 0x93, 0x32, 0x30, 0xf5, 0x8c, 0xb1, 0xe3,
    0x1d, 0xf6, 0xe2, 0x2e, 0x82, 0x66, 0xca, 0x60, 0xc0, 0x29, 0x23, 0xab, 0x0d, 0x53, 0x4e, 0x6f,
    0xd5, 0xdb, 0x37, 0x45, 0xde, 0xfd, 0x8e, 0x2f, 0x03, 0xff, 0x6a, 0x72, 0x6d, 0x6c, 0x5b, 0x51,
    0x8d, 0x1b, 0xaf, 0x92, 0xbb, 0xdd, 0xbc, 0x7f, 0x11, 0xd9, 0x5c, 0x41, 0x1f, 0x10, 0x5a, 0xd8,
    0x0a, 0xc1, 0x31, 0x88, 0xa5, 0xcd, 0x7b, 0xbd, 0x2d, 0x74, 0xd0, 0x12, 0xb8, 0xe5, 0xb4, 0xb0,
    0x89, 0x69, 0x97, 0x4a, 0x0c, 0x96, 0x77, 0x7e, 0x65, 0xb9, 0xf1, 0x09, 0xc5, 0x6e, 0xc6, 0x84,
    0x18, 0xf0, 0x7d, 0xec, 0x3a, 0xdc, 0x4d, 0x20, 0x79, 0xee, 0x5f, 0x3e, 0xd7, 0xcb, 0x39, 0x48,
];

// System parameter.
const FK: [u32; 4] = [0xa3b1bac6, 0x56aa3350, 0x677d9197, 0xb27022dc];

// Round constants: byte j of CK[i] is 7 * (4i + j) mod 256.
const CK: [u32; ROUNDS] = gen_ck();

// Word tables for the middle rounds: Tn[x] = L(S(x) placed in byte n).
const T0: [u32; 256] = gen_round_table(24);
const T1: [u32; 256] = gen_round_table(16);
const T2: [u32; 256] = gen_round_table(8);
const T3: [u32; 256] = gen_round_table(0);

const fn gen_ck() -> [u32; ROUNDS] {
    let mut ck = [0u32; ROUNDS];
    let mut i = 0;
    while i < ROUNDS {
        let mut j = 0;
        while j < 4 {
            ck[i] = (ck[i] << 8) | (((4 * i + j) * 7) & 0xff) as u32;
            j += 1;
        }
        i += 1;
    }
    ck
}

const fn gen_round_table(shift: u32) -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = linear_round((SBOX[i] as u32) << shift);
        i += 1;
    }
    table
}

/// Linear transform L of the encryption round.
const fn linear_round(b: u32) -> u32 {
    b ^ b.rotate_left(2) ^ b.rotate_left(10) ^ b.rotate_left(18) ^ b.rotate_left(24)
}

/// Linear transform L' of the key schedule.
const fn linear_key(b: u32) -> u32 {
    b ^ b.rotate_left(13) ^ b.rotate_left(23)
}

/// Non-linear transform tau: the S-box applied to each byte.
fn tau(x: u32) -> u32 {
    let b = x.to_be_bytes();
    u32::from_be_bytes([
        SBOX[b[0] as usize],
        SBOX[b[1] as usize],
        SBOX[b[2] as usize],
        SBOX[b[3] as usize],
    ])
}

/// Round transform T, byte-wise path.
fn t_bytewise(x: u32) -> u32 {
    linear_round(tau(x))
}

/// Round transform T, word-table path.
fn t_table(x: u32) -> u32 {
    T0[(x >> 24) as usize]
        ^ T1[((x >> 16) & 0xff) as usize]
        ^ T2[((x >> 8) & 0xff) as usize]
        ^ T3[(x & 0xff) as usize]
}

/// An SM4 key with precomputed round keys.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Sm4Key {
    /// Precomputed round keys (32 rounds).
    round_keys: [u32; ROUNDS],
}

impl Sm4Key {
    /// Create a new SM4 key from 16 raw bytes.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != SM4_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength { got: key.len() });
        }

        let mut k = [0u32; 4];
        for (i, (word, chunk)) in k.iter_mut().zip(key.chunks_exact(4)).enumerate() {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) ^ FK[i];
        }

        let mut round_keys = [0u32; ROUNDS];
        for (i, rk) in round_keys.iter_mut().enumerate() {
            let x = k[(i + 1) % 4] ^ k[(i + 2) % 4] ^ k[(i + 3) % 4] ^ CK[i];
            k[i % 4] ^= linear_key(tau(x));
            *rk = k[i % 4];
        }
        k.zeroize();

        tracing::debug!(algorithm = "sm4", key_len = key.len(), "key schedule expanded");
        Ok(Self { round_keys })
    }

    fn crypt(&self, block: &mut [u8], decrypt: bool) -> Result<(), CryptoError> {
        if block.len() < SM4_BLOCK_SIZE {
            return Err(CryptoError::BufferTooSmall {
                need: SM4_BLOCK_SIZE,
                got: block.len(),
            });
        }

        let mut x = [0u32; 4];
        for (word, chunk) in x.iter_mut().zip(block.chunks_exact(4)) {
            *word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        for r in 0..ROUNDS {
            let rk = if decrypt {
                self.round_keys[ROUNDS - 1 - r]
            } else {
                self.round_keys[r]
            };
            let i = r % 4;
            let arg = x[(i + 1) % 4] ^ x[(i + 2) % 4] ^ x[(i + 3) % 4] ^ rk;
            x[i] ^= if r < BOUNDARY_ROUNDS || r >= ROUNDS - BOUNDARY_ROUNDS {
                t_bytewise(arg)
            } else {
                t_table(arg)
            };
        }

        for (chunk, word) in block[..SM4_BLOCK_SIZE].chunks_exact_mut(4).zip(x.iter().rev()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        Ok(())
    }
}

impl BlockCipher for Sm4Key {
    fn block_size(&self) -> usize {
        SM4_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        self.crypt(block, false)
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        self.crypt(block, true)
    }
}
