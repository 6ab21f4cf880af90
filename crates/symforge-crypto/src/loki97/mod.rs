//! LOKI97 block cipher implementation.
//!
//! LOKI97 is a 128-bit, 16-round Feistel cipher (an AES candidate) that
//! accepts 128, 192 and 256-bit keys. Its round function combines a
//! key-selected bit swap, two generated S-boxes (cubing in GF(2^13) and
//! GF(2^11)) and a bit transposition. The same round function drives the
//! key schedule, which produces 48 64-bit subkeys (three per round).
//!
//! The round count may be raised in multiples of 16; every additional
//! 16-round pass reuses the same 48 subkeys.

mod tables;

use symforge_types::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::provider::BlockCipher;
use tables::{tables, S1_MASK, S2_MASK};

/// LOKI97 block size in bytes (128 bits).
pub const LOKI97_BLOCK_SIZE: usize = 16;

/// Accepted LOKI97 key sizes in bytes.
pub const LOKI97_KEY_SIZES: [usize; 3] = [16, 24, 32];

/// Default (and minimum) number of rounds.
pub const LOKI97_ROUNDS: usize = 16;

const NUM_SUBKEYS: usize = 3 * LOKI97_ROUNDS;

// floor((sqrt(5) - 1) * 2^63)
const DELTA: u64 = 0x9e37_79b9_7f4a_7c15;

/// The LOKI97 round function f(A, B).
///
/// The low 32 bits of `b` select which bits of the two halves of `a` are
/// swapped (KP); the result is expanded into eight overlapping 13/11-bit
/// windows for the first S-box layer (Sa), transposed (P), and passed
/// through the second S-box layer (Sb) with the high 32 bits of `b`
/// supplying the upper S-box input bits.
fn compute(a: u64, b: u64) -> u64 {
    let t = tables();

    let select = (b & 0xffff_ffff) * 0x1_0000_0001;
    let kp = (a & !select) | (a.rotate_left(32) & select);

    let s1 = |x: u64| t.perm[t.s1[(x & S1_MASK as u64) as usize] as usize];
    let s2 = |x: u64| t.perm[t.s2[(x & S2_MASK as u64) as usize] as usize];

    let p = (s1(kp.rotate_left(8)) >> 7)
        | (s2(kp >> 48) >> 6)
        | (s1(kp >> 40) >> 5)
        | (s2(kp >> 32) >> 4)
        | (s2(kp >> 24) >> 3)
        | (s1(kp >> 16) >> 2)
        | (s2(kp >> 8) >> 1)
        | s1(kp);

    let kh = (b >> 32) as u32;
    let pb = p.to_le_bytes();
    let sb1 = |byte: u8, hi: u32| t.s1[(byte as u32 | (hi & 0x1f00)) as usize] as u64;
    let sb2 = |byte: u8, hi: u32| t.s2[(byte as u32 | (hi & 0x0700)) as usize] as u64;

    let lo = sb1(pb[0], kh << 8)
        | (sb1(pb[1], kh << 3) << 8)
        | (sb2(pb[2], kh >> 2) << 16)
        | (sb2(pb[3], kh >> 5) << 24);
    let hi = sb1(pb[4], kh >> 8)
        | (sb1(pb[5], kh >> 13) << 8)
        | (sb2(pb[6], kh >> 18) << 16)
        | (sb2(pb[7], kh >> 21) << 24);
    (hi << 32) | lo
}

/// A LOKI97 key with its 48-entry subkey schedule.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Loki97 {
    subkeys: [u64; NUM_SUBKEYS],
    rounds: usize,
}

impl Loki97 {
    /// Create a 16-round LOKI97 instance from a 16, 24 or 32-byte key.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        Self::with_rounds(key, LOKI97_ROUNDS)
    }

    /// Create a LOKI97 instance running `rounds` rounds.
    ///
    /// `rounds` must be a positive multiple of 16.
    pub fn with_rounds(key: &[u8], rounds: usize) -> Result<Self, CryptoError> {
        if !LOKI97_KEY_SIZES.contains(&key.len()) {
            return Err(CryptoError::InvalidKeyLength { got: key.len() });
        }
        if rounds == 0 || rounds % LOKI97_ROUNDS != 0 {
            return Err(CryptoError::InvalidRounds { rounds });
        }

        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(key.chunks_exact(8)) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(chunk);
            *word = u64::from_be_bytes(bytes);
        }

        let (mut k4, mut k3) = (words[0], words[1]);
        let (mut k2, mut k1) = match key.len() {
            16 => (compute(k3, k4), compute(k4, k3)),
            24 => (words[2], compute(k4, k3)),
            _ => (words[2], words[3]),
        };
        words.zeroize();

        let mut subkeys = [0u64; NUM_SUBKEYS];
        let mut delta = DELTA;
        for sk in subkeys.iter_mut() {
            let t = k1.wrapping_add(k3).wrapping_add(delta);
            *sk = k4 ^ compute(t, k2);
            k4 = k3;
            k3 = k2;
            k2 = k1;
            k1 = *sk;
            delta = delta.wrapping_add(DELTA);
        }
        k1.zeroize();
        k2.zeroize();
        k3.zeroize();
        k4.zeroize();

        tracing::debug!(algorithm = "loki97", key_len = key.len(), rounds, "key schedule expanded");
        Ok(Self { subkeys, rounds })
    }

    /// Number of rounds this instance runs.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn round_keys(&self, round: usize) -> &[u64] {
        let base = 3 * (round % LOKI97_ROUNDS);
        &self.subkeys[base..base + 3]
    }
}

fn load_halves(block: &[u8]) -> (u64, u64) {
    let mut l = [0u8; 8];
    let mut r = [0u8; 8];
    l.copy_from_slice(&block[..8]);
    r.copy_from_slice(&block[8..LOKI97_BLOCK_SIZE]);
    (u64::from_be_bytes(l), u64::from_be_bytes(r))
}

fn store_halves(block: &mut [u8], first: u64, second: u64) {
    block[..8].copy_from_slice(&first.to_be_bytes());
    block[8..LOKI97_BLOCK_SIZE].copy_from_slice(&second.to_be_bytes());
}

fn check_block(block: &[u8]) -> Result<(), CryptoError> {
    if block.len() < LOKI97_BLOCK_SIZE {
        return Err(CryptoError::BufferTooSmall {
            need: LOKI97_BLOCK_SIZE,
            got: block.len(),
        });
    }
    Ok(())
}

impl BlockCipher for Loki97 {
    fn block_size(&self) -> usize {
        LOKI97_BLOCK_SIZE
    }

    fn encrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        check_block(block)?;
        let (mut l, mut r) = load_halves(block);
        for round in 0..self.rounds {
            let k = self.round_keys(round);
            let t = r.wrapping_add(k[0]);
            let next_r = l ^ compute(t, k[1]);
            l = t.wrapping_add(k[2]);
            r = next_r;
        }
        store_halves(block, r, l);
        Ok(())
    }

    fn decrypt_block(&self, block: &mut [u8]) -> Result<(), CryptoError> {
        check_block(block)?;
        // Ciphertext is R || L; walk the rounds backwards.
        let (mut r, mut l) = load_halves(block);
        for round in (0..self.rounds).rev() {
            let k = self.round_keys(round);
            let t = l.wrapping_sub(k[2]);
            let prev_l = r ^ compute(t, k[1]);
            r = t.wrapping_sub(k[0]);
            l = prev_l;
        }
        store_halves(block, l, r);
        Ok(())
    }
}
