//! Rotor-based stream cipher in the style of the Unix `crypt(1)` command.
//!
//! Three 256-entry rotors are derived from a 13-byte key: a random
//! permutation (rotor 1), its exact inverse (rotor 2), and a reflector made
//! of 128 disjoint swaps (rotor 3). Each byte passes forward through rotor 1,
//! bounces off the reflector, and returns through rotor 2, with the rotor
//! offsets advancing like an odometer. Because the reflector is an
//! involution, the same transform both encrypts and decrypts.
//!
//! An optional deck shuffle replaces the plain odometer offsets with
//! positions drawn from a key-driven deck that is reshuffled every 256
//! bytes. It is off by default and must match on both ends.

use symforge_types::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::provider::StreamCipher;

/// Rotor cipher key size in bytes.
pub const ENIGMA_KEY_SIZE: usize = 13;

const ROTOR_SIZE: usize = 256;
const LCG_SEED: i32 = 123;
const LCG_MODULUS: i32 = 65521;

/// Run-time options for [`Enigma`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnigmaConfig {
    /// Draw rotor offsets from a deck that is reshuffled on every wrap of
    /// the first rotor.
    pub deck_shuffle: bool,
}

/// Advance the LCG with one key byte and return the next draw.
fn next_random(seed: &mut i32, key_byte: u8) -> u32 {
    *seed = seed.wrapping_mul(5).wrapping_add(key_byte as i32);
    (*seed % LCG_MODULUS) as u32
}

/// A keyed rotor stream.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Enigma {
    t1: [u8; ROTOR_SIZE],
    t2: [u8; ROTOR_SIZE],
    t3: [u8; ROTOR_SIZE],
    deck: [u8; ROTOR_SIZE],
    key: [u8; ENIGMA_KEY_SIZE],
    n1: usize,
    n2: usize,
    nr1: u8,
    nr2: u8,
    shuffle_seed: i32,
    deck_shuffle: bool,
}

impl Enigma {
    /// Create a rotor stream from a 13-byte key with the default config.
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        Self::with_config(key, EnigmaConfig::default())
    }

    /// Create a rotor stream from a 13-byte key.
    pub fn with_config(key: &[u8], config: EnigmaConfig) -> Result<Self, CryptoError> {
        if key.len() != ENIGMA_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength { got: key.len() });
        }
        let mut k = [0u8; ENIGMA_KEY_SIZE];
        k.copy_from_slice(key);

        let mut seed = LCG_SEED;
        for (i, &b) in k.iter().enumerate() {
            seed = seed.wrapping_mul(b as i32).wrapping_add(i as i32);
        }

        let mut t1 = [0u8; ROTOR_SIZE];
        let mut deck = [0u8; ROTOR_SIZE];
        for i in 0..ROTOR_SIZE {
            t1[i] = i as u8;
            deck[i] = i as u8;
        }

        let mut t3 = [0u8; ROTOR_SIZE];
        for i in 0..ROTOR_SIZE {
            let mut random = next_random(&mut seed, k[i % ENIGMA_KEY_SIZE]);
            let top = ROTOR_SIZE - 1 - i;
            let ic = (random & 0xff) as usize % (top + 1);
            random >>= 8;
            t1.swap(top, ic);

            // Index 0 is always paired by the time `top` reaches it.
            if t3[top] != 0 || top == 0 {
                continue;
            }
            let mut ic = (random & 0xff) as usize % top;
            while t3[ic] != 0 {
                ic = (ic + 1) % top;
            }
            t3[top] = ic as u8;
            t3[ic] = top as u8;
        }

        let mut t2 = [0u8; ROTOR_SIZE];
        for (i, &v) in t1.iter().enumerate() {
            t2[v as usize] = i as u8;
        }
        seed.zeroize();

        tracing::debug!(
            algorithm = "enigma",
            deck_shuffle = config.deck_shuffle,
            "rotors initialised"
        );
        Ok(Self {
            t1,
            t2,
            t3,
            deck,
            key: k,
            n1: 0,
            n2: 0,
            nr1: 0,
            nr2: 0,
            shuffle_seed: LCG_SEED,
            deck_shuffle: config.deck_shuffle,
        })
    }

    /// The configuration this stream was built with.
    pub fn config(&self) -> EnigmaConfig {
        EnigmaConfig {
            deck_shuffle: self.deck_shuffle,
        }
    }

    fn shuffle(&mut self) {
        for i in 0..ROTOR_SIZE {
            let random = next_random(&mut self.shuffle_seed, self.key[i % ENIGMA_KEY_SIZE]);
            let top = ROTOR_SIZE - 1 - i;
            let ic = (random & 0xff) as usize % (top + 1);
            self.deck.swap(top, ic);
        }
    }

    fn process(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            if self.deck_shuffle {
                self.nr1 = self.deck[self.n1];
                self.nr2 = self.deck[self.nr1 as usize];
            } else {
                self.nr1 = self.n1 as u8;
            }

            let a = self.t1[byte.wrapping_add(self.nr1) as usize];
            let b = self.t3[a.wrapping_add(self.nr2) as usize];
            let c = self.t2[b.wrapping_sub(self.nr2) as usize];
            *byte = c.wrapping_sub(self.nr1);

            self.n1 += 1;
            if self.n1 == ROTOR_SIZE {
                self.n1 = 0;
                self.n2 = (self.n2 + 1) % ROTOR_SIZE;
                if self.deck_shuffle {
                    self.shuffle();
                } else {
                    self.nr2 = self.n2 as u8;
                }
            }
        }
    }
}

impl StreamCipher for Enigma {
    fn encrypt_in_place(&mut self, data: &mut [u8]) {
        self.process(data);
    }

    fn decrypt_in_place(&mut self, data: &mut [u8]) {
        self.process(data);
    }
}
