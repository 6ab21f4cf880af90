//! PCBC (Propagating Cipher Block Chaining) mode of operation.
//!
//! Like CBC, each plaintext block is XOR-ed with a chaining value before
//! encryption, but the chaining value for the next block is `P[i] ^ C[i]`
//! rather than `C[i]` alone. A corrupted ciphertext block therefore garbles
//! every block that follows it.
//!
//! Only whole blocks are accepted; no padding is applied.

use symforge_types::CryptoError;
use zeroize::Zeroize;

use super::{check_iv_len, xor_in_place};
use crate::alias::check_full_blocks;
use crate::provider::{BlockCipher, BlockMode};

/// PCBC encryptor over any block cipher.
pub struct PcbcEncryptor<C: BlockCipher> {
    cipher: C,
    iv: Vec<u8>,
    scratch: Vec<u8>,
}

/// PCBC decryptor over any block cipher.
pub struct PcbcDecryptor<C: BlockCipher> {
    cipher: C,
    iv: Vec<u8>,
    scratch: Vec<u8>,
}

impl<C: BlockCipher> PcbcEncryptor<C> {
    /// Wrap `cipher` with an IV of exactly one block.
    ///
    /// Fails with [`CryptoError::NotSupported`] for a zero block size.
    pub fn new(cipher: C, iv: &[u8]) -> Result<Self, CryptoError> {
        let bs = cipher.block_size();
        if bs == 0 {
            return Err(CryptoError::NotSupported);
        }
        check_iv_len(iv, bs)?;
        tracing::debug!(mode = "pcbc", block_size = bs, "encryptor created");
        Ok(Self {
            cipher,
            iv: iv.to_vec(),
            scratch: vec![0u8; bs],
        })
    }
}

impl<C: BlockCipher> PcbcDecryptor<C> {
    /// Wrap `cipher` with an IV of exactly one block.
    ///
    /// Fails with [`CryptoError::NotSupported`] for a zero block size.
    pub fn new(cipher: C, iv: &[u8]) -> Result<Self, CryptoError> {
        let bs = cipher.block_size();
        if bs == 0 {
            return Err(CryptoError::NotSupported);
        }
        check_iv_len(iv, bs)?;
        tracing::debug!(mode = "pcbc", block_size = bs, "decryptor created");
        Ok(Self {
            cipher,
            iv: iv.to_vec(),
            scratch: vec![0u8; bs],
        })
    }
}

impl<C: BlockCipher> BlockMode for PcbcEncryptor<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn crypt_blocks_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        let bs = self.cipher.block_size();
        check_full_blocks(buf.len(), bs)?;
        for block in buf.chunks_exact_mut(bs) {
            self.scratch.copy_from_slice(block);
            xor_in_place(block, &self.iv);
            self.cipher.encrypt_block(block)?;
            self.iv.copy_from_slice(&self.scratch);
            xor_in_place(&mut self.iv, block);
        }
        Ok(())
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CryptoError> {
        check_iv_len(iv, self.iv.len())?;
        self.iv.copy_from_slice(iv);
        tracing::debug!(mode = "pcbc", "encryptor iv reset");
        Ok(())
    }
}

impl<C: BlockCipher> BlockMode for PcbcDecryptor<C> {
    fn block_size(&self) -> usize {
        self.cipher.block_size()
    }

    fn crypt_blocks_in_place(&mut self, buf: &mut [u8]) -> Result<(), CryptoError> {
        let bs = self.cipher.block_size();
        check_full_blocks(buf.len(), bs)?;
        for block in buf.chunks_exact_mut(bs) {
            self.scratch.copy_from_slice(block);
            self.cipher.decrypt_block(block)?;
            xor_in_place(block, &self.iv);
            self.iv.copy_from_slice(&self.scratch);
            xor_in_place(&mut self.iv, block);
        }
        Ok(())
    }

    fn set_iv(&mut self, iv: &[u8]) -> Result<(), CryptoError> {
        check_iv_len(iv, self.iv.len())?;
        self.iv.copy_from_slice(iv);
        tracing::debug!(mode = "pcbc", "decryptor iv reset");
        Ok(())
    }
}

impl<C: BlockCipher> Drop for PcbcEncryptor<C> {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.scratch.zeroize();
    }
}

impl<C: BlockCipher> Drop for PcbcDecryptor<C> {
    fn drop(&mut self) {
        self.iv.zeroize();
        self.scratch.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::test_cipher::ToyCipher;

    fn toy(block_size: usize) -> ToyCipher {
        ToyCipher {
            block_size,
            key: 0x3c,
        }
    }

    #[test]
    fn chaining_matches_definition() {
        let cipher = toy(8);
        let iv = [0xa5u8; 8];
        let pt: Vec<u8> = (0..24).collect();

        let mut ct = pt.clone();
        PcbcEncryptor::new(&cipher, &iv)
            .unwrap()
            .crypt_blocks_in_place(&mut ct)
            .unwrap();

        let mut chain = iv.to_vec();
        for (p, c) in pt.chunks(8).zip(ct.chunks(8)) {
            let mut expected = p.to_vec();
            xor_in_place(&mut expected, &chain);
            cipher.encrypt_block(&mut expected).unwrap();
            assert_eq!(c, &expected[..]);
            chain = p.to_vec();
            xor_in_place(&mut chain, c);
        }
    }

    #[test]
    fn roundtrip_over_block_sizes() {
        for bs in [1usize, 4, 8, 16, 32] {
            let cipher = toy(bs);
            let iv: Vec<u8> = (0..bs as u8).collect();
            let pt: Vec<u8> = (0..bs * 7).map(|i| (i * 13) as u8).collect();

            let mut ct = vec![0u8; pt.len()];
            PcbcEncryptor::new(&cipher, &iv)
                .unwrap()
                .crypt_blocks(&mut ct, &pt)
                .unwrap();

            let mut back = vec![0u8; ct.len()];
            PcbcDecryptor::new(&cipher, &iv)
                .unwrap()
                .crypt_blocks(&mut back, &ct)
                .unwrap();
            assert_eq!(back, pt, "block size {bs}");
        }
    }

    #[test]
    fn chaining_carries_across_calls() {
        let cipher = toy(16);
        let iv = [7u8; 16];
        let pt = [0x11u8; 64];

        let mut whole = pt;
        PcbcEncryptor::new(&cipher, &iv)
            .unwrap()
            .crypt_blocks_in_place(&mut whole)
            .unwrap();

        let mut split = pt;
        let mut enc = PcbcEncryptor::new(&cipher, &iv).unwrap();
        for chunk in split.chunks_mut(16) {
            enc.crypt_blocks_in_place(chunk).unwrap();
        }
        assert_eq!(whole, split);
    }

    #[test]
    fn corruption_propagates() {
        let cipher = toy(8);
        let iv = [0u8; 8];
        let pt = [0x42u8; 32];
        let mut ct = pt;
        PcbcEncryptor::new(&cipher, &iv)
            .unwrap()
            .crypt_blocks_in_place(&mut ct)
            .unwrap();

        ct[0] ^= 1;
        let mut back = ct;
        PcbcDecryptor::new(&cipher, &iv)
            .unwrap()
            .crypt_blocks_in_place(&mut back)
            .unwrap();
        for (i, (b, p)) in back.chunks(8).zip(pt.chunks(8)).enumerate() {
            assert_ne!(b, p, "block {i} should be garbled");
        }
    }

    #[test]
    fn set_iv_restarts_chain() {
        let cipher = toy(8);
        let pt = [0x99u8; 16];
        let mut enc = PcbcEncryptor::new(&cipher, &[1u8; 8]).unwrap();

        let mut first = pt;
        enc.crypt_blocks_in_place(&mut first).unwrap();
        enc.set_iv(&[1u8; 8]).unwrap();
        let mut second = pt;
        enc.crypt_blocks_in_place(&mut second).unwrap();
        assert_eq!(first, second);

        let mut dec = PcbcDecryptor::new(&cipher, &[0u8; 8]).unwrap();
        dec.set_iv(&[1u8; 8]).unwrap();
        dec.crypt_blocks_in_place(&mut second).unwrap();
        assert_eq!(second, pt);
    }

    #[test]
    fn iv_length_enforced() {
        let cipher = toy(16);
        assert_eq!(
            PcbcEncryptor::new(&cipher, &[0u8; 8]).err(),
            Some(CryptoError::InvalidIvLength {
                expected: 16,
                got: 8
            })
        );
        assert!(matches!(
            PcbcDecryptor::new(&cipher, &[0u8; 17]),
            Err(CryptoError::InvalidIvLength {
                expected: 16,
                got: 17
            })
        ));

        let mut enc = PcbcEncryptor::new(&cipher, &[0u8; 16]).unwrap();
        assert_eq!(
            enc.set_iv(&[0u8; 15]),
            Err(CryptoError::InvalidIvLength {
                expected: 16,
                got: 15
            })
        );
    }

    #[test]
    fn partial_block_rejected() {
        for bs in [1usize, 4, 8, 16, 32] {
            let cipher = toy(bs);
            let iv = vec![0u8; bs];
            let mut enc = PcbcEncryptor::new(&cipher, &iv).unwrap();
            let mut dec = PcbcDecryptor::new(&cipher, &iv).unwrap();

            for len in [1usize, bs + 3, 2 * bs - 1, 3 * bs + 1] {
                let mut buf = vec![0u8; len];
                let mut dst = vec![0u8; len];
                if len % bs == 0 {
                    // Every length is whole blocks when the block is one byte.
                    enc.crypt_blocks_in_place(&mut buf).unwrap();
                    dec.crypt_blocks(&mut dst, &buf).unwrap();
                    continue;
                }
                let expected = Err(CryptoError::PartialBlock {
                    len,
                    block_size: bs,
                });
                assert_eq!(enc.crypt_blocks_in_place(&mut buf), expected, "bs {bs}");
                assert_eq!(buf, vec![0u8; len]);
                assert_eq!(dec.crypt_blocks(&mut dst, &buf), expected, "bs {bs}");
                assert_eq!(dst, vec![0u8; len]);
            }
        }
    }

    #[test]
    fn zero_block_size_not_supported() {
        let cipher = toy(0);
        assert_eq!(
            PcbcEncryptor::new(&cipher, &[]).err(),
            Some(CryptoError::NotSupported)
        );
        assert_eq!(
            PcbcDecryptor::new(&cipher, &[]).err(),
            Some(CryptoError::NotSupported)
        );
    }

    #[test]
    fn short_destination_rejected() {
        let cipher = toy(8);
        let mut enc = PcbcEncryptor::new(&cipher, &[0u8; 8]).unwrap();
        let mut dst = [0u8; 8];
        assert_eq!(
            enc.crypt_blocks(&mut dst, &[0u8; 16]),
            Err(CryptoError::BufferTooSmall { need: 16, got: 8 })
        );
    }

    #[test]
    fn empty_input_is_noop() {
        let cipher = toy(8);
        let mut enc = PcbcEncryptor::new(&cipher, &[3u8; 8]).unwrap();
        enc.crypt_blocks_in_place(&mut []).unwrap();
        assert_eq!(enc.iv, vec![3u8; 8]);
    }

    #[cfg(feature = "sm4")]
    #[test]
    fn pcbc_over_sm4() {
        use crate::sm4::Sm4Key;
        let cipher = Sm4Key::new(&[0x2bu8; 16]).unwrap();
        let iv = [0x0fu8; 16];
        let pt: Vec<u8> = (0..96).collect();

        let mut ct = pt.clone();
        PcbcEncryptor::new(&cipher, &iv)
            .unwrap()
            .crypt_blocks_in_place(&mut ct)
            .unwrap();
        let mut first = pt[..16].to_vec();
        xor_in_place(&mut first, &iv);
        cipher.encrypt_block(&mut first).unwrap();
        assert_eq!(&ct[..16], &first[..]);

        PcbcDecryptor::new(&cipher, &iv)
            .unwrap()
            .crypt_blocks_in_place(&mut ct)
            .unwrap();
        assert_eq!(ct, pt);
    }
}
