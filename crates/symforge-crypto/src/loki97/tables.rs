//! Generated LOKI97 tables.
//!
//! S1 and S2 are cubes in GF(2^13) and GF(2^11) of the bitwise complement of
//! their input, truncated to 8 bits. The permutation table spreads the eight
//! bits of an S-box output across the two 32-bit halves of the block so that
//! OR-ing eight shifted entries yields the transposed P layer.
//! Built once on first use via OnceLock and shared read-only afterwards.

use std::sync::OnceLock;

const S1_WIDTH: u32 = 13;
const S1_POLY: u32 = 0x2911;
pub(crate) const S1_MASK: u32 = (1 << S1_WIDTH) - 1;

const S2_WIDTH: u32 = 11;
const S2_POLY: u32 = 0x0aa7;
pub(crate) const S2_MASK: u32 = (1 << S2_WIDTH) - 1;

pub(crate) struct Tables {
    pub(crate) s1: [u8; 1 << S1_WIDTH],
    pub(crate) s2: [u8; 1 << S2_WIDTH],
    pub(crate) perm: [u64; 256],
}

static TABLES: OnceLock<Tables> = OnceLock::new();

pub(crate) fn tables() -> &'static Tables {
    TABLES.get_or_init(generate)
}

/// Multiply in GF(2^width) modulo `poly`.
fn gf_mul(mut a: u32, mut b: u32, width: u32, poly: u32) -> u32 {
    let top = 1 << width;
    let mut r = 0;
    while b != 0 {
        if b & 1 != 0 {
            r ^= a;
        }
        b >>= 1;
        a <<= 1;
        if a & top != 0 {
            a ^= poly;
        }
    }
    r
}

fn cube(x: u32, width: u32, poly: u32) -> u32 {
    gf_mul(gf_mul(x, x, width, poly), x, width, poly)
}

fn generate() -> Tables {
    let mut s1 = [0u8; 1 << S1_WIDTH];
    for (i, out) in s1.iter_mut().enumerate() {
        *out = cube(i as u32 ^ S1_MASK, S1_WIDTH, S1_POLY) as u8;
    }

    let mut s2 = [0u8; 1 << S2_WIDTH];
    for (i, out) in s2.iter_mut().enumerate() {
        *out = cube(i as u32 ^ S2_MASK, S2_WIDTH, S2_POLY) as u8;
    }

    // Bits 0-3 land on bits 7, 15, 23, 31 of the low half; bits 4-7 on the
    // same positions of the high half.
    let mut perm = [0u64; 256];
    for (i, out) in perm.iter_mut().enumerate() {
        let lo = ((i & 1) << 7) | ((i & 2) << 14) | ((i & 4) << 21) | ((i & 8) << 28);
        let hi = ((i & 16) << 3) | ((i & 32) << 10) | ((i & 64) << 17) | ((i & 128) << 24);
        *out = ((hi as u64) << 32) | lo as u64;
    }

    tracing::trace!(algorithm = "loki97", "s-boxes and permutation generated");
    Tables { s1, s2, perm }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gf_mul_reduces() {
        // x^12 * x = x^13 = poly - x^13 in GF(2^13)
        assert_eq!(gf_mul(1 << 12, 2, S1_WIDTH, S1_POLY), S1_POLY ^ (1 << 13));
        assert_eq!(gf_mul(0x1234, 1, S1_WIDTH, S1_POLY), 0x1234);
        assert_eq!(gf_mul(0, 0x7ff, S2_WIDTH, S2_POLY), 0);
    }

    #[test]
    fn cube_of_complement() {
        let t = tables();
        // Input all-ones complements to zero, and 0^3 = 0.
        assert_eq!(t.s1[S1_MASK as usize], 0);
        assert_eq!(t.s2[S2_MASK as usize], 0);
        // Input zero complements to all-ones.
        assert_eq!(t.s1[0], cube(S1_MASK, S1_WIDTH, S1_POLY) as u8);
        assert_eq!(t.s2[0], cube(S2_MASK, S2_WIDTH, S2_POLY) as u8);
    }

    #[test]
    fn permutation_spreads_bits() {
        let t = tables();
        assert_eq!(t.perm[0], 0);
        assert_eq!(t.perm[1], 1 << 7);
        assert_eq!(t.perm[8], 1 << 31);
        assert_eq!(t.perm[16], 1 << 39);
        assert_eq!(t.perm[128], 1 << 63);
        for i in 0..256 {
            assert_eq!(t.perm[i].count_ones(), (i as u32).count_ones());
            assert_eq!(t.perm[i] & !0x8080_8080_8080_8080, 0);
        }
    }

    #[test]
    fn tables_built_once() {
        assert!(std::ptr::eq(tables(), tables()));
    }
}
