//! Buffer overlap guard.
//!
//! A transform may run fully in place (`dst` and `src` start at the same
//! address) or between disjoint buffers. Any other overlap would let the
//! transform read bytes it has already overwritten, so it is rejected
//! before a single byte is touched.

use symforge_types::CryptoError;

/// Report whether `x` and `y` share any memory.
pub fn any_overlap(x: &[u8], y: &[u8]) -> bool {
    if x.is_empty() || y.is_empty() {
        return false;
    }
    let x = x.as_ptr_range();
    let y = y.as_ptr_range();
    x.start < y.end && y.start < x.end
}

/// Report whether `x` and `y` share memory at non-corresponding offsets.
///
/// Views that start at the same address are pure in-place use and are not
/// an inexact overlap.
pub fn inexact_overlap(x: &[u8], y: &[u8]) -> bool {
    if x.is_empty() || y.is_empty() || x.as_ptr() == y.as_ptr() {
        return false;
    }
    any_overlap(x, y)
}

/// Validate a single-block `(dst, src)` transform of `block_size` bytes.
pub(crate) fn check_block_io(dst: &[u8], src: &[u8], block_size: usize) -> Result<(), CryptoError> {
    if src.len() < block_size {
        return Err(CryptoError::BufferTooSmall {
            need: block_size,
            got: src.len(),
        });
    }
    if dst.len() < block_size {
        return Err(CryptoError::BufferTooSmall {
            need: block_size,
            got: dst.len(),
        });
    }
    if inexact_overlap(&dst[..block_size], &src[..block_size]) {
        return Err(CryptoError::InvalidOverlap);
    }
    Ok(())
}

/// Validate a `(dst, src)` transform covering all of `src`.
pub(crate) fn check_stream_io(dst: &[u8], src: &[u8]) -> Result<(), CryptoError> {
    if dst.len() < src.len() {
        return Err(CryptoError::BufferTooSmall {
            need: src.len(),
            got: dst.len(),
        });
    }
    if inexact_overlap(&dst[..src.len()], src) {
        return Err(CryptoError::InvalidOverlap);
    }
    Ok(())
}

/// Ensure a block-oriented buffer holds whole blocks.
pub(crate) fn check_full_blocks(len: usize, block_size: usize) -> Result<(), CryptoError> {
    if len % block_size != 0 {
        return Err(CryptoError::PartialBlock { len, block_size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjoint_views_do_not_overlap() {
        let buf = [0u8; 32];
        assert!(!any_overlap(&buf[..16], &buf[16..]));
        assert!(!inexact_overlap(&buf[..16], &buf[16..]));

        let other = [0u8; 16];
        assert!(!any_overlap(&buf, &other));
    }

    #[test]
    fn identical_start_is_in_place() {
        let buf = [0u8; 32];
        assert!(any_overlap(&buf[..16], &buf[..16]));
        assert!(!inexact_overlap(&buf[..16], &buf[..16]));
        // Same start, different lengths is still in-place use.
        assert!(!inexact_overlap(&buf[..16], &buf[..32]));
    }

    #[test]
    fn shifted_views_are_rejected() {
        let buf = [0u8; 32];
        for shift in 1..16 {
            assert!(inexact_overlap(&buf[..16], &buf[shift..shift + 16]), "shift {shift}");
            assert!(inexact_overlap(&buf[shift..shift + 16], &buf[..16]), "shift {shift}");
        }
        // Last byte of one view is the first byte of the other.
        assert!(inexact_overlap(&buf[..16], &buf[15..31]));
    }

    #[test]
    fn empty_views_never_overlap() {
        let buf = [0u8; 8];
        assert!(!any_overlap(&buf[..0], &buf));
        assert!(!inexact_overlap(&buf[4..4], &buf));
    }

    #[test]
    fn block_io_checks_lengths_then_overlap() {
        let buf = [0u8; 40];
        assert_eq!(
            check_block_io(&buf[..16], &buf[16..20], 16),
            Err(CryptoError::BufferTooSmall { need: 16, got: 4 })
        );
        assert_eq!(
            check_block_io(&buf[..8], &buf[16..32], 16),
            Err(CryptoError::BufferTooSmall { need: 16, got: 8 })
        );
        assert_eq!(
            check_block_io(&buf[..16], &buf[8..24], 16),
            Err(CryptoError::InvalidOverlap)
        );
        // Only the first block of each buffer is considered.
        assert_eq!(check_block_io(&buf[..24], &buf[16..32], 16), Ok(()));
        assert_eq!(check_block_io(&buf[..16], &buf[..16], 16), Ok(()));
    }

    #[test]
    fn stream_io_checks() {
        let buf = [0u8; 40];
        assert_eq!(
            check_stream_io(&buf[..4], &buf[20..30]),
            Err(CryptoError::BufferTooSmall { need: 10, got: 4 })
        );
        assert_eq!(
            check_stream_io(&buf[..20], &buf[1..11]),
            Err(CryptoError::InvalidOverlap)
        );
        assert_eq!(check_stream_io(&buf[..20], &buf[20..30]), Ok(()));
        assert_eq!(check_stream_io(&buf[..0], &buf[..0]), Ok(()));
    }

    #[test]
    fn full_blocks() {
        assert!(check_full_blocks(0, 16).is_ok());
        assert!(check_full_blocks(48, 16).is_ok());
        assert_eq!(
            check_full_blocks(47, 16),
            Err(CryptoError::PartialBlock { len: 47, block_size: 16 })
        );
    }
}
