//! Seek-position arithmetic.
//!
//! The engine produces its "go to" offset as a 64-bit integer, but the
//! boundary it is reached through only carries two signed 32-bit words. The
//! low word arrives sign-extended, so a "negative" low word stands for a value
//! in `2^31..2^32` and has to be lifted by `2^32` before the high word is
//! folded in. Both words equal to `-1` is the sentinel for "no seek".
//!
//! Everything here is pure and independent of the streaming state machine.

use crate::error::{Error, Result};

const WORD: i128 = 1 << 32;

/// The two raw words describing a pending seek, as surfaced by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeekWords {
    /// Low-order 32 bits, sign-extended.
    pub low: i32,
    /// High-order 32 bits, sign-extended.
    pub high: i32,
}

impl SeekWords {
    /// The "continue sequentially" sentinel.
    pub const ABSENT: SeekWords = SeekWords { low: -1, high: -1 };

    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// Split a native 64-bit target into the two boundary words.
    ///
    /// `None` maps to [`SeekWords::ABSENT`]. So does `Some(u64::MAX)`, which
    /// is how engines with a native 64-bit API spell "no seek".
    pub const fn from_target(target: Option<u64>) -> Self {
        match target {
            None => Self::ABSENT,
            Some(v) => Self {
                low: v as u32 as i32,
                high: (v >> 32) as u32 as i32,
            },
        }
    }

    pub fn is_absent(&self) -> bool {
        *self == Self::ABSENT
    }

    /// Combine the words into an absolute offset. See [`reconcile`].
    pub fn reconcile(self) -> Result<Option<u64>> {
        reconcile(self.low, self.high)
    }
}

/// Combine a low and high word into one absolute byte offset.
///
/// Returns `Ok(None)` for the `(-1, -1)` sentinel. A seek to offset `0` is
/// `(0, 0)` and comes back as `Some(0)`. The arithmetic is done in 128 bits
/// so it is exact for every pair of words; a pair that does not land in
/// `0..=u64::MAX` is reported as [`Error::ReconciliationOverflow`].
pub fn reconcile(low: i32, high: i32) -> Result<Option<u64>> {
    if low == -1 && high == -1 {
        return Ok(None);
    }

    let low_part = i128::from(low);
    let high_part = i128::from(high) * WORD;
    let combined = if low < 0 {
        low_part + WORD + high_part
    } else {
        low_part + high_part
    };

    u64::try_from(combined)
        .map(Some)
        .map_err(|_| Error::ReconciliationOverflow { low, high })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_is_absent() {
        assert_eq!(reconcile(-1, -1).unwrap(), None);
        assert!(SeekWords::ABSENT.is_absent());
    }

    #[test]
    fn zero_is_a_real_seek() {
        assert_eq!(reconcile(0, 0).unwrap(), Some(0));
    }

    #[test]
    fn small_positive_low_word() {
        assert_eq!(reconcile(100, 0).unwrap(), Some(100));
    }

    #[test]
    fn negative_low_word_is_lifted() {
        assert_eq!(reconcile(-1, 1).unwrap(), Some(8_589_934_591));
        assert_eq!(reconcile(i32::MIN, 0).unwrap(), Some(1 << 31));
        assert_eq!(reconcile(-1, 0).unwrap(), Some(u32::MAX as u64));
    }

    #[test]
    fn high_word_only() {
        assert_eq!(reconcile(0, 2).unwrap(), Some(8_589_934_592));
    }

    #[test]
    fn exact_for_large_offsets() {
        let target: u64 = 5 * (1 << 40) + 3 * (1 << 30) + 17;
        assert_eq!(SeekWords::from_target(Some(target)).reconcile().unwrap(), Some(target));

        // high word beyond 2^20
        let target: u64 = (3 << 52) + 3 * (1 << 30) + 17;
        let words = SeekWords::from_target(Some(target));
        assert!(words.high > 1 << 20);
        assert_eq!(words.reconcile().unwrap(), Some(target));

        // low word above 2^31 so it arrives negative
        let target: u64 = (3u64 << 41) + 0xF000_0001;
        let words = SeekWords::from_target(Some(target));
        assert!(words.low < 0);
        assert_eq!(words.reconcile().unwrap(), Some(target));
    }

    #[test]
    fn largest_representable_offset() {
        assert_eq!(
            reconcile(-1, i32::MAX).unwrap(),
            Some(i64::MAX as u64)
        );
    }

    #[test]
    fn negative_combination_overflows() {
        let err = reconcile(5, -3).unwrap_err();
        assert!(matches!(
            err,
            Error::ReconciliationOverflow { low: 5, high: -3 }
        ));
        assert!(reconcile(0, -1).is_err());
    }

    #[test]
    fn native_no_seek_splits_to_sentinel() {
        assert_eq!(SeekWords::from_target(Some(u64::MAX)), SeekWords::ABSENT);
        assert_eq!(SeekWords::from_target(None), SeekWords::ABSENT);
    }

    #[test]
    fn split_then_reconcile_sample() {
        for target in [0u64, 1, 4095, 1 << 31, (1 << 32) - 1, 1 << 32, 1 << 45] {
            assert_eq!(
                SeekWords::from_target(Some(target)).reconcile().unwrap(),
                Some(target),
                "target {target}"
            );
        }
    }
}
