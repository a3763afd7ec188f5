//! Overflow-checked size arithmetic.

use thiserror::Error;

/// The running size estimate no longer fits in a `u64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("size estimate overflowed after counting {counted} bytes")]
pub struct EstimationOverflow {
    /// Total reached before the addition that overflowed.
    pub counted: u64,
}

/// Widens a length to `u64`, saturating on targets where `usize` is wider.
#[inline]
pub fn widen(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

/// Running byte total that refuses to wrap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizeAccumulator {
    total: u64,
}

impl SizeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing total.
    pub fn starting_at(total: u64) -> Self {
        Self { total }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Adds `bytes`; on overflow the total is left unchanged.
    pub fn add(&mut self, bytes: u64) -> Result<(), EstimationOverflow> {
        self.total = self.total.checked_add(bytes).ok_or(EstimationOverflow {
            counted: self.total,
        })?;
        Ok(())
    }

    /// Adds `count * each`, checking the product as well as the sum.
    pub fn add_many(&mut self, count: u64, each: u64) -> Result<(), EstimationOverflow> {
        let bytes = count.checked_mul(each).ok_or(EstimationOverflow {
            counted: self.total,
        })?;
        self.add(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_up() {
        let mut acc = SizeAccumulator::new();
        acc.add(3).unwrap();
        acc.add_many(4, 2).unwrap();
        assert_eq!(acc.total(), 11);
    }

    #[test]
    fn reaching_max_is_not_overflow() {
        let mut acc = SizeAccumulator::starting_at(u64::MAX - 5);
        acc.add(5).unwrap();
        assert_eq!(acc.total(), u64::MAX);
        acc.add(0).unwrap();
    }

    #[test]
    fn one_past_max_overflows_without_wrapping() {
        let mut acc = SizeAccumulator::starting_at(u64::MAX - 5);
        let err = acc.add(6).unwrap_err();
        assert_eq!(err.counted, u64::MAX - 5);
        assert_eq!(acc.total(), u64::MAX - 5);
    }

    #[test]
    fn product_overflow_is_caught() {
        let mut acc = SizeAccumulator::starting_at(1);
        let err = acc.add_many(u64::MAX / 2 + 1, 2).unwrap_err();
        assert_eq!(err, EstimationOverflow { counted: 1 });
    }

    #[test]
    fn widen_is_lossless_for_usize() {
        assert_eq!(widen(0), 0);
        assert_eq!(widen(usize::MAX), usize::MAX as u64);
    }
}
