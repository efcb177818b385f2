//! Weighted test-group sampling.
//!
//! A participant is assigned to one group by drawing a fractional target in
//! `[0,1)`, building the cumulative partition of the groups' percentage
//! probabilities, and binary-searching for the first partial sum strictly
//! exceeding the target.
//!
//! The target construction reverses the decimal digits of a random `u64` and
//! reads them as a decimal fraction. This is not uniform over `[0,1)` (a
//! terminal zero digit can never appear, and leading reversed digits skew
//! low); the behavior is kept as-is and pinned by tests.

use rand::RngCore;
use rand::rngs::ThreadRng;
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::model::testing::TestGroup;

/// Decimal places kept when accumulating `probability / 100` partial sums.
pub const DEFAULT_PRECISION: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplerError {
    #[error("cannot sample from an empty group list")]
    NoGroups,
}

/// Source of fractional targets in `[0,1)`.
///
/// The production source is [`ReversedDigitTarget`]; tests inject
/// [`FixedTarget`] to make selection deterministic.
pub trait TargetSource {
    fn target(&mut self) -> Decimal;
}

/// Draws a random `u64` and reverses its decimal digits into a fraction.
#[derive(Debug)]
pub struct ReversedDigitTarget<R: RngCore> {
    rng: R,
}

impl ReversedDigitTarget<ThreadRng> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
        }
    }
}

impl Default for ReversedDigitTarget<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> ReversedDigitTarget<R> {
    pub const fn from_rng(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: RngCore> TargetSource for ReversedDigitTarget<R> {
    fn target(&mut self) -> Decimal {
        reversed_fraction(self.rng.next_u64())
    }
}

/// Always yields the same target. Test seam.
#[derive(Debug, Clone, Copy)]
pub struct FixedTarget(pub Decimal);

impl TargetSource for FixedTarget {
    fn target(&mut self) -> Decimal {
        self.0
    }
}

/// `0.<reversed decimal digits of n>`, e.g. `123 -> 0.321`.
///
/// A `u64` has at most 20 digits, comfortably inside `Decimal`'s 28-digit
/// mantissa.
#[must_use]
pub fn reversed_fraction(n: u64) -> Decimal {
    let ten = Decimal::from(10);
    let mut value = Decimal::ZERO;
    let mut scale = Decimal::ONE;
    let mut rest = n;
    if rest == 0 {
        return Decimal::ZERO;
    }
    while rest > 0 {
        scale /= ten;
        value += Decimal::from(rest % 10) * scale;
        rest /= 10;
    }
    value
}

/// Weighted random selection among test groups.
#[derive(Debug, Clone, Copy)]
pub struct GroupSampler {
    precision: u32,
}

impl GroupSampler {
    #[must_use]
    pub const fn new(precision: u32) -> Self {
        Self { precision }
    }

    /// Ascending partial sums of `probability / 100` in stored order, each
    /// addend rounded half-up at the configured precision.
    #[must_use]
    pub fn cumulative(&self, groups: &[TestGroup]) -> Vec<Decimal> {
        let hundred = Decimal::ONE_HUNDRED;
        let mut total = Decimal::ZERO;
        groups
            .iter()
            .map(|group| {
                let share = (Decimal::from(group.probability) / hundred).round_dp_with_strategy(
                    self.precision,
                    RoundingStrategy::MidpointAwayFromZero,
                );
                total += share;
                total
            })
            .collect()
    }

    /// Pick one group for the next target drawn from `source`.
    ///
    /// The first group whose partial sum strictly exceeds the target wins.
    /// When no sum exceeds it (probabilities summing below the target), the
    /// last group wins, so the result is always in bounds.
    ///
    /// # Errors
    ///
    /// [`SamplerError::NoGroups`] when `groups` is empty.
    pub fn sample<'g>(
        &self,
        groups: &'g [TestGroup],
        source: &mut dyn TargetSource,
    ) -> Result<&'g TestGroup, SamplerError> {
        if groups.is_empty() {
            return Err(SamplerError::NoGroups);
        }
        let target = source.target();
        let sums = self.cumulative(groups);
        let index = first_exceeding(&sums, target).unwrap_or(groups.len() - 1);
        Ok(&groups[index])
    }
}

impl Default for GroupSampler {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

/// Index of the first partial sum strictly greater than `target`.
fn first_exceeding(sums: &[Decimal], target: Decimal) -> Option<usize> {
    let mut lo = 0usize;
    let mut hi = sums.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if sums[mid] > target {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    (lo < sums.len()).then_some(lo)
}
