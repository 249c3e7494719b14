// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Non-cryptographic random number generator used for backoff jitter.
///
/// This RNG is **NOT cryptographically secure**. Jitter only needs to
/// desynchronize concurrent callers, so a lightweight source is sufficient.
/// Tests substitute a fixed value to make computed delays deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) enum Rnd {
    #[default]
    Real,

    #[cfg(test)]
    Fixed(f64),
}

impl Rnd {
    /// Returns a value in `[0.0, 1.0)`.
    pub fn next_f64(self) -> f64 {
        match self {
            Self::Real => fastrand::f64(),
            #[cfg(test)]
            Self::Fixed(value) => value,
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn real_stays_in_unit_range() {
        for _ in 0..64 {
            let v = Rnd::Real.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn fixed_returns_given_value() {
        assert_eq!(Rnd::Fixed(0.25).next_f64(), 0.25);
    }
}
