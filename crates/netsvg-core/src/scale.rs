//! Domain-to-range mapping functions.
//!
//! - [`LinearScale`] maps a continuous interval onto another, extrapolating
//!   outside the domain unless clamping is enabled.
//! - [`OrdinalScale`] maps discrete keys onto a list of range values,
//!   assigning slots to unseen keys in the order they are first queried.
//!
//! # Example
//!
//! ```
//! use netsvg_core::scale::{LinearScale, OrdinalScale};
//!
//! let radius = LinearScale::new((0.0, 4.0), (6.0, 22.0)).unwrap();
//! assert_eq!(radius.apply(2.0), 14.0);
//!
//! let palette = OrdinalScale::new(Vec::<&str>::new(), vec!["#1f77b4", "#ff7f0e"]).unwrap();
//! assert_eq!(palette.apply("a"), "#1f77b4");
//! assert_eq!(palette.apply("b"), "#ff7f0e");
//! assert_eq!(palette.apply("c"), "#1f77b4");
//! assert_eq!(palette.apply("a"), "#1f77b4");
//! ```

use std::{cell::RefCell, hash::Hash};

use indexmap::IndexSet;
use thiserror::Error;

/// Errors raised while constructing a scale.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    #[error("linear scale domain is degenerate: [{0}, {1}] (endpoints must be finite and distinct)")]
    DegenerateDomain(f64, f64),

    #[error("ordinal scale requires a non-empty range")]
    EmptyRange,
}

/// A continuous linear mapping `f(x) = r0 + (x - d0) / (d1 - d0) * (r1 - r0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    clamp: bool,
}

impl LinearScale {
    /// Creates a linear scale.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::DegenerateDomain`] if the domain endpoints are
    /// equal or not finite.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self, ScaleError> {
        let (d0, d1) = domain;
        if d0 == d1 || !d0.is_finite() || !d1.is_finite() {
            return Err(ScaleError::DegenerateDomain(d0, d1));
        }
        Ok(Self {
            domain,
            range,
            clamp: false,
        })
    }

    /// Returns a copy of the scale that clamps inputs to the domain.
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Returns the domain endpoints
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the range endpoints
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Maps a domain value into the range.
    ///
    /// The endpoints map exactly: `apply(d0) == r0` and `apply(d1) == r1`.
    pub fn apply(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let mut t = (x - d0) / (d1 - d0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        // The two-term form keeps both endpoints exact.
        r0 * (1.0 - t) + r1 * t
    }

    /// Maps a range value back into the domain.
    ///
    /// Returns `None` when the range is degenerate.
    pub fn invert(&self, y: f64) -> Option<f64> {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r0 == r1 {
            return None;
        }
        let mut t = (y - r0) / (r1 - r0);
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        Some(d0 * (1.0 - t) + d1 * t)
    }
}

/// A discrete mapping from keys to range values with implicit domain growth.
///
/// The observed domain only ever grows; once a key has been assigned a slot
/// the assignment never changes. Slots wrap around when there are more keys
/// than range values.
///
/// The observed domain lives behind a `RefCell`, so a scale can be queried
/// through a shared reference from inside attribute closures but cannot be
/// shared across threads.
#[derive(Debug, Clone)]
pub struct OrdinalScale<K, V> {
    observed: RefCell<IndexSet<K>>,
    range: Vec<V>,
}

impl<K, V> OrdinalScale<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates an ordinal scale with an optional explicit domain.
    ///
    /// # Errors
    ///
    /// Returns [`ScaleError::EmptyRange`] if `range` is empty.
    pub fn new<D, R>(domain: D, range: R) -> Result<Self, ScaleError>
    where
        D: IntoIterator<Item = K>,
        R: IntoIterator<Item = V>,
    {
        let range: Vec<V> = range.into_iter().collect();
        if range.is_empty() {
            return Err(ScaleError::EmptyRange);
        }
        Ok(Self {
            observed: RefCell::new(domain.into_iter().collect()),
            range,
        })
    }

    /// Maps a key to its range value, recording it if unseen.
    pub fn apply(&self, key: K) -> V {
        let mut observed = self.observed.borrow_mut();
        let (index, _) = observed.insert_full(key);
        self.range[index % self.range.len()].clone()
    }

    /// Returns the keys seen so far, in assignment order.
    pub fn domain(&self) -> Vec<K> {
        self.observed.borrow().iter().cloned().collect()
    }

    /// Returns the range values
    pub fn range(&self) -> &[V] {
        &self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_rejects_degenerate_domain() {
        assert_eq!(
            LinearScale::new((3.0, 3.0), (0.0, 1.0)),
            Err(ScaleError::DegenerateDomain(3.0, 3.0))
        );
        assert!(LinearScale::new((0.0, f64::NAN), (0.0, 1.0)).is_err());
        assert!(LinearScale::new((f64::INFINITY, 1.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_linear_extrapolates() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 100.0)).unwrap();
        assert_eq!(scale.apply(5.0), 50.0);
        assert_eq!(scale.apply(20.0), 200.0);
        assert_eq!(scale.apply(-1.0), -10.0);
    }

    #[test]
    fn test_linear_clamp() {
        let scale = LinearScale::new((0.0, 10.0), (0.0, 100.0))
            .unwrap()
            .with_clamp(true);
        assert_eq!(scale.apply(20.0), 100.0);
        assert_eq!(scale.apply(-5.0), 0.0);
    }

    #[test]
    fn test_linear_reversed_range() {
        let scale = LinearScale::new((0.0, 4.0), (22.0, 6.0)).unwrap();
        assert_eq!(scale.apply(0.0), 22.0);
        assert_eq!(scale.apply(4.0), 6.0);
        assert!(scale.apply(1.0) > scale.apply(3.0));
    }

    #[test]
    fn test_linear_invert() {
        let scale = LinearScale::new((0.0, 10.0), (100.0, 200.0)).unwrap();
        assert_eq!(scale.invert(150.0), Some(5.0));

        let flat = LinearScale::new((0.0, 10.0), (1.0, 1.0)).unwrap();
        assert_eq!(flat.apply(7.0), 1.0);
        assert_eq!(flat.invert(1.0), None);
    }

    #[test]
    fn test_ordinal_rejects_empty_range() {
        let result = OrdinalScale::<&str, &str>::new(Vec::new(), Vec::new());
        assert!(matches!(result, Err(ScaleError::EmptyRange)));
    }

    #[test]
    fn test_ordinal_explicit_domain_first() {
        let scale = OrdinalScale::new(vec!["x", "y"], vec![10, 20, 30]).unwrap();
        assert_eq!(scale.apply("y"), 20);
        assert_eq!(scale.apply("z"), 30);
        assert_eq!(scale.apply("w"), 10);
        assert_eq!(scale.domain(), vec!["x", "y", "z", "w"]);
    }

    #[test]
    fn test_ordinal_stable_assignment() {
        let scale = OrdinalScale::new(Vec::<u32>::new(), vec!["a", "b"]).unwrap();
        assert_eq!(scale.apply(7), "a");
        assert_eq!(scale.apply(3), "b");
        assert_eq!(scale.apply(7), "a");
        assert_eq!(scale.apply(9), "a");
        assert_eq!(scale.apply(3), "b");
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn endpoints() -> impl Strategy<Value = (f64, f64)> {
        (-1.0e6f64..1.0e6, -1.0e6f64..1.0e6)
    }

    /// Domain endpoints map exactly onto range endpoints.
    fn check_linear_endpoints_exact(
        domain: (f64, f64),
        range: (f64, f64),
    ) -> Result<(), TestCaseError> {
        prop_assume!(domain.0 != domain.1);
        let scale = LinearScale::new(domain, range).unwrap();
        prop_assert_eq!(scale.apply(domain.0), range.0);
        prop_assert_eq!(scale.apply(domain.1), range.1);
        Ok(())
    }

    /// The slope sign of the scale matches `(r1 - r0) / (d1 - d0)`.
    fn check_linear_monotonic(
        domain: (f64, f64),
        range: (f64, f64),
        a: f64,
        b: f64,
    ) -> Result<(), TestCaseError> {
        prop_assume!(domain.0 != domain.1);
        let scale = LinearScale::new(domain, range).unwrap();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let slope = (range.1 - range.0) / (domain.1 - domain.0);
        let (f_lo, f_hi) = (scale.apply(lo), scale.apply(hi));
        if slope > 0.0 {
            prop_assert!(f_lo <= f_hi);
        } else if slope < 0.0 {
            prop_assert!(f_lo >= f_hi);
        }
        Ok(())
    }

    /// The (k+1)-th distinct key maps to `range[k % len(range)]`, and repeated
    /// queries return the same value.
    fn check_ordinal_cycles(keys: Vec<u16>, range: Vec<u8>) -> Result<(), TestCaseError> {
        let scale = OrdinalScale::new(Vec::new(), range.clone()).unwrap();
        let mut distinct: Vec<u16> = Vec::new();
        for key in keys {
            let value = scale.apply(key);
            let slot = match distinct.iter().position(|k| *k == key) {
                Some(slot) => slot,
                None => {
                    distinct.push(key);
                    distinct.len() - 1
                }
            };
            prop_assert_eq!(value, range[slot % range.len()]);
            prop_assert_eq!(scale.apply(key), value);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn linear_endpoints_exact(domain in endpoints(), range in endpoints()) {
            check_linear_endpoints_exact(domain, range)?;
        }

        #[test]
        fn linear_monotonic(
            domain in endpoints(),
            range in endpoints(),
            a in -1.0e6f64..1.0e6,
            b in -1.0e6f64..1.0e6,
        ) {
            check_linear_monotonic(domain, range, a, b)?;
        }

        #[test]
        fn ordinal_cycles(
            keys in prop::collection::vec(0u16..40, 0..64),
            range in prop::collection::vec(any::<u8>(), 1..8),
        ) {
            check_ordinal_cycles(keys, range)?;
        }
    }
}
