//! Nearest-rank percentiles.

/// A sorted sample answering nearest-rank percentile queries.
///
/// The `p`-th percentile of `n` values is the value at sorted position
/// `floor(n * p / 100)`, clamped to the last value. Percentiles outside
/// `0.0..=100.0` are clamped to that range.
///
/// # Examples
///
/// ```
/// use formscope_stats::percentiles::Percentiles;
///
/// let percentiles = Percentiles::new([7.0, 1.0, 10.0, 4.0, 2.0, 9.0, 3.0, 8.0, 5.0, 6.0]).unwrap();
///
/// assert_eq!(percentiles.at(50.0), 6.0);
/// assert_eq!(percentiles.at(25.0), 3.0);
/// assert_eq!(percentiles.quartiles(), [3.0, 6.0, 8.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Percentiles {
    sorted: Vec<f64>,
}

impl Percentiles {
    /// Collects and sorts a sample.
    ///
    /// Returns `None` for an empty sample or one containing NaN.
    #[must_use]
    pub fn new<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut sorted = values.into_iter().collect::<Vec<_>>();
        if sorted.is_empty() || sorted.iter().any(|v| v.is_nan()) {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        Some(Self { sorted })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// Always `false`; an empty sample is rejected on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    #[must_use]
    pub fn at(&self, percentile: f64) -> f64 {
        self.sorted[nearest_rank(self.sorted.len(), percentile)]
    }

    /// The 25th, 50th and 75th percentiles.
    #[must_use]
    pub fn quartiles(&self) -> [f64; 3] {
        [25.0, 50.0, 75.0].map(|p| self.at(p))
    }

    /// `(percentile, value)` for each requested point, in the given order.
    pub fn at_each<'a>(&'a self, points: &'a [f64]) -> impl Iterator<Item = (f64, f64)> + 'a {
        points.iter().map(|&p| (p, self.at(p)))
    }
}

/// Sorted position of the nearest-rank `percentile` in a sample of `len`
/// values.
///
/// # Panics
///
/// Panics if `len` is zero.
#[expect(
    clippy::cast_sign_loss,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]
#[must_use]
pub fn nearest_rank(len: usize, percentile: f64) -> usize {
    assert!(len > 0, "percentile of an empty sample");
    let percentile = percentile.clamp(0.0, 100.0);
    let rank = (len as f64 * percentile / 100.0) as usize;
    rank.min(len - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_and_nan() {
        assert!(Percentiles::new(std::iter::empty()).is_none());
        assert!(Percentiles::new([1.0, f64::NAN]).is_none());
    }

    #[test]
    fn test_extremes() {
        let percentiles = Percentiles::new([3.0, -1.0, 8.0]).unwrap();
        assert_eq!(percentiles.at(0.0), -1.0);
        assert_eq!(percentiles.at(100.0), 8.0);
        assert_eq!(percentiles.at(250.0), 8.0);
        assert_eq!(percentiles.at(-5.0), -1.0);
    }

    #[test]
    fn test_single_value() {
        let percentiles = Percentiles::new([4.5]).unwrap();
        assert_eq!(percentiles.quartiles(), [4.5; 3]);
        assert_eq!(percentiles.len(), 1);
    }

    #[test]
    fn test_at_each_keeps_request_order() {
        let percentiles = Percentiles::new((1..=20_u8).map(f64::from)).unwrap();
        let values = percentiles.at_each(&[90.0, 10.0]).collect::<Vec<_>>();
        assert_eq!(values, vec![(90.0, 19.0), (10.0, 3.0)]);
    }

    #[test]
    fn test_nearest_rank() {
        assert_eq!(nearest_rank(4, 50.0), 2);
        assert_eq!(nearest_rank(4, 74.9), 2);
        assert_eq!(nearest_rank(4, 75.0), 3);
        assert_eq!(nearest_rank(1, 99.0), 0);
    }
}
