use serde::{Deserialize, Serialize};

/// A planar vector in pitch coordinates.
///
/// Used both for absolute positions and for displacements between players.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Serialize,
    Deserialize,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Neg,
)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[must_use]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    /// Unweighted mean of the given points, `None` when there are none.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn centroid<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        let (sum, count) = points
            .into_iter()
            .fold((Self::ZERO, 0usize), |(sum, count), p| (sum + p, count + 1));
        (count > 0).then(|| {
            let n = count as f64;
            Self::new(sum.x / n, sum.y / n)
        })
    }
}

/// Sign applied to positions so that a team always attacks the same way.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "lowercase")]
pub enum DirectionFlip {
    #[default]
    #[display("forward")]
    Forward,
    #[display("reversed")]
    Reversed,
}

impl DirectionFlip {
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::Forward => 1.0,
            Self::Reversed => -1.0,
        }
    }

    #[must_use]
    pub fn apply(self, v: Vec2) -> Vec2 {
        v.scale(self.sign())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_arithmetic() {
        let a = Vec2::new(3.0, -1.0);
        let b = Vec2::new(1.0, 2.0);
        assert_eq!(a + b, Vec2::new(4.0, 1.0));
        assert_eq!(a - b, Vec2::new(2.0, -3.0));
        assert_eq!(-a, Vec2::new(-3.0, 1.0));
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);
    }

    #[test]
    fn test_centroid() {
        let points = [Vec2::new(0.0, 0.0), Vec2::new(4.0, 0.0), Vec2::new(2.0, 6.0)];
        assert_eq!(Vec2::centroid(points), Some(Vec2::new(2.0, 2.0)));
        assert_eq!(Vec2::centroid(std::iter::empty()), None);
    }

    #[test]
    fn test_direction_flip() {
        let v = Vec2::new(10.0, -5.0);
        assert_eq!(DirectionFlip::Forward.apply(v), v);
        assert_eq!(DirectionFlip::Reversed.apply(v), Vec2::new(-10.0, 5.0));
    }
}
