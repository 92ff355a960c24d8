use num::Float;
use std::fmt::{Display, Formatter};
use std::ops::{Add, Mul};

/// A planar offset in the local north/east frame, generic over a floating point type.
///
/// `north` is positive towards geographic north, `east` towards geographic east.
/// The origin is the launch point.
#[derive(Debug, PartialEq, Clone, Copy, Default)]
pub struct Vec2D<T> {
    /// Offset towards north in meters.
    north: T,
    /// Offset towards east in meters.
    east: T,
}

impl<T: Copy> Vec2D<T> {
    /// Creates a new offset from its north and east components.
    pub const fn new(north: T, east: T) -> Self { Self { north, east } }

    pub const fn north(&self) -> T { self.north }

    pub const fn east(&self) -> T { self.east }
}

impl<T: Float> Vec2D<T> {
    /// Creates the zero offset, i.e. the launch point.
    pub fn zero() -> Self { Self::new(T::zero(), T::zero()) }

    /// Computes the magnitude of the offset.
    pub fn abs(&self) -> T { self.north.hypot(self.east) }

    /// Creates the offset pointing from `self` to `other`.
    pub fn to(&self, other: &Vec2D<T>) -> Vec2D<T> {
        Vec2D::new(other.north - self.north, other.east - self.east)
    }

    /// Normalizes the offset to a magnitude of 1.
    /// A zero offset is returned unmodified.
    pub fn normalize(self) -> Self {
        let magnitude = self.abs();
        if magnitude.is_zero() { self } else { self * (T::one() / magnitude) }
    }

    /// Euclidean distance between two offsets.
    pub fn euclid_distance(&self, other: &Self) -> T { self.to(other).abs() }

    /// Checks whether `self` lies within `rad` of `other` (inclusive).
    pub fn in_radius_of(&self, other: &Self, rad: T) -> bool {
        self.euclid_distance(other) <= rad
    }
}

impl<T: Float> Add for Vec2D<T> {
    type Output = Vec2D<T>;

    fn add(self, rhs: Vec2D<T>) -> Self::Output {
        Vec2D::new(self.north + rhs.north, self.east + rhs.east)
    }
}

impl<T: Float> Mul<T> for Vec2D<T> {
    type Output = Vec2D<T>;

    fn mul(self, rhs: T) -> Self::Output { Vec2D::new(self.north * rhs, self.east * rhs) }
}

impl<T: Display> Display for Vec2D<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[N {}, E {}]", self.north, self.east)
    }
}
