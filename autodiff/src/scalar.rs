use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use num_traits::{One, Zero};

/// Arithmetic abstraction over which the ray geometry and the voxel
/// traversal are written. `f32` gives a plain forward pass; `Dual<N>`
/// additionally carries derivatives with respect to `N` chosen inputs
/// through exactly the same code.
///
/// Control flow in the algorithms (voxel indices, bounds checks, argmin
/// selection) must go through `value`, so that branching never depends on
/// derivative content.
pub trait Scalar:
    Copy
    + Debug
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + AddAssign
    + Zero
    + One
    + Send
    + Sync
{
    /// Lift a plain number into the scalar type, with no derivative content.
    fn constant(x: f32) -> Self;

    /// The primal value.
    fn value(self) -> f32;

    fn sqrt(self) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
    fn abs(self) -> Self;

    /// Selection by primal value; the derivative of the winning operand
    /// rides along.
    fn min(self, other: Self) -> Self {
        if self.value() <= other.value() {
            self
        } else {
            other
        }
    }

    fn max(self, other: Self) -> Self {
        if self.value() >= other.value() {
            self
        } else {
            other
        }
    }
}

impl Scalar for f32 {
    fn constant(x: f32) -> Self {
        x
    }

    fn value(self) -> f32 {
        self
    }

    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    fn sin(self) -> Self {
        f32::sin(self)
    }

    fn cos(self) -> Self {
        f32::cos(self)
    }

    fn abs(self) -> Self {
        f32::abs(self)
    }
}
