//! Forward-mode dual numbers with a fixed number of seed variables.
//!
//! A `Dual<N>` is a primal value together with the derivatives of that value
//! with respect to `N` designated inputs. Arithmetic propagates the tangent
//! through the usual rules, so a computation written once over [`Scalar`]
//! yields both the result and its Jacobian row when instantiated with duals.

use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use num_traits::{One, Zero};

use crate::Scalar;

/// Ordering and equality compare the primal value only: a `Dual` can be used
/// wherever an algorithm branches on magnitudes, and the tangent is inert in
/// comparisons.
#[derive(Clone, Copy, Debug)]
pub struct Dual<const N: usize> {
    pub val: f32,
    pub eps: [f32; N],
}

impl<const N: usize> Dual<N> {
    /// A value with no derivative content.
    pub fn constant(val: f32) -> Self {
        Self { val, eps: [0.0; N] }
    }

    /// A seed variable: derivative 1 with respect to slot `i`.
    pub fn variable(val: f32, i: usize) -> Self {
        let mut eps = [0.0; N];
        eps[i] = 1.0;
        Self { val, eps }
    }

    /// Apply a scalar function given its value and derivative at `self.val`.
    fn chain(self, val: f32, dfdx: f32) -> Self {
        let mut eps = self.eps;
        for e in eps.iter_mut() {
            *e *= dfdx;
        }
        Self { val, eps }
    }
}

impl<const N: usize> Add for Dual<N> {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self.val += rhs.val;
        for (e, r) in self.eps.iter_mut().zip(rhs.eps) {
            *e += r;
        }
        self
    }
}

impl<const N: usize> AddAssign for Dual<N> {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<const N: usize> Sub for Dual<N> {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        self.val -= rhs.val;
        for (e, r) in self.eps.iter_mut().zip(rhs.eps) {
            *e -= r;
        }
        self
    }
}

impl<const N: usize> Mul for Dual<N> {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut eps = [0.0; N];
        for ((e, a), b) in eps.iter_mut().zip(self.eps).zip(rhs.eps) {
            *e = a * rhs.val + b * self.val;
        }
        Self { val: self.val * rhs.val, eps }
    }
}

impl<const N: usize> Div for Dual<N> {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        let inv = 1.0 / rhs.val;
        let mut eps = [0.0; N];
        for ((e, a), b) in eps.iter_mut().zip(self.eps).zip(rhs.eps) {
            *e = (a - b * self.val * inv) * inv;
        }
        Self { val: self.val * inv, eps }
    }
}

impl<const N: usize> Neg for Dual<N> {
    type Output = Self;
    fn neg(mut self) -> Self {
        self.val = -self.val;
        for e in self.eps.iter_mut() {
            *e = -*e;
        }
        self
    }
}

impl<const N: usize> PartialEq for Dual<N> {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl<const N: usize> PartialOrd for Dual<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.val.partial_cmp(&other.val)
    }
}

impl<const N: usize> Zero for Dual<N> {
    fn zero() -> Self {
        Self::constant(0.0)
    }

    fn is_zero(&self) -> bool {
        self.val == 0.0 && self.eps.iter().all(|e| *e == 0.0)
    }
}

impl<const N: usize> One for Dual<N> {
    fn one() -> Self {
        Self::constant(1.0)
    }
}

impl<const N: usize> Scalar for Dual<N> {
    fn constant(x: f32) -> Self {
        Dual::constant(x)
    }

    fn value(self) -> f32 {
        self.val
    }

    fn sqrt(self) -> Self {
        let root = self.val.sqrt();
        self.chain(root, 0.5 / root)
    }

    fn sin(self) -> Self {
        self.chain(self.val.sin(), self.val.cos())
    }

    fn cos(self) -> Self {
        self.chain(self.val.cos(), -self.val.sin())
    }

    fn abs(self) -> Self {
        if self.val < 0.0 {
            -self
        } else {
            self
        }
    }
}
