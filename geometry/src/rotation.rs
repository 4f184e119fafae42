//! Rotations of world space built from three pose angles.
//!
//! Convention: extrinsic rotations about the fixed world axes, applied
//! X(θ) first, then Y(φ), then Z(γ); as a matrix product
//! `R = Rz(γ) · Ry(φ) · Rx(θ)`, acting on column vectors, right-handed,
//! angles in radians. Pose angles are only meaningful under this convention,
//! so any pose-fitting procedure must use the same one.

use autodiff::Scalar;

use crate::Vector;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation<S> {
    m: [[S; 3]; 3],
}

impl<S: Scalar> Rotation<S> {
    pub fn from_angles(theta: S, phi: S, gamma: S) -> Self {
        let (st, ct) = (theta.sin(), theta.cos());
        let (sp, cp) = (phi.sin(), phi.cos());
        let (sg, cg) = (gamma.sin(), gamma.cos());

        // Rz(γ) · Ry(φ) · Rx(θ), written out.
        Self {
            m: [
                [cg * cp, cg * sp * st - sg * ct, cg * sp * ct + sg * st],
                [sg * cp, sg * sp * st + cg * ct, sg * sp * ct - cg * st],
                [-sp, cp * st, cp * ct],
            ],
        }
    }

    pub fn apply(&self, v: Vector<S>) -> Vector<S> {
        let row = |r: &[S; 3]| r[0] * v.x + r[1] * v.y + r[2] * v.z;
        Vector::new(row(&self.m[0]), row(&self.m[1]), row(&self.m[2]))
    }
}
