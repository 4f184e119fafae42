//! Camera pose: the seven scalars that place the X-ray source and detector
//! relative to the volume.

use autodiff::{Dual, Scalar};

use crate::error::{Error, Result};
use crate::{PoseDual, POSE_PARAMS};

/// `sdr` is the distance from the isocenter to the source; the detector
/// plane is centred at the same distance on the opposite side. Rotations are
/// radians under the convention documented on [`geometry::Rotation`];
/// translations are world units.
///
/// A pose is owned by the caller (it is the quantity being optimized in
/// pose-fitting loops) and is only ever read by the projector. There is no
/// partially-initialized state to guard against at run time: rendering
/// requires a constructed `Pose`, and construction validates it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose<S = f32> {
    pub sdr: S,
    pub rotation: [S; 3],
    pub translation: [S; 3],
}

impl Pose<f32> {
    pub fn new(sdr: f32, rotation: [f32; 3], translation: [f32; 3]) -> Result<Self> {
        if !(sdr > 0.0) {
            return Err(Error::BadSdr { sdr });
        }
        Ok(Self { sdr, rotation, translation })
    }

    /// Build from a flat `[sdr, θ, φ, γ, bx, by, bz]` row.
    pub fn from_params(params: &[f32]) -> Result<Self> {
        match params {
            &[sdr, theta, phi, gamma, bx, by, bz] => {
                Self::new(sdr, [theta, phi, gamma], [bx, by, bz])
            }
            _ => Err(Error::BadPoseShape { got: params.len() }),
        }
    }

    pub fn params(&self) -> [f32; POSE_PARAMS] {
        let [theta, phi, gamma] = self.rotation;
        let [bx, by, bz] = self.translation;
        [self.sdr, theta, phi, gamma, bx, by, bz]
    }

    /// Lift every parameter into a dual-number seed variable, so that one
    /// render of the lifted pose yields each intensity together with its
    /// derivatives with respect to all seven parameters.
    pub fn seeded(&self) -> Pose<PoseDual> {
        let p = self.params();
        Pose {
            sdr: Dual::variable(p[0], 0),
            rotation: [
                Dual::variable(p[1], 1),
                Dual::variable(p[2], 2),
                Dual::variable(p[3], 3),
            ],
            translation: [
                Dual::variable(p[4], 4),
                Dual::variable(p[5], 5),
                Dual::variable(p[6], 6),
            ],
        }
    }

    /// The same pose with constant (derivative-free) scalars.
    pub fn lift<S: Scalar>(&self) -> Pose<S> {
        Pose {
            sdr: S::constant(self.sdr),
            rotation: self.rotation.map(S::constant),
            translation: self.translation.map(S::constant),
        }
    }
}
