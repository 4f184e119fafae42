pub use autodiff::{Dual, Scalar};
pub use geometry::{Point, Rotation, Vector};

pub use crate::detector::Detector;
pub use crate::error::Error;
pub use crate::image::Image;
pub use crate::pose::Pose;
pub use crate::projector::{Gradients, Projector};
pub use crate::volume::Volume;

/// Number of scalar pose parameters: sdr, three rotations, three
/// translations.
pub const POSE_PARAMS: usize = 7;

/// Dual scalar carrying derivatives with respect to the seven pose
/// parameters.
pub type PoseDual = Dual<POSE_PARAMS>;

pub type Lengthf32 = f32;
pub type Intensityf32 = f32;

pub type Index3 = [usize; 3];
