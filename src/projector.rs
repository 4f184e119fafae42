//! The rendering pipeline: expand each pose into per-pixel rays, trace them
//! all in one data-parallel sweep, and reshape the flat intensities into an
//! image.

use ndarray::{Array2, Array3, Array4};
use rayon::prelude::*;

use autodiff::Scalar;

use crate::detector::Detector;
use crate::error::{Error, Result};
use crate::image::Image;
use crate::pose::Pose;
use crate::siddon;
use crate::volume::Volume;
use crate::{Intensityf32, POSE_PARAMS};

/// Derivatives of every rendered intensity with respect to the seven pose
/// parameters: shape `(batch, n_pixels, 7)`, rows ordered like
/// [`Detector::pixels`].
pub type Gradients = Array3<f32>;

/// Owns the immutable scene description (detector geometry and volume) and
/// renders any number of pose batches against it. Rendering never mutates
/// the poses, and concurrent renders may share one `Projector`.
pub struct Projector {
    detector: Detector,
    volume: Volume,
}

impl Projector {
    pub fn new(detector: Detector, volume: Volume) -> Self {
        Self { detector, volume }
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    /// Render one image per pose.
    pub fn render(&self, poses: &[Pose]) -> Result<Image> {
        check_batch(poses)?;
        let mut values = Array2::zeros((poses.len(), self.detector.n_pixels()));
        for (b, pose) in poses.iter().enumerate() {
            for (k, v) in self.cast(pose.lift::<f32>()).into_iter().enumerate() {
                values[[b, k]] = v;
            }
        }
        Ok(self.reshape(values))
    }

    /// Render one image per pose, together with the derivative of every
    /// rendered intensity with respect to the seven pose parameters,
    /// computed in the same sweep by tracing with dual numbers.
    pub fn render_with_gradients(&self, poses: &[Pose]) -> Result<(Image, Gradients)> {
        check_batch(poses)?;
        let n = self.detector.n_pixels();
        let mut values = Array2::zeros((poses.len(), n));
        let mut gradients = Array3::zeros((poses.len(), n, POSE_PARAMS));
        for (b, pose) in poses.iter().enumerate() {
            for (k, dual) in self.cast(pose.seeded()).into_iter().enumerate() {
                values[[b, k]] = dual.val;
                for (p, g) in dual.eps.into_iter().enumerate() {
                    gradients[[b, k, p]] = g;
                }
            }
        }
        Ok((self.reshape(values), gradients))
    }

    /// Trace every ray of one pose. The rays are independent, the volume is
    /// read-only: a plain parallel map.
    fn cast<S: Scalar>(&self, pose: Pose<S>) -> Vec<S> {
        let (source, targets) = self.detector.make_rays(&pose);
        targets
            .par_iter()
            .map(|&target| siddon::trace(source, target, &self.volume))
            .collect()
    }

    fn reshape(&self, values: Array2<Intensityf32>) -> Image {
        match self.detector.subsample() {
            Some(_) => Image::Sparse { values, pixels: self.detector.pixels() },
            None => {
                let batch = values.dim().0;
                let grid: Array4<Intensityf32> = values
                    .into_shape((batch, 1, self.detector.height(), self.detector.width()))
                    .expect("flat render buffer matches the detector grid");
                Image::Full(grid)
            }
        }
    }
}

fn check_batch(poses: &[Pose]) -> Result<()> {
    if poses.is_empty() {
        return Err(Error::NoPoses);
    }
    Ok(())
}
