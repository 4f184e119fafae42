//! Detector geometry: a fixed pixel grid, and the per-pixel ray endpoints
//! derived from a pose.

use autodiff::Scalar;
use geometry::{Point, Rotation, Vector};
use itertools::iproduct;
use num_traits::Zero;

use crate::error::{Error, Result};
use crate::pose::Pose;

/// Immutable description of the imaging plane. Created once at setup;
/// shared by every render call.
///
/// `height` and `width` count pixels; `delx` and `dely` are the pixel pitch
/// in world units along the plane's two in-plane axes.
#[derive(Clone, Debug, PartialEq)]
pub struct Detector {
    height: usize,
    width: usize,
    delx: f32,
    dely: f32,
    subsample: Option<Vec<usize>>,
}

impl Detector {
    pub fn new(height: usize, width: usize, delx: f32, dely: f32) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(Error::BadDetectorShape { height, width });
        }
        if !(delx > 0.0) || !(dely > 0.0) {
            return Err(Error::BadPixelPitch { delx, dely });
        }
        Ok(Self { height, width, delx, dely, subsample: None })
    }

    /// Restrict rendering to a fixed sequence of flat row-major pixel
    /// indices. The sequence order is the order of the flat output values,
    /// and it is reused unchanged by every subsequent render.
    pub fn with_subsample(mut self, indices: Vec<usize>) -> Result<Self> {
        let n_pixels = self.height * self.width;
        if let Some(&index) = indices.iter().find(|&&i| i >= n_pixels) {
            return Err(Error::SubsampleOutOfRange { index, n_pixels });
        }
        self.subsample = Some(indices);
        Ok(self)
    }

    /// Choose `n` distinct pixels uniformly at random, once, at setup time.
    pub fn random_subsample(self, n: usize, rng: &mut impl rand::Rng) -> Result<Self> {
        let n_pixels = self.height * self.width;
        if n > n_pixels {
            return Err(Error::TooManySubsamples { requested: n, n_pixels });
        }
        self.with_subsample(rand::seq::index::sample(rng, n_pixels, n).into_vec())
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn subsample(&self) -> Option<&[usize]> {
        self.subsample.as_deref()
    }

    /// Number of pixels actually rendered per pose.
    pub fn n_pixels(&self) -> usize {
        match &self.subsample {
            Some(indices) => indices.len(),
            None => self.height * self.width,
        }
    }

    /// The `(row, col)` coordinates rendered, in flat output order.
    pub fn pixels(&self) -> Vec<(usize, usize)> {
        match &self.subsample {
            Some(indices) => indices.iter().map(|&i| (i / self.width, i % self.width)).collect(),
            None => iproduct!(0..self.height, 0..self.width).collect(),
        }
    }

    /// One source point, and one target point per rendered pixel, in the
    /// volume's world frame.
    ///
    /// At rest the source sits at `(0, 0, +sdr)` and the detector plane is
    /// centred at `(0, 0, −sdr)`, with pixel `(i, j)` offset from the plane
    /// centre by `((i − (height−1)/2)·delx, (j − (width−1)/2)·dely, 0)`.
    /// The pose's rotation (see [`Rotation`] for the convention) and then
    /// its translation carry both the source and every pixel into the world
    /// frame.
    pub fn make_rays<S: Scalar>(&self, pose: &Pose<S>) -> (Point<S>, Vec<Point<S>>) {
        let [theta, phi, gamma] = pose.rotation;
        let rotation = Rotation::from_angles(theta, phi, gamma);
        let [bx, by, bz] = pose.translation;
        let translation = Vector::new(bx, by, bz);

        let to_world = |local: Vector<S>| -> Point<S> {
            let v = rotation.apply(local) + translation;
            Point::new(v.x, v.y, v.z)
        };

        let source = to_world(Vector::new(S::zero(), S::zero(), pose.sdr));

        let half_h = (self.height as f32 - 1.0) / 2.0;
        let half_w = (self.width as f32 - 1.0) / 2.0;
        let targets = self
            .pixels()
            .into_iter()
            .map(|(i, j)| {
                let u = S::constant((i as f32 - half_h) * self.delx);
                let v = S::constant((j as f32 - half_w) * self.dely);
                to_world(Vector::new(u, v, -pose.sdr))
            })
            .collect();

        (source, targets)
    }
}
