//! The density volume through which rays are cast.

use std::path::Path;

use ndarray::{Array3, Axis};

use crate::error::{Error, Result};
use crate::{Index3, Intensityf32, Lengthf32};

/// A dense 3-D grid of densities plus the physical voxel spacing.
///
/// World frame convention: one corner of the volume sits at the origin and
/// voxel `(i, j, k)` spans `[i·sx, (i+1)·sx] × [j·sy, (j+1)·sy] ×
/// [k·sz, (k+1)·sz]`, so the box extends to `dims · spacing`. Storage axis 0
/// is reversed at construction, aligning the input's storage order with the
/// orientation assumed by the detector geometry.
///
/// Shared read-only by every ray of every concurrent render; never mutated
/// after construction.
#[derive(Clone, Debug)]
pub struct Volume {
    data: Array3<Intensityf32>,
    spacing: [Lengthf32; 3],
}

impl Volume {
    pub fn new(mut data: Array3<Intensityf32>, spacing: [Lengthf32; 3]) -> Result<Self> {
        let (nx, ny, nz) = data.dim();
        let dims = [nx, ny, nz];
        if dims.iter().any(|&n| n == 0) {
            return Err(Error::EmptyVolume { dims });
        }
        if spacing.iter().any(|&s| !(s > 0.0)) {
            return Err(Error::BadSpacing { spacing });
        }
        data.invert_axis(Axis(0));
        Ok(Self { data, spacing })
    }

    /// A uniform volume. Mostly useful for tests and geometric sanity
    /// checks.
    pub fn ones(dims: Index3, spacing: [Lengthf32; 3]) -> Result<Self> {
        Self::new(Array3::ones((dims[0], dims[1], dims[2])), spacing)
    }

    /// Load densities stored as raw little-endian `f32`s, x fastest-varying.
    pub fn from_raw_file(
        path: &Path,
        dims: Index3,
        spacing: [Lengthf32; 3],
    ) -> std::result::Result<Self, Box<dyn std::error::Error>> {
        let data: Vec<Intensityf32> = crate::io::raw::read(path)?.collect::<std::io::Result<_>>()?;
        if data.len() != dims.iter().product::<usize>() {
            return Err(Error::VolumeSizeMismatch { got: data.len(), dims }.into());
        }
        // The file varies x fastest; Array3 iteration order varies the last
        // axis fastest, so read into (z, y, x) and transpose.
        let zyx = Array3::from_shape_vec((dims[2], dims[1], dims[0]), data)?;
        Ok(Self::new(zyx.permuted_axes([2, 1, 0]).as_standard_layout().to_owned(), spacing)?)
    }

    pub fn dims(&self) -> Index3 {
        let (nx, ny, nz) = self.data.dim();
        [nx, ny, nz]
    }

    pub fn spacing(&self) -> [Lengthf32; 3] {
        self.spacing
    }

    /// Physical size of the bounding box along each world axis.
    pub fn extent(&self) -> [Lengthf32; 3] {
        let dims = self.dims();
        [
            dims[0] as Lengthf32 * self.spacing[0],
            dims[1] as Lengthf32 * self.spacing[1],
            dims[2] as Lengthf32 * self.spacing[2],
        ]
    }

    /// Density of voxel `(i, j, k)`; `None` outside the grid.
    pub fn density(&self, index: Index3) -> Option<Intensityf32> {
        self.data.get(index).copied()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[allow(unused)]
    use pretty_assertions::{assert_eq, assert_ne};
    use ndarray::array;

    #[test]
    fn construction_reverses_axis_zero() {
        let data = array![[[1.0_f32]], [[2.0]], [[3.0]]]; // shape (3, 1, 1)
        let volume = Volume::new(data, [1.0; 3]).unwrap();
        assert_eq!(volume.density([0, 0, 0]), Some(3.0));
        assert_eq!(volume.density([2, 0, 0]), Some(1.0));
    }

    #[test]
    fn out_of_range_lookup_is_none() {
        let volume = Volume::ones([2, 2, 2], [1.0; 3]).unwrap();
        assert_eq!(volume.density([2, 0, 0]), None);
        assert_eq!(volume.density([0, 0, 5]), None);
    }

    #[test]
    fn extent_scales_with_spacing() {
        let volume = Volume::ones([4, 2, 1], [0.5, 2.0, 3.0]).unwrap();
        assert_eq!(volume.extent(), [2.0, 4.0, 3.0]);
    }

    #[test]
    fn bad_configurations_are_rejected() {
        assert_eq!(
            Volume::ones([0, 2, 2], [1.0; 3]).unwrap_err(),
            Error::EmptyVolume { dims: [0, 2, 2] }
        );
        assert_eq!(
            Volume::ones([2, 2, 2], [1.0, -1.0, 1.0]).unwrap_err(),
            Error::BadSpacing { spacing: [1.0, -1.0, 1.0] }
        );
    }
}
