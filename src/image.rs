//! Rendered radiographs: dense grids, or flat subsampled sequences that can
//! be scattered back into a grid.

use std::path::Path;

use ndarray::{Array2, Array4};

use crate::Intensityf32;

/// One scalar intensity per rendered pixel per batch element.
#[derive(Clone, Debug, PartialEq)]
pub enum Image {
    /// Dense `(batch, 1, height, width)` grid.
    Full(Array4<Intensityf32>),

    /// Flat `(batch, n_subsample)` values; `pixels[k]` is the `(row, col)`
    /// that flat slot `k` was rendered at.
    Sparse {
        values: Array2<Intensityf32>,
        pixels: Vec<(usize, usize)>,
    },
}

impl Image {
    pub fn batch_size(&self) -> usize {
        match self {
            Image::Full(grid) => grid.dim().0,
            Image::Sparse { values, .. } => values.dim().0,
        }
    }

    /// The dense grid of a full render; `None` for a subsampled one.
    pub fn grid(&self) -> Option<&Array4<Intensityf32>> {
        match self {
            Image::Full(grid) => Some(grid),
            Image::Sparse { .. } => None,
        }
    }

    /// A dense `(batch, 1, height, width)` copy. Sparse values are scattered
    /// to their pixel coordinates; unrendered pixels are zero.
    pub fn scatter_into_grid(&self, height: usize, width: usize) -> Array4<Intensityf32> {
        match self {
            Image::Full(grid) => grid.clone(),
            Image::Sparse { values, pixels } => {
                let (batch, _) = values.dim();
                let mut grid = Array4::zeros((batch, 1, height, width));
                for b in 0..batch {
                    for (k, &(i, j)) in pixels.iter().enumerate() {
                        grid[[b, 0, i, j]] = values[[b, k]];
                    }
                }
                grid
            }
        }
    }

    /// Write all intensities as raw little-endian `f32`s, batch-major, in
    /// flat output order.
    pub fn write_to_raw_file(&self, path: &Path) -> std::io::Result<()> {
        match self {
            Image::Full(grid) => crate::io::raw::write(grid.iter().copied(), path),
            Image::Sparse { values, .. } => crate::io::raw::write(values.iter().copied(), path),
        }
    }
}
