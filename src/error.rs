//! Fatal configuration and shape errors.
//!
//! All of these are detected synchronously, at construction or at the start
//! of a render call; nothing is silently coerced. A ray that misses the
//! volume is *not* an error: it renders as zero.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("detector height and width must be positive, got {height}x{width}")]
    BadDetectorShape { height: usize, width: usize },

    #[error("detector pixel pitch must be positive, got ({delx}, {dely})")]
    BadPixelPitch { delx: f32, dely: f32 },

    #[error("subsample index {index} is out of range for a {n_pixels}-pixel detector")]
    SubsampleOutOfRange { index: usize, n_pixels: usize },

    #[error("cannot subsample {requested} pixels from a {n_pixels}-pixel detector")]
    TooManySubsamples { requested: usize, n_pixels: usize },

    #[error("source-to-detector radius must be positive, got {sdr}")]
    BadSdr { sdr: f32 },

    #[error("a pose has exactly 7 parameters, got {got}")]
    BadPoseShape { got: usize },

    #[error("no pose parameters supplied")]
    NoPoses,

    #[error("volume dimensions must be non-zero, got {dims:?}")]
    EmptyVolume { dims: [usize; 3] },

    #[error("voxel spacing must be positive, got {spacing:?}")]
    BadSpacing { spacing: [f32; 3] },

    #[error("volume data length {got} does not match dimensions {dims:?}")]
    VolumeSizeMismatch { got: usize, dims: [usize; 3] },

    #[error("image shapes differ: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },

    #[error("images must have exactly one channel, got {channels}")]
    NotGrayscale { channels: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
