//! TOML run configuration for the renderer.

use std::fs;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use crate::detector::Detector;
use crate::error::Result;

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub volume: VolumeConfig,
    pub detector: DetectorConfig,

    /// One pose per row: `[sdr, theta, phi, gamma, bx, by, bz]`.
    pub poses: Vec<[f32; 7]>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct VolumeConfig {
    /// Raw little-endian f32 densities, x fastest-varying.
    pub path: PathBuf,

    /// Number of voxels in each dimension
    pub dims: [usize; 3],

    /// Physical voxel size in each dimension
    pub spacing: [f32; 3],
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct DetectorConfig {
    pub height: usize,

    /// Defaults to `height`
    #[serde(default)]
    pub width: Option<usize>,

    pub delx: f32,

    /// Defaults to `delx`
    #[serde(default)]
    pub dely: Option<f32>,

    /// Number of randomly subsampled pixels; full grid when absent
    #[serde(default)]
    pub n_subsample: Option<usize>,

    /// Seed for the subsample draw; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl DetectorConfig {
    pub fn build(&self) -> Result<Detector> {
        let width = self.width.unwrap_or(self.height);
        let dely = self.dely.unwrap_or(self.delx);
        let detector = Detector::new(self.height, width, self.delx, dely)?;
        match self.n_subsample {
            None => Ok(detector),
            Some(n) => {
                let mut rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed),
                    None => StdRng::from_entropy(),
                };
                detector.random_subsample(n, &mut rng)
            }
        }
    }
}

pub fn read_config_file(path: &Path) -> std::result::Result<Config, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}
