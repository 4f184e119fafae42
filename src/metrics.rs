//! Image comparison for pose fitting: zero-mean normalized
//! cross-correlation between batches of rendered radiographs.

use ndarray::{Array1, ArrayView3, ArrayView4};

use crate::error::{Error, Result};

/// Guards the variance against division by zero on constant images.
const EPS: f32 = 1e-10;

/// Zero-mean normalized cross-correlation, one score per batch element.
///
/// Both inputs must be `(batch, 1, height, width)` with identical shapes;
/// anything else is a fatal shape error. Each image is normalized to zero
/// mean and unit variance before the mean product is taken, so identical
/// images score 1 and sign-flipped images score −1.
pub fn zncc(a: ArrayView4<f32>, b: ArrayView4<f32>) -> Result<Array1<f32>> {
    if a.shape() != b.shape() {
        return Err(Error::ShapeMismatch {
            left: a.shape().to_vec(),
            right: b.shape().to_vec(),
        });
    }
    let channels = a.shape()[1];
    if channels != 1 {
        return Err(Error::NotGrayscale { channels });
    }

    let scores = a
        .outer_iter()
        .zip(b.outer_iter())
        .map(|(x, y)| correlate(x, y))
        .collect();
    Ok(scores)
}

fn correlate(x: ArrayView3<f32>, y: ArrayView3<f32>) -> f32 {
    let n = x.len() as f32;
    let stats = |img: &ArrayView3<f32>| {
        let mean = img.sum() / n;
        let var = img.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
        (mean, (var + EPS).sqrt())
    };
    let (mx, sx) = stats(&x);
    let (my, sy) = stats(&y);
    x.iter()
        .zip(y.iter())
        .map(|(p, q)| ((p - mx) / sx) * ((q - my) / sy))
        .sum::<f32>()
        / n
}
