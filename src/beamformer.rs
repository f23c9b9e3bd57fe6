use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use num::complex::Complex64;

use crate::error::{DoaError, Result};

/*
Delay-and-sum beamforming. Each antenna sees the same narrowband wavefront with a phase lag that depends
on the arrival angle. Multiplying every element by the conjugate of the steering vector for a hypothesised
angle undoes exactly that lag, so a wave from that direction adds up coherently across the array while waves
from elsewhere keep a residual phase progression and partially cancel. This is the spatial counterpart of a
matched filter: the weights are the conjugated copy of what we expect to receive.
*/

fn check_dimensions(samples: &ArrayView2<Complex64>, steering: &ArrayView1<Complex64>) -> Result<()> {
    if samples.nrows() != steering.len() {
        return Err(DoaError::DimensionMismatch {
            expected: samples.nrows(),
            found: steering.len(),
        });
    }
    Ok(())
}

// Combined array output y[j] = Σ_k conj(a[k]) x[k][j] for every sample column j.
pub fn beamform_output(
    samples: ArrayView2<Complex64>,
    steering: ArrayView1<Complex64>,
) -> Result<Array1<Complex64>> {
    check_dimensions(&samples, &steering)?;
    Ok(combine(samples, steering))
}

// Average power of the beamformed output over all sample columns.
// An empty batch carries no energy, so it yields zero rather than the 0/0 of an empty mean.
pub fn beamform(samples: ArrayView2<Complex64>, steering: ArrayView1<Complex64>) -> Result<f64> {
    check_dimensions(&samples, &steering)?;
    Ok(average_power(samples, steering))
}

// Callers must have checked that the steering vector matches the row count.
pub(crate) fn average_power(samples: ArrayView2<Complex64>, steering: ArrayView1<Complex64>) -> f64 {
    let N = samples.len_of(Axis(1));
    if N == 0 {
        return 0.;
    }

    let y = combine(samples, steering);
    y.iter().map(|x| x.norm_sqr()).sum::<f64>() / N as f64
}

fn combine(samples: ArrayView2<Complex64>, steering: ArrayView1<Complex64>) -> Array1<Complex64> {
    let weights = steering.mapv(|a| a.conj());
    weights.dot(&samples)
}
