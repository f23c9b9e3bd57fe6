use std::f64::consts::PI;

use ndarray::Array1;
use num::complex::Complex64;

use crate::error::{DoaError, Result};

// A uniform linear array of isotropic elements lying on a line, with element 0 as the phase reference.
// Angles are measured from broadside, positive towards increasing element index.
// A single element array has no directional discrimination: its steering vector is [1] for every angle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrayGeometry {
    element_count: usize,
    // Inter-element spacing in wavelengths
    spacing: f64,
}

impl ArrayGeometry {
    pub fn new(element_count: usize, spacing: f64) -> Result<ArrayGeometry> {
        if element_count == 0 {
            return Err(DoaError::InvalidGeometry(
                "array needs at least one element".to_owned(),
            ));
        }
        if !spacing.is_finite() || spacing <= 0. {
            return Err(DoaError::InvalidGeometry(format!(
                "element spacing must be positive and finite, got {}",
                spacing
            )));
        }

        Ok(ArrayGeometry {
            element_count,
            spacing,
        })
    }

    // The classic half wavelength spaced array, free of grating lobes over the whole visible region.
    pub fn half_wavelength(element_count: usize) -> Result<ArrayGeometry> {
        Self::new(element_count, 0.5)
    }

    pub fn element_count(&self) -> usize {
        self.element_count
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    // Element positions along the array axis, in wavelengths.
    pub fn element_positions(&self) -> Array1<f64> {
        (0..self.element_count)
            .map(|k| k as f64 * self.spacing)
            .collect()
    }

    // Phase progression of a plane wave arriving from `angle` (radians), relative to element 0.
    // Element k is exp(-i 2π d k sin(θ)).
    pub fn steering_vector(&self, angle: f64) -> Array1<Complex64> {
        const i: Complex64 = Complex64::new(0., 1.);

        let phase_step = 2. * PI * self.spacing * angle.sin();
        (0..self.element_count)
            .map(|k| (-i * phase_step * k as f64).exp())
            .collect()
    }
}

pub fn steering_vector(geometry: &ArrayGeometry, angle: f64) -> Array1<Complex64> {
    geometry.steering_vector(angle)
}
