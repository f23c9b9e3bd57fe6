use ndarray::{Array1, ArrayView1};

use crate::error::{DoaError, Result};

// The ordered set of candidate arrival angles (radians) a sweep is evaluated over.
// Always non-empty and strictly increasing, so every angle maps to exactly one spectrum slot.
#[derive(Clone, Debug, PartialEq)]
pub struct AngularScan {
    angles: Array1<f64>,
}

impl AngularScan {
    pub fn new(angles: impl Into<Array1<f64>>) -> Result<AngularScan> {
        let angles = angles.into();
        if angles.is_empty() {
            return Err(DoaError::InvalidScan("scan has no angles".to_owned()));
        }
        if let Some(bad) = angles.iter().position(|x| !x.is_finite()) {
            return Err(DoaError::InvalidScan(format!(
                "angle {} at index {} is not finite",
                angles[bad], bad
            )));
        }
        for (idx, (a, b)) in angles.iter().zip(angles.iter().skip(1)).enumerate() {
            // Duplicates are rejected along with decreasing runs
            if a >= b {
                return Err(DoaError::InvalidScan(format!(
                    "angles must be strictly increasing, {} is followed by {} at index {}",
                    a,
                    b,
                    idx + 1
                )));
            }
        }

        Ok(AngularScan { angles })
    }

    // `count` evenly spaced angles from `start` to `end` inclusive, both given in degrees.
    pub fn from_degrees(start: f64, end: f64, count: usize) -> Result<AngularScan> {
        let angles = match count {
            0 => Array1::zeros(0),
            1 => Array1::from_elem(1, start.to_radians()),
            _ => Array1::linspace(start.to_radians(), end.to_radians(), count),
        };
        Self::new(angles)
    }

    // Angles from `start` to `end` (degrees) in increments of `step`. `end` is included when it
    // lands on the grid.
    pub fn from_step_degrees(start: f64, end: f64, step: f64) -> Result<AngularScan> {
        if !(step > 0.) || !step.is_finite() {
            return Err(DoaError::InvalidScan(format!(
                "step must be positive and finite, got {}",
                step
            )));
        }
        if !(start <= end) {
            return Err(DoaError::InvalidScan(format!(
                "field of view starts at {}° but ends at {}°",
                start, end
            )));
        }
        // Tolerance keeps an end point that is a whole number of steps away despite rounding
        let count = ((end - start) / step + 1e-9).floor() as usize + 1;
        let angles: Array1<f64> = (0..count)
            .map(|n| (start + n as f64 * step).to_radians())
            .collect();
        Self::new(angles)
    }

    pub fn angles(&self) -> ArrayView1<f64> {
        self.angles.view()
    }

    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    pub fn angle(&self, idx: usize) -> Option<f64> {
        self.angles.get(idx).copied()
    }

    pub fn degrees(&self) -> Array1<f64> {
        self.angles.mapv(f64::to_degrees)
    }

    // Mean spacing between neighbouring angles, radians. Zero for a single angle scan.
    pub fn resolution(&self) -> f64 {
        let n = self.angles.len();
        if n < 2 {
            return 0.;
        }
        (self.angles[n - 1] - self.angles[0]) / (n - 1) as f64
    }
}
