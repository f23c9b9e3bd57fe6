use ndarray::{Array1, Array2};
use num::complex::Complex64;
use rand::Rng;

use crate::{
    antenna::ArrayGeometry,
    error::{DoaError, Result},
    scan::AngularScan,
    signal::{add_noise, receive_plane_wave, GaussianNoise, SampledDomain, Signal, Sine},
};

// A single narrowband emitter seen by a uniform linear array, along with the field of view to search.
// Noise deviations apply to the real and imaginary parts separately.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub amplitude: f64,
    // Tone frequency, Hz
    pub freq: f64,
    // Sample rate, Hz
    pub sample_rate: f64,
    // Batch duration, s
    pub duration: f64,
    pub tx_noise: f64,
    pub rx_noise: f64,
    pub element_count: usize,
    // Element spacing, wavelengths
    pub spacing: f64,
    // Arrival angle, degrees
    pub true_doa: f64,
    pub fov_start: f64,
    pub fov_end: f64,
    pub scan_points: usize,
}

// One draw of the scenario: the sample instants, the noisy transmitted tone and what every element received.
#[derive(Clone, Debug, PartialEq)]
pub struct Realization {
    pub time: Array1<f64>,
    pub tx: Array1<Complex64>,
    // elements x samples
    pub rx: Array2<Complex64>,
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            amplitude: 1.,
            freq: 1e6,
            sample_rate: 1e7,
            duration: 10e-3,
            tx_noise: 0.1,
            rx_noise: 0.1,
            element_count: 3,
            spacing: 0.5,
            true_doa: 10.,
            fov_start: -45.,
            fov_end: 45.,
            scan_points: 180,
        }
    }
}

impl Scenario {
    pub fn geometry(&self) -> Result<ArrayGeometry> {
        ArrayGeometry::new(self.element_count, self.spacing)
    }

    pub fn scan(&self) -> Result<AngularScan> {
        AngularScan::from_degrees(self.fov_start, self.fov_end, self.scan_points)
    }

    pub fn time(&self) -> Result<SampledDomain> {
        if !self.duration.is_finite() || self.duration <= 0. {
            return Err(DoaError::InvalidScenario(format!(
                "duration must be positive and finite, got {} s",
                self.duration
            )));
        }
        if !self.sample_rate.is_finite() || self.sample_rate <= 0. {
            return Err(DoaError::InvalidScenario(format!(
                "sample rate must be positive and finite, got {} Hz",
                self.sample_rate
            )));
        }
        Ok(SampledDomain::new(0., self.duration, self.sample_rate))
    }

    // Noisy transmitted tone, delayed onto every element for the configured arrival angle, with
    // independent receiver noise added per element.
    pub fn realize<R: Rng>(&self, rng: R) -> Result<Realization> {
        let geometry = self.geometry()?;
        let time = self.time()?;

        let tone = Sine {
            freq: self.freq,
            phase: 0.,
            amplitude: self.amplitude,
        };
        let tx_noise = GaussianNoise::new(self.tx_noise, rng)?;
        let tx = tone.generate_signal(&time) + tx_noise.generate_signal(&time);

        let mut rx = receive_plane_wave(&geometry, self.true_doa.to_radians(), tx.view());
        let rx_noise = GaussianNoise::new(self.rx_noise, tx_noise.into_rng())?;
        add_noise(&mut rx, &rx_noise);

        log::trace!(
            "Realized {} samples on {} elements for a source at {}°",
            rx.ncols(),
            rx.nrows(),
            self.true_doa
        );

        Ok(Realization {
            time: time.iter().collect(),
            tx,
            rx,
        })
    }
}
