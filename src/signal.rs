use std::{cell::RefCell, f64::consts::PI};

use ndarray::{Array1, Array2, ArrayView1};
use num::complex::Complex64;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{antenna::ArrayGeometry, error::Result};

pub fn sampling_freq_to_len(interval: f64, sampling_frequency: f64) -> usize {
    (interval * sampling_frequency).round() as usize
}

pub trait Signal {
    fn generate(&self, t: f64) -> Complex64;

    fn generate_signal(&self, time: &SampledDomain) -> Array1<Complex64> {
        time.iter().map(|t| self.generate(t)).collect()
    }
}

// Represents a time interval, sampled at a given rate. The end point itself is not sampled.
#[derive(Clone, Debug)]
pub struct SampledDomain {
    start: f64,
    end: f64,
    freq: f64,
    samples: usize,
}

impl SampledDomain {
    pub fn new(start: f64, end: f64, freq: f64) -> SampledDomain {
        assert!(start <= end);
        SampledDomain {
            start,
            end,
            freq,
            samples: sampling_freq_to_len(end - start, freq),
        }
    }

    pub fn from_sample_count(start: f64, end: f64, num: usize) -> SampledDomain {
        assert!(start <= end);
        SampledDomain {
            start,
            end,
            freq: num as f64 / (end - start),
            samples: num,
        }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn freq(&self) -> f64 {
        self.freq
    }

    pub fn sample_count(&self) -> usize {
        self.samples
    }

    pub fn sample_interval(&self) -> f64 {
        1. / self.freq
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let (start, dt) = (self.start, self.sample_interval());
        (0..self.samples).map(move |n| start + n as f64 * dt)
    }
}

// A complex tone A exp(i(2πft + φ)).
#[derive(Clone, Debug)]
pub struct Sine {
    pub freq: f64,
    pub phase: f64,
    pub amplitude: f64,
}

impl Signal for Sine {
    fn generate(&self, t: f64) -> Complex64 {
        const i: Complex64 = Complex64::new(0., 1.);

        self.amplitude * (i * (2. * PI * self.freq * t + self.phase)).exp()
    }
}

impl From<f64> for Sine {
    fn from(x: f64) -> Self {
        Sine {
            freq: x,
            phase: 0.,
            amplitude: 1.,
        }
    }
}

// Complex white gaussian noise with independent real and imaginary parts of deviation sigma each.
// The generator is handed in by the caller, so a seeded rng reproduces the same realization.
pub struct GaussianNoise<T: Rng> {
    rng: RefCell<T>,
    distr: Normal<f64>,
}

impl<T: Rng> GaussianNoise<T> {
    pub fn new(sigma: f64, rng: T) -> Result<GaussianNoise<T>> {
        Ok(GaussianNoise {
            rng: RefCell::new(rng),
            distr: Normal::new(0., sigma)?,
        })
    }

    pub fn sample(&self) -> Complex64 {
        let rng = &mut *self.rng.borrow_mut();
        Complex64::new(self.distr.sample(rng), self.distr.sample(rng))
    }

    pub fn into_rng(self) -> T {
        self.rng.into_inner()
    }
}

impl<T: Rng> Signal for GaussianNoise<T> {
    fn generate(&self, _: f64) -> Complex64 {
        self.sample()
    }

    fn generate_signal(&self, time: &SampledDomain) -> Array1<Complex64> {
        let rng = &mut *self.rng.borrow_mut();
        time.iter()
            .map(|_| Complex64::new(self.distr.sample(rng), self.distr.sample(rng)))
            .collect()
    }
}

// Each element receives the transmitted waveform with the phase lag of a plane wave from `angle`,
// giving an (elements x samples) matrix with rows steering[k] * tx.
pub fn receive_plane_wave(
    geometry: &ArrayGeometry,
    angle: f64,
    tx: ArrayView1<Complex64>,
) -> Array2<Complex64> {
    let steering = geometry.steering_vector(angle);
    Array2::from_shape_fn((steering.len(), tx.len()), |(k, n)| steering[k] * tx[n])
}

// Adds independent noise to every sample of every element.
pub fn add_noise<T: Rng>(received: &mut Array2<Complex64>, noise: &GaussianNoise<T>) {
    received.map_inplace(|x| *x += noise.sample());
}
