use ndarray::{Array1, ArrayView1, ArrayView2, Zip};
use num::complex::Complex64;

use crate::{
    antenna::ArrayGeometry,
    beamformer::average_power,
    error::{DoaError, Result},
    helper::decibels_or_else,
    scan::AngularScan,
};

// Floor used when a spectrum bin carries no power at all.
const SILENT_DB: f64 = -300.;

// Beamformed output power per scan angle, index aligned with the scan it was computed over.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerSpectrum {
    power: Array1<f64>,
}

impl PowerSpectrum {
    pub fn values(&self) -> ArrayView1<f64> {
        self.power.view()
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.power
    }

    pub fn len(&self) -> usize {
        self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }

    pub fn max(&self) -> Option<f64> {
        self.argmax().map(|idx| self.power[idx])
    }

    // Index of the largest power. Exact ties go to the earliest (lowest angle) index. A NaN bin
    // wins as soon as it is reached, so NaN input surfaces at the first affected angle.
    pub fn argmax(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &p) in self.power.iter().enumerate() {
            if p.is_nan() {
                return Some(idx);
            }
            match best {
                Some((_, best_p)) if p <= best_p => {}
                _ => best = Some((idx, p)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    // Spectrum scaled into [0, 1] by its own peak. Only meant for display; the peak position is unchanged.
    // A spectrum without any power stays all zero, a NaN peak stays NaN.
    pub fn normalized(&self) -> Array1<f64> {
        match self.max() {
            Some(peak) if peak > 0. || peak.is_nan() => self.power.mapv(|p| p / peak),
            _ => Array1::zeros(self.power.len()),
        }
    }

    // Normalized spectrum in decibels, 0 dB at the peak.
    pub fn normalized_decibels(&self) -> Array1<f64> {
        self.normalized().mapv(|p| decibels_or_else(p, SILENT_DB))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DoaEstimate {
    // Estimated arrival angle, radians from broadside
    pub angle: f64,
    // Position of the estimate within the scan
    pub index: usize,
    // Beamformed power at the estimate
    pub power: f64,
}

impl DoaEstimate {
    pub fn degrees(&self) -> f64 {
        self.angle.to_degrees()
    }
}

// Beamformed power for every angle of the scan. Angles are evaluated in parallel, each one writing
// only its own slot of the output buffer.
pub fn power_spectrum(
    samples: ArrayView2<Complex64>,
    geometry: &ArrayGeometry,
    scan: &AngularScan,
) -> Result<PowerSpectrum> {
    if samples.nrows() != geometry.element_count() {
        return Err(DoaError::DimensionMismatch {
            expected: samples.nrows(),
            found: geometry.element_count(),
        });
    }

    log::trace!(
        "Sweeping {} angles over a {}x{} sample batch",
        scan.len(),
        samples.nrows(),
        samples.ncols()
    );

    let mut power = Array1::<f64>::zeros(scan.len());
    Zip::from(&mut power)
        .and(scan.angles())
        .par_for_each(|p, &theta| {
            let steering = geometry.steering_vector(theta);
            *p = average_power(samples, steering.view());
        });

    Ok(PowerSpectrum { power })
}

// Sweeps the beamformer over the scan and picks the angle of maximum power.
pub fn estimate_doa(
    samples: ArrayView2<Complex64>,
    geometry: &ArrayGeometry,
    scan: &AngularScan,
) -> Result<(DoaEstimate, PowerSpectrum)> {
    let spectrum = power_spectrum(samples, geometry, scan)?;

    // A valid scan is never empty, so neither is its spectrum
    let index = spectrum
        .argmax()
        .ok_or_else(|| DoaError::InvalidScan("scan has no angles".to_owned()))?;
    let estimate = DoaEstimate {
        angle: scan.angles()[index],
        index,
        power: spectrum.power[index],
    };

    log::debug!(
        "Peak power {:.4e} at {:.3}° (scan index {})",
        estimate.power,
        estimate.degrees(),
        index
    );

    Ok((estimate, spectrum))
}

// Same as `estimate_doa`, for a scan given as raw angles in radians. The angles must be non-empty
// and strictly increasing.
pub fn estimate_doa_from_angles(
    samples: ArrayView2<Complex64>,
    geometry: &ArrayGeometry,
    angles: &[f64],
) -> Result<(DoaEstimate, PowerSpectrum)> {
    let scan = AngularScan::new(angles.to_vec())?;
    estimate_doa(samples, geometry, &scan)
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2};
    use num::complex::Complex64;
    use rand::{rngs::StdRng, SeedableRng};

    use crate::{
        antenna::ArrayGeometry,
        beamformer::beamform,
        error::DoaError,
        scan::AngularScan,
        signal::{add_noise, receive_plane_wave, GaussianNoise, SampledDomain, Signal, Sine},
    };

    use super::{estimate_doa, estimate_doa_from_angles, power_spectrum, PowerSpectrum};

    fn tone() -> Array1<Complex64> {
        Sine::from(1e6).generate_signal(&SampledDomain::new(0., 1e-4, 1e7))
    }

    #[test]
    fn recovers_true_angle_within_one_step() {
        let geometry = ArrayGeometry::half_wavelength(3).unwrap();
        let rx = receive_plane_wave(&geometry, 10f64.to_radians(), tone().view());
        let scan = AngularScan::from_degrees(-45., 45., 180).unwrap();

        let (estimate, spectrum) = estimate_doa(rx.view(), &geometry, &scan).unwrap();

        assert_eq!(spectrum.len(), scan.len());
        assert!((estimate.angle - 10f64.to_radians()).abs() <= scan.resolution());
        assert!((estimate.degrees() - 10.).abs() <= 90. / 179.);
    }

    #[test]
    fn recovers_angle_through_noise() {
        let geometry = ArrayGeometry::half_wavelength(8).unwrap();
        let mut rx = receive_plane_wave(&geometry, (-23f64).to_radians(), tone().view());
        let noise = GaussianNoise::new(0.1, StdRng::seed_from_u64(42)).unwrap();
        add_noise(&mut rx, &noise);
        let scan = AngularScan::from_step_degrees(-60., 60., 0.25).unwrap();

        let (estimate, _) = estimate_doa(rx.view(), &geometry, &scan).unwrap();

        assert!((estimate.degrees() + 23.).abs() <= 0.5);
    }

    #[test]
    fn spectrum_matches_single_angle_beamforming() {
        let geometry = ArrayGeometry::new(5, 0.4).unwrap();
        let mut rx = receive_plane_wave(&geometry, 0.3, tone().view());
        add_noise(
            &mut rx,
            &GaussianNoise::new(0.5, StdRng::seed_from_u64(1)).unwrap(),
        );
        let scan = AngularScan::from_degrees(-80., 80., 57).unwrap();

        let spectrum = power_spectrum(rx.view(), &geometry, &scan).unwrap();

        for (&theta, &p) in scan.angles().iter().zip(spectrum.values().iter()) {
            let expected = beamform(rx.view(), geometry.steering_vector(theta).view()).unwrap();
            assert_eq!(p, expected);
            assert!(p >= 0.);
        }
    }

    #[test]
    fn repeated_sweeps_are_identical() {
        let geometry = ArrayGeometry::half_wavelength(4).unwrap();
        let mut rx = receive_plane_wave(&geometry, -0.2, tone().view());
        add_noise(
            &mut rx,
            &GaussianNoise::new(1., StdRng::seed_from_u64(9)).unwrap(),
        );
        let scan = AngularScan::from_degrees(-90., 90., 721).unwrap();

        let first = estimate_doa(rx.view(), &geometry, &scan).unwrap();
        let second = estimate_doa(rx.view(), &geometry, &scan).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn symmetric_ambiguity_resolves_to_lower_angle() {
        // A single element has no directivity, so every angle ties
        let geometry = ArrayGeometry::half_wavelength(1).unwrap();
        let rx = receive_plane_wave(&geometry, 0.5, tone().view());
        let scan = AngularScan::from_degrees(-30., 30., 61).unwrap();

        let (estimate, spectrum) = estimate_doa(rx.view(), &geometry, &scan).unwrap();

        assert_eq!(estimate.index, 0);
        assert_relative_eq!(estimate.degrees(), -30.);
        assert!(spectrum.values().iter().all(|&p| p == spectrum.values()[0]));
    }

    #[test]
    fn mirrored_scan_angles_tie_on_broadside_source() {
        // Broadside data gives |AF(θ)| = |AF(-θ)|; a scan symmetric about zero without a zero bin
        // has its two nearest angles tied.
        let geometry = ArrayGeometry::half_wavelength(2).unwrap();
        let tx = Array1::from_elem(64, Complex64::new(1., 0.));
        let rx = receive_plane_wave(&geometry, 0., tx.view());
        let scan = AngularScan::new(vec![-0.2, -0.05, 0.05, 0.2]).unwrap();

        let (estimate, spectrum) = estimate_doa(rx.view(), &geometry, &scan).unwrap();

        assert_eq!(spectrum.values()[1], spectrum.values()[2]);
        assert_eq!(estimate.index, 1);
    }

    #[test]
    fn silent_input_is_degenerate_not_an_error() {
        let geometry = ArrayGeometry::half_wavelength(3).unwrap();
        let rx = Array2::<Complex64>::zeros((3, 100));
        let scan = AngularScan::from_degrees(-45., 45., 91).unwrap();

        let (estimate, spectrum) = estimate_doa(rx.view(), &geometry, &scan).unwrap();

        assert_eq!(estimate.index, 0);
        assert!(spectrum.values().iter().all(|&p| p == 0.));
        assert!(spectrum.normalized().iter().all(|&p| p == 0.));
    }

    #[test]
    fn normalization_keeps_peak_position() {
        let geometry = ArrayGeometry::half_wavelength(3).unwrap();
        let rx = receive_plane_wave(&geometry, 10f64.to_radians(), tone().view());
        let scan = AngularScan::from_degrees(-45., 45., 180).unwrap();

        let (estimate, spectrum) = estimate_doa(rx.view(), &geometry, &scan).unwrap();
        let normalized = spectrum.normalized();
        let db = spectrum.normalized_decibels();

        assert_relative_eq!(normalized[estimate.index], 1.);
        assert!(normalized.iter().all(|&p| (0. ..=1.).contains(&p)));
        assert_relative_eq!(db[estimate.index], 0.);
        assert!(db.iter().all(|&p| p <= 0.));
    }

    #[test]
    fn argmax_reports_first_nan_bin() {
        let spectrum = PowerSpectrum {
            power: Array1::from(vec![2., 5., f64::NAN, 7., f64::NAN]),
        };
        assert_eq!(spectrum.argmax(), Some(2));
        assert!(spectrum.normalized().iter().all(|p| p.is_nan()));

        let empty = PowerSpectrum {
            power: Array1::zeros(0),
        };
        assert_eq!(empty.argmax(), None);
    }

    #[test]
    fn non_finite_samples_propagate_into_estimate() {
        let geometry = ArrayGeometry::half_wavelength(3).unwrap();
        let mut rx = receive_plane_wave(&geometry, 0.1, tone().view());
        rx[[1, 5]] = Complex64::new(f64::NAN, 0.);
        let scan = AngularScan::from_degrees(-45., 45., 31).unwrap();

        let (estimate, spectrum) = estimate_doa(rx.view(), &geometry, &scan).unwrap();

        assert!(spectrum.values().iter().all(|p| p.is_nan()));
        assert_eq!(estimate.index, 0);
        assert!(estimate.power.is_nan());
    }

    #[test]
    fn empty_scan_is_rejected() {
        let geometry = ArrayGeometry::half_wavelength(3).unwrap();
        let rx = receive_plane_wave(&geometry, 0.1, tone().view());

        assert!(matches!(
            estimate_doa_from_angles(rx.view(), &geometry, &[]),
            Err(DoaError::InvalidScan(_))
        ));
        assert!(matches!(
            estimate_doa_from_angles(rx.view(), &geometry, &[0.3, 0.1]),
            Err(DoaError::InvalidScan(_))
        ));
    }

    #[test]
    fn geometry_must_match_sample_rows() {
        let rx = receive_plane_wave(
            &ArrayGeometry::half_wavelength(3).unwrap(),
            0.1,
            tone().view(),
        );
        let scan = AngularScan::from_degrees(-45., 45., 10).unwrap();

        assert!(matches!(
            estimate_doa(rx.view(), &ArrayGeometry::half_wavelength(4).unwrap(), &scan),
            Err(DoaError::DimensionMismatch {
                expected: 3,
                found: 4
            })
        ));
    }
}
