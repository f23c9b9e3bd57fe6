// Do this because numerics calls for a lot of non-standard names
#![allow(non_snake_case)]
#![allow(non_upper_case_globals)]
pub mod antenna;
pub mod beamformer;
pub mod doa;
pub mod error;
pub mod helper;
pub mod pattern_chart;
pub mod scan;
pub mod scenario;
pub mod series_chart;
pub mod signal;

pub use crate::antenna::{steering_vector, ArrayGeometry};
pub use crate::beamformer::{beamform, beamform_output};
pub use crate::doa::{
    estimate_doa, estimate_doa_from_angles, power_spectrum, DoaEstimate, PowerSpectrum,
};
pub use crate::error::{DoaError, Result};
pub use crate::scan::AngularScan;
