use std::path::Path;

use ndarray::Array1;
use plotters::{
    coord::Shift,
    prelude::{
        ChartBuilder, DrawingArea, DrawingBackend, IntoDrawingArea, IntoFont, LabelAreaPosition,
        LineSeries, PathElement, SVGBackend, BLACK, RED, WHITE,
    },
};

use crate::{
    doa::{DoaEstimate, PowerSpectrum},
    error::Result,
    scan::AngularScan,
    series_chart::plot_error,
};

// Beam pattern of a sweep: normalized power against scan angle in degrees, with the estimate marked.
pub struct PatternChart {
    x: Array1<f64>,
    y: Array1<f64>,
    peak: Option<f64>,
    border_x: f64,
    border_y: f64,
}

impl PatternChart {
    pub fn new(scan: &AngularScan, spectrum: &PowerSpectrum) -> PatternChart {
        PatternChart {
            x: scan.degrees(),
            y: spectrum.normalized(),
            peak: None,
            border_x: 0.,
            border_y: 0.1,
        }
    }

    pub fn with_estimate(mut self, estimate: &DoaEstimate) -> PatternChart {
        self.peak = Some(estimate.degrees());
        self
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let min_x = self
            .x
            .iter()
            .copied()
            .min_by(|x, y| x.total_cmp(y))
            .unwrap_or(0.);
        let max_x = self
            .x
            .iter()
            .copied()
            .max_by(|x, y| x.total_cmp(y))
            .unwrap_or(0.);
        let min_y = self
            .y
            .iter()
            .copied()
            .min_by(|x, y| x.total_cmp(y))
            .unwrap_or(0.);
        let max_y = self
            .y
            .iter()
            .copied()
            .max_by(|x, y| x.total_cmp(y))
            .unwrap_or(0.);
        let dist_x = (max_x - min_x).clamp(1e-6, f64::MAX);
        let dist_y = (max_y - min_y).clamp(1e-6, f64::MAX);

        let bottom_x = min_x - dist_x * self.border_x / 2.;
        let bottom_y = min_y - dist_y * self.border_y / 2.;
        let top_x = max_x + dist_x * self.border_x / 2.;
        let top_y = max_y + dist_y * self.border_y / 2.;

        (bottom_x, top_x, bottom_y, top_y)
    }

    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let (bottom_x, top_x, bottom_y, top_y) = self.bounds();

        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(root)
            .caption("Beamformer pattern", ("sans-serif", 30).into_font())
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(bottom_x..top_x, bottom_y..top_y)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .x_desc("Angle (degrees)")
            .y_desc("Normalized power")
            .draw()
            .map_err(plot_error)?;

        chart
            .draw_series(LineSeries::new(
                self.x.iter().copied().zip(self.y.iter().copied()),
                &RED,
            ))
            .map_err(plot_error)?;

        if let Some(peak) = self.peak {
            chart
                .draw_series(std::iter::once(PathElement::new(
                    vec![(peak, bottom_y), (peak, top_y)],
                    &BLACK,
                )))
                .map_err(plot_error)?;
        }

        root.present().map_err(plot_error)?;
        Ok(())
    }

    pub fn render_svg(&self, path: impl AsRef<Path>, size: (u32, u32)) -> Result<()> {
        let root = SVGBackend::new(path.as_ref(), size).into_drawing_area();
        self.draw(&root)?;
        log::info!("Wrote beam pattern to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use approx::assert_relative_eq;
    use plotters::prelude::{IntoDrawingArea, SVGBackend};

    use crate::{
        antenna::ArrayGeometry,
        doa::estimate_doa,
        scan::AngularScan,
        signal::{receive_plane_wave, SampledDomain, Signal, Sine},
    };

    use super::PatternChart;

    fn chart() -> PatternChart {
        let geometry = ArrayGeometry::half_wavelength(3).unwrap();
        let tx = Sine::from(0.1).generate_signal(&SampledDomain::from_sample_count(0., 100., 100));
        let rx = receive_plane_wave(&geometry, 10f64.to_radians(), tx.view());
        let scan = AngularScan::from_degrees(-45., 45., 180).unwrap();
        let (estimate, spectrum) = estimate_doa(rx.view(), &geometry, &scan).unwrap();

        PatternChart::new(&scan, &spectrum).with_estimate(&estimate)
    }

    #[test]
    fn bounds_cover_field_of_view() {
        let (bottom_x, top_x, bottom_y, top_y) = chart().bounds();

        assert_relative_eq!(bottom_x, -45., max_relative = 1e-12);
        assert_relative_eq!(top_x, 45., max_relative = 1e-12);
        assert!(bottom_y < 0.);
        assert!(top_y > 1.);
    }

    #[test]
    fn renders_svg_document() {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (640, 480)).into_drawing_area();
            chart().draw(&root).unwrap();
        }

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Beamformer pattern"));
    }
}
