use std::{fmt::Display, path::Path};

use ndarray::{s, Array1, ArrayView1, ArrayView2, Axis};
use num::complex::Complex64;
use plotters::{
    coord::Shift,
    prelude::{
        ChartBuilder, Color, DrawingArea, DrawingBackend, IntoDrawingArea, IntoFont,
        LabelAreaPosition, LineSeries, Palette, Palette99, PathElement, SVGBackend, BLACK, WHITE,
    },
};

use crate::error::{DoaError, Result};

pub(crate) fn plot_error(err: impl Display) -> DoaError {
    DoaError::Plot(err.to_string())
}

// One labelled line of a chart.
pub struct SeriesChart {
    x: Array1<f64>,
    y: Array1<f64>,
    label: String,
}

impl SeriesChart {
    pub fn new(x: Array1<f64>, y: Array1<f64>, label: impl Into<String>) -> SeriesChart {
        SeriesChart {
            x,
            y,
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.x.len().min(self.y.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // (min_x, max_x, min_y, max_y) of the data, or None for an empty series.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let min_x = self.x.iter().copied().min_by(|x, y| x.total_cmp(y))?;
        let max_x = self.x.iter().copied().max_by(|x, y| x.total_cmp(y))?;
        let min_y = self.y.iter().copied().min_by(|x, y| x.total_cmp(y))?;
        let max_y = self.y.iter().copied().max_by(|x, y| x.total_cmp(y))?;
        Some((min_x, max_x, min_y, max_y))
    }
}

// Several series drawn on shared axes, each in its own palette color.
pub struct ChartSet {
    caption: String,
    x_desc: String,
    y_desc: String,
    series: Vec<SeriesChart>,
    border_y: f64,
}

impl ChartSet {
    pub fn new(
        caption: impl Into<String>,
        x_desc: impl Into<String>,
        y_desc: impl Into<String>,
    ) -> ChartSet {
        ChartSet {
            caption: caption.into(),
            x_desc: x_desc.into(),
            y_desc: y_desc.into(),
            series: Vec::new(),
            border_y: 0.1,
        }
    }

    pub fn with_series(mut self, series: SeriesChart) -> ChartSet {
        self.series.push(series);
        self
    }

    pub fn series(&self) -> &[SeriesChart] {
        &self.series
    }

    // Real and imaginary parts of the first `count` transmitted samples, time in microseconds.
    pub fn transmitted(time: ArrayView1<f64>, tx: ArrayView1<Complex64>, count: usize) -> ChartSet {
        let n = count.min(time.len()).min(tx.len());
        let t = time.slice(s![..n]).mapv(|t| t * 1e6);
        let tx = tx.slice(s![..n]);

        ChartSet::new("Transmitted signal", "Time (µs)", "Amplitude")
            .with_series(SeriesChart::new(t.clone(), tx.mapv(|x| x.re), "Real part"))
            .with_series(SeriesChart::new(t, tx.mapv(|x| x.im), "Imaginary part"))
    }

    // Real part of the first `count` samples on every element, time in microseconds.
    pub fn received(time: ArrayView1<f64>, rx: ArrayView2<Complex64>, count: usize) -> ChartSet {
        let n = count.min(time.len()).min(rx.ncols());
        let t = time.slice(s![..n]).mapv(|t| t * 1e6);

        rx.axis_iter(Axis(0))
            .enumerate()
            .fold(
                ChartSet::new("Received signals", "Time (µs)", "Amplitude"),
                |set, (k, row)| {
                    set.with_series(SeriesChart::new(
                        t.clone(),
                        row.slice(s![..n]).mapv(|x| x.re),
                        format!("Antenna {}", k + 1),
                    ))
                },
            )
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let (mut bottom_x, mut top_x, mut bottom_y, mut top_y) =
            (f64::MAX, -f64::MAX, f64::MAX, -f64::MAX);
        for bounds in self.series.iter().filter_map(SeriesChart::bounds) {
            bottom_x = bounds.0.min(bottom_x);
            top_x = bounds.1.max(top_x);
            bottom_y = bounds.2.min(bottom_y);
            top_y = bounds.3.max(top_y);
        }
        if bottom_x > top_x {
            return (0., 1., 0., 1.);
        }

        let dist_y = (top_y - bottom_y).clamp(1e-6, f64::MAX);
        let top_x = top_x.max(bottom_x + 1e-6);
        (
            bottom_x,
            top_x,
            bottom_y - dist_y * self.border_y / 2.,
            top_y + dist_y * self.border_y / 2.,
        )
    }

    pub fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        let (bottom_x, top_x, bottom_y, top_y) = self.bounds();

        root.fill(&WHITE).map_err(plot_error)?;

        let mut chart = ChartBuilder::on(root)
            .caption(&self.caption, ("sans-serif", 30).into_font())
            .margin(10)
            .set_label_area_size(LabelAreaPosition::Left, 60)
            .set_label_area_size(LabelAreaPosition::Bottom, 40)
            .build_cartesian_2d(bottom_x..top_x, bottom_y..top_y)
            .map_err(plot_error)?;

        chart
            .configure_mesh()
            .x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .draw()
            .map_err(plot_error)?;

        for (i, series) in self.series.iter().enumerate() {
            let style = Palette99::pick(i).stroke_width(2);
            chart
                .draw_series(LineSeries::new(
                    series.x.iter().copied().zip(series.y.iter().copied()),
                    style,
                ))
                .map_err(plot_error)?
                .label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(plot_error)?;

        root.present().map_err(plot_error)?;
        Ok(())
    }

    pub fn render_svg(&self, path: impl AsRef<Path>, size: (u32, u32)) -> Result<()> {
        let root = SVGBackend::new(path.as_ref(), size).into_drawing_area();
        self.draw(&root)?;
        log::info!("Wrote {} to {}", self.caption, path.as_ref().display());
        Ok(())
    }
}
