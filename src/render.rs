//! Rendering of density histograms
//!
//! Panels are stacked vertically in a single PNG image. Each panel shows the
//! bars of a [Histogram] and optionally the density the samples are expected
//! to follow.
//!
use crate::histogram::Histogram;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;
use thiserror::Error;

/// Points used to draw a reference density curve
const CURVE_POINTS: usize = 200;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Nothing to draw")]
    NoPanels,
    #[error("Failed to draw figure: {0}")]
    Drawing(String),
}

impl<E> From<DrawingAreaErrorKind<E>> for RenderError
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing(e.to_string())
    }
}

///
/// Single panel of a figure
///
pub struct Panel<'a> {
    /// Label of the horizontal axis
    pub x_label: &'a str,
    pub histogram: &'a Histogram,
    /// Density expected for the samples
    pub reference: Option<&'a dyn Fn(f64) -> f64>,
}

impl<'a> Panel<'a> {
    pub fn new(x_label: &'a str, histogram: &'a Histogram) -> Self {
        Self {
            x_label,
            histogram,
            reference: None,
        }
    }

    /// Overlay a reference density on top of the histogram
    pub fn with_reference(mut self, reference: &'a dyn Fn(f64) -> f64) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Upper limit of the vertical axis
    fn y_max(&self) -> f64 {
        let edges = self.histogram.edges();
        let curve_max = match self.reference {
            Some(f) => curve(f, edges[0], edges[edges.len() - 1])
                .map(|(_, y)| y)
                .fold(0.0, f64::max),
            None => 0.0,
        };
        let top = f64::max(self.histogram.max_density(), curve_max);
        if top > 0.0 {
            top * 1.1
        } else {
            1.0
        }
    }
}

/// Sample `f` on an even grid over `[lo, hi]`
///
fn curve(f: &dyn Fn(f64) -> f64, lo: f64, hi: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
    let dx = (hi - lo) / CURVE_POINTS as f64;
    (0..=CURVE_POINTS).map(move |i| {
        let x = lo + i as f64 * dx;
        (x, f(x))
    })
}

///
/// Draw `panels` stacked on top of each other and save the image to `path`
///
/// # Arguments
/// - `path` - output file, the image format follows from the extension
/// - `size` - width and height of the whole figure in pixels
/// - `panels` - panels in top to bottom order
///
pub fn render_panels(path: &Path, size: (u32, u32), panels: &[Panel]) -> Result<(), RenderError> {
    if panels.is_empty() {
        return Err(RenderError::NoPanels);
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let areas = root.split_evenly((panels.len(), 1));

    for (area, panel) in std::iter::zip(&areas, panels) {
        draw_panel(area, panel)?;
    }

    root.present()?;
    tracing::info!(path = %path.display(), panels = panels.len(), "figure saved");
    Ok(())
}

fn draw_panel<DB>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> Result<(), RenderError>
where
    DB: DrawingBackend,
{
    let edges = panel.histogram.edges();
    let (lo, hi) = (edges[0], edges[edges.len() - 1]);
    let y_max = panel.y_max();

    let mut chart = ChartBuilder::on(area)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(panel.x_label)
        .y_desc("density")
        .draw()?;

    chart.draw_series(panel.histogram.bins().map(|(x0, x1, d)| {
        Rectangle::new([(x0, 0.0), (x1, d)], BLUE.mix(0.5).filled())
    }))?;

    if let Some(f) = panel.reference {
        chart.draw_series(LineSeries::new(curve(f, lo, hi), &RED))?;
    }
    Ok(())
}
