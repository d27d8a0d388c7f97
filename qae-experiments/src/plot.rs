//! SVG charts for loss curves and the classical collapse sweep.

use std::path::Path;

use plotters::prelude::*;

use crate::error::{ExperimentError, Result};

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;

const SERIES_COLORS: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, CYAN];

/// One labelled loss curve.
#[derive(Debug, Clone)]
pub struct LossSeries {
    pub label: String,
    pub losses: Vec<f64>,
}

impl LossSeries {
    pub fn new(label: impl Into<String>, losses: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            losses,
        }
    }
}

/// Single training curve.
pub fn plot_loss_history(history: &[f64], path: &Path) -> Result<()> {
    plot_loss_histories(
        &[LossSeries::new("Trash Population Loss", history.to_vec())],
        path,
        "QAE Training Progress",
    )
}

/// Loss against evaluation index, one line per series.
pub fn plot_loss_histories(series: &[LossSeries], path: &Path, title: &str) -> Result<()> {
    let longest = series.iter().map(|s| s.losses.len()).max().unwrap_or(0);
    if longest == 0 {
        return Err(ExperimentError::InvalidInput("no loss values to plot".into()));
    }
    let y_max = series
        .iter()
        .flat_map(|s| s.losses.iter().copied())
        .filter(|v| v.is_finite())
        .fold(0.0f64, f64::max)
        .max(1e-3);

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(ExperimentError::plot)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..longest, 0.0..y_max * 1.05)
        .map_err(ExperimentError::plot)?;

    chart
        .configure_mesh()
        .x_desc("Iteration")
        .y_desc("Loss (1 - P(trash=|0>))")
        .draw()
        .map_err(ExperimentError::plot)?;

    for (i, s) in series.iter().enumerate() {
        let color = SERIES_COLORS[i % SERIES_COLORS.len()];
        chart
            .draw_series(LineSeries::new(
                s.losses.iter().copied().enumerate(),
                &color,
            ))
            .map_err(ExperimentError::plot)?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(ExperimentError::plot)?;

    root.present().map_err(ExperimentError::plot)?;
    Ok(())
}

/// Fidelity against qubit count with a horizontal threshold line.
pub fn plot_fidelity_by_qubits(
    points: &[(usize, f64)],
    threshold: f64,
    path: &Path,
    title: &str,
) -> Result<()> {
    if points.is_empty() {
        return Err(ExperimentError::InvalidInput("no fidelity points to plot".into()));
    }
    let x_min = points.iter().map(|p| p.0).min().unwrap_or(0);
    let x_max = points.iter().map(|p| p.0).max().unwrap_or(1).max(x_min + 1);

    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(ExperimentError::plot)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min as f64..x_max as f64, 0.0..1.05)
        .map_err(ExperimentError::plot)?;

    chart
        .configure_mesh()
        .x_desc("Number of Qubits")
        .y_desc("Test Reconstruction Fidelity")
        .draw()
        .map_err(ExperimentError::plot)?;

    let line: Vec<(f64, f64)> = points.iter().map(|&(q, f)| (q as f64, f)).collect();
    chart
        .draw_series(LineSeries::new(line.clone(), &RED))
        .map_err(ExperimentError::plot)?
        .label("Classical AE")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));
    chart
        .draw_series(line.iter().map(|&p| Circle::new(p, 4, RED.filled())))
        .map_err(ExperimentError::plot)?;

    chart
        .draw_series(LineSeries::new(
            vec![(x_min as f64, threshold), (x_max as f64, threshold)],
            &GREEN,
        ))
        .map_err(ExperimentError::plot)?
        .label("Target Threshold")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(ExperimentError::plot)?;

    root.present().map_err(ExperimentError::plot)?;
    Ok(())
}
