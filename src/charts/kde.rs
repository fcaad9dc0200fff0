use std::f64::consts::PI;

use serde_json::{Map, Value, json};

use crate::{error::PlotError, types::TrackRecord};

use super::{
    Plot,
    svg::{SvgDocument, categorical},
};

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 900.0;
const GRID_POINTS: usize = 200;
/// Bandwidths the grid extends past the data on each side.
const CUT: f64 = 3.0;

/// Scott's rule: sample standard deviation times `n^(-1/5)`.
///
/// `None` for fewer than two values or zero variance, where no density can
/// be estimated.
pub fn scott_bandwidth(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std = variance.sqrt();
    if !std.is_finite() || std <= f64::EPSILON {
        return None;
    }
    Some(std * (n as f64).powf(-0.2))
}

/// Gaussian kernel density of `values` evaluated at every point of `grid`.
pub fn gaussian_kde(values: &[f64], bandwidth: f64, grid: &[f64]) -> Vec<f64> {
    if values.is_empty() || bandwidth <= 0.0 {
        return vec![0.0; grid.len()];
    }
    let norm = 1.0 / (values.len() as f64 * bandwidth * (2.0 * PI).sqrt());
    grid.iter()
        .map(|&y| {
            values
                .iter()
                .map(|&x| (-0.5 * ((y - x) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm
        })
        .collect()
}

/// Per-playlist share of the density at each grid point.
#[derive(Debug, Clone)]
pub struct Ribbons {
    pub grid: Vec<f64>,
    /// (playlist, share per grid point); shares sum to 1 at every point.
    pub layers: Vec<(String, Vec<f64>)>,
}

/// Per-playlist KDE of `log1p(playcount)`, rows exploded by genre, stacked
/// and normalized to fill.
pub fn playcount_distribution(rows: &[TrackRecord]) -> Result<Plot, PlotError> {
    let groups = exploded_log_playcounts(rows);
    let ribbons = fill_ribbons(&groups).ok_or(PlotError::Empty("playcount_distribution"))?;

    let summary = top_playlists_by_playcount(rows);
    Ok(Plot {
        name: "playcount_distribution",
        file_name: "playcount_distribution.svg",
        content: render(&ribbons),
        explanation: json!({
            "summary": "Top 5 playlists with the highest total playcounts.",
            "top_playlists": summary,
        }),
    })
}

/// `log1p(playcount)` per playlist, one value per genre of the row.
/// Playlists keep their order of first appearance.
fn exploded_log_playcounts(rows: &[TrackRecord]) -> Vec<(String, Vec<f64>)> {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for row in rows {
        let value = (row.playcount.unwrap_or(0) as f64).ln_1p();
        let idx = match groups.iter().position(|(p, _)| *p == row.playlist) {
            Some(idx) => idx,
            None => {
                groups.push((row.playlist.clone(), Vec::new()));
                groups.len() - 1
            }
        };
        groups[idx]
            .1
            .extend(std::iter::repeat_n(value, row.genres.len()));
    }
    groups
}

/// Stacks the weighted densities of every playlist that has a bandwidth and
/// normalizes them to fill. Playlists without variance are left out.
pub fn fill_ribbons(groups: &[(String, Vec<f64>)]) -> Option<Ribbons> {
    let estimable: Vec<(&String, &Vec<f64>, f64)> = groups
        .iter()
        .filter_map(|(p, v)| scott_bandwidth(v).map(|bw| (p, v, bw)))
        .collect();
    if estimable.is_empty() {
        return None;
    }

    let lo = estimable
        .iter()
        .map(|(_, v, bw)| v.iter().copied().fold(f64::INFINITY, f64::min) - CUT * bw)
        .fold(f64::INFINITY, f64::min);
    let hi = estimable
        .iter()
        .map(|(_, v, bw)| v.iter().copied().fold(f64::NEG_INFINITY, f64::max) + CUT * bw)
        .fold(f64::NEG_INFINITY, f64::max);
    let step = (hi - lo) / (GRID_POINTS - 1) as f64;
    let grid: Vec<f64> = (0..GRID_POINTS).map(|i| lo + step * i as f64).collect();

    // common normalization: each density is weighted by its share of the data
    let total: usize = estimable.iter().map(|(_, v, _)| v.len()).sum();
    let densities: Vec<Vec<f64>> = estimable
        .iter()
        .map(|(_, v, bw)| {
            let weight = v.len() as f64 / total as f64;
            gaussian_kde(v, *bw, &grid)
                .into_iter()
                .map(|d| d * weight)
                .collect()
        })
        .collect();

    let sums: Vec<f64> = (0..grid.len())
        .map(|i| densities.iter().map(|d| d[i]).sum())
        .collect();
    let layers = estimable
        .iter()
        .zip(densities)
        .map(|((playlist, _, _), density)| {
            let shares = density
                .iter()
                .zip(&sums)
                .map(|(d, s)| if *s > 0.0 { d / s } else { 0.0 })
                .collect();
            ((*playlist).clone(), shares)
        })
        .collect();

    Some(Ribbons { grid, layers })
}

fn render(ribbons: &Ribbons) -> String {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    let lo = ribbons.grid.first().copied().unwrap_or(0.0);
    let hi = ribbons.grid.last().copied().unwrap_or(1.0);
    let span = (hi - lo).max(f64::EPSILON);
    let y_px = |v: f64| HEIGHT - (v - lo) / span * HEIGHT;

    let mut lower = vec![0.0; ribbons.grid.len()];
    let count = ribbons.layers.len();
    for (i, (_, shares)) in ribbons.layers.iter().enumerate() {
        let upper: Vec<f64> = lower.iter().zip(shares).map(|(l, s)| l + s).collect();

        let mut points: Vec<(f64, f64)> = ribbons
            .grid
            .iter()
            .zip(&upper)
            .map(|(v, u)| (u * WIDTH, y_px(*v)))
            .collect();
        points.extend(
            ribbons
                .grid
                .iter()
                .zip(&lower)
                .rev()
                .map(|(v, l)| (l * WIDTH, y_px(*v))),
        );
        doc.polygon(&points, &categorical(i, count), 0.6);
        lower = upper;
    }

    // legend, upper right
    let legend_w = 180.0;
    let legend_x = WIDTH - legend_w - 10.0;
    doc.rect(
        legend_x,
        10.0,
        legend_w,
        count as f64 * 22.0 + 12.0,
        "rgba(255,255,255,0.6)",
    );
    for (i, (playlist, _)) in ribbons.layers.iter().enumerate() {
        let y = 20.0 + i as f64 * 22.0;
        doc.rect(legend_x + 8.0, y, 14.0, 14.0, &categorical(i, count));
        doc.text(legend_x + 28.0, y + 12.0, 13.0, "#474e5f", "start", playlist);
    }

    doc.finish()
}

/// Top 5 playlists by summed playcount over the genre-exploded rows.
fn top_playlists_by_playcount(rows: &[TrackRecord]) -> Value {
    let mut sums: Vec<(String, u64)> = Vec::new();
    for row in rows {
        let add = row.playcount.unwrap_or(0) * row.genres.len() as u64;
        match sums.iter_mut().find(|(p, _)| *p == row.playlist) {
            Some((_, sum)) => *sum += add,
            None => sums.push((row.playlist.clone(), add)),
        }
    }
    sums.sort_by(|a, b| b.1.cmp(&a.1));

    let map: Map<String, Value> = sums
        .into_iter()
        .take(5)
        .map(|(p, s)| (p, json!(s)))
        .collect();
    Value::Object(map)
}
