use std::f64::consts::PI;

use serde_json::{Map, Value, json};

use crate::{
    analysis::playlist_distribution, error::PlotError, types::TrackRecord,
};

use super::{
    Plot,
    svg::{SvgDocument, rainbow_hex},
};

const WIDTH: f64 = 600.0;
const HEIGHT: f64 = 900.0;
const CENTER: (f64, f64) = (300.0, 380.0);
const RADIUS: f64 = 260.0;
/// Fraction of the radius left empty in the middle.
const INNER_HOLE: f64 = 0.32;
const TOP_PLAYLISTS: usize = 10;
const LABEL_COLOR: &str = "#474e5f";

/// Angle of `year` on the year wheel: `2π·(year − min)/(max − min)`, 0 when
/// every year is the same.
pub fn year_angle(year: i32, min_year: i32, max_year: i32) -> f64 {
    if max_year == min_year {
        return 0.0;
    }
    2.0 * PI * f64::from(year - min_year) / f64::from(max_year - min_year)
}

/// Polar scatter of the rows of the 10 most frequent playlists: release year
/// as the angle, playcount as radius, color and marker area.
pub fn polar_playcount_playlist(rows: &[TrackRecord]) -> Result<Plot, PlotError> {
    let min_year = rows.iter().map(|r| r.year).min();
    let max_year = rows.iter().map(|r| r.year).max();
    let (Some(min_year), Some(max_year)) = (min_year, max_year) else {
        return Err(PlotError::Empty("polar_playcount_playlist"));
    };

    let top_playlists: Vec<String> = playlist_distribution(rows)
        .into_iter()
        .take(TOP_PLAYLISTS)
        .map(|(p, _)| p)
        .collect();
    let plotted: Vec<&TrackRecord> = rows
        .iter()
        .filter(|r| top_playlists.contains(&r.playlist))
        .collect();

    Ok(Plot {
        name: "polar_playcount_playlist",
        file_name: "polar_playcount_playlist.svg",
        content: render(&plotted, min_year, max_year),
        explanation: explain(rows, min_year, max_year),
    })
}

fn render(rows: &[&TrackRecord], min_year: i32, max_year: i32) -> String {
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    let (cx, cy) = CENTER;
    let max_playcount = rows
        .iter()
        .filter_map(|r| r.playcount)
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    for row in rows {
        let playcount = row.playcount.unwrap_or(0) as f64;
        let relative = playcount / max_playcount;
        let theta = year_angle(row.year, min_year, max_year);
        let r = RADIUS * (INNER_HOLE + (1.0 - INNER_HOLE) * relative);
        // zero at north, clockwise
        let x = cx + r * theta.sin();
        let y = cy - r * theta.cos();
        // marker area is playcount / max * 1000
        let area = relative * 1000.0;
        let marker = (area / PI).sqrt().max(1.0);
        doc.circle(x, y, marker, &rainbow_hex(relative), 0.3);
    }

    let ticks = (max_year - min_year + 1).clamp(1, 10) as usize;
    for i in 1..ticks {
        let t = i as f64 / (ticks - 1) as f64;
        let theta = 2.0 * PI * t;
        let year = f64::from(min_year) + t * f64::from(max_year - min_year);
        let label_r = RADIUS + 22.0;
        doc.text(
            cx + label_r * theta.sin(),
            cy - label_r * theta.cos() + 4.0,
            10.0,
            LABEL_COLOR,
            "middle",
            &format!("{}", year.trunc() as i32),
        );
    }

    // horizontal colorbar
    let stops: Vec<(f64, String)> = (0..=10)
        .map(|i| {
            let t = i as f64 / 10.0;
            (t, rainbow_hex(t))
        })
        .collect();
    doc.linear_gradient("popularity", &stops);
    let bar_y = cy + RADIUS + 70.0;
    doc.rect(60.0, bar_y, WIDTH - 120.0, 14.0, "url(#popularity)");
    doc.text(60.0, bar_y + 30.0, 10.0, LABEL_COLOR, "start", "0");
    doc.text(
        WIDTH - 60.0,
        bar_y + 30.0,
        10.0,
        LABEL_COLOR,
        "end",
        &format!("{}", max_playcount as u64),
    );
    doc.text(WIDTH / 2.0, bar_y + 48.0, 12.0, LABEL_COLOR, "middle", "Popularity");

    doc.finish()
}

fn explain(rows: &[TrackRecord], min_year: i32, max_year: i32) -> Value {
    // first row with the highest playcount
    let peak_year = rows
        .iter()
        .fold(None::<&TrackRecord>, |best, r| match best {
            Some(b) if b.playcount >= r.playcount => Some(b),
            _ => Some(r),
        })
        .map(|r| r.year)
        .unwrap_or(min_year);

    let mut by_playcount: Vec<&TrackRecord> = rows.iter().collect();
    by_playcount.sort_by(|a, b| b.playcount.cmp(&a.playcount));
    let mut top_tracks = Map::new();
    for row in by_playcount.iter().take(5) {
        if !top_tracks.contains_key(&row.name) {
            top_tracks.insert(row.name.clone(), json!(row.playcount.unwrap_or(0)));
        }
    }

    let names: Vec<&str> = top_tracks.keys().take(4).map(String::as_str).collect();
    let summary = format!(
        "Listening history spans from {} to {}, with peak popularity in {}. Top tracks include {}.",
        min_year,
        max_year,
        peak_year,
        names.join(", ")
    );

    json!({
        "min_year": min_year,
        "max_year": max_year,
        "peak_playcount_year": peak_year,
        "top_5_tracks": top_tracks,
        "summary": summary,
    })
}
