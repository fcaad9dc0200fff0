use serde_json::{Map, Value, json};

use crate::{
    analysis::{genre_distribution, value_counts},
    error::PlotError,
    types::TrackRecord,
};

use super::{
    Plot,
    svg::{SvgDocument, categorical},
};

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 1500.0;
const MAX_WORDS: usize = 100;
const MAX_FONT: f64 = 180.0;
const MIN_FONT: f64 = 10.0;
// rough advance of a sans-serif glyph relative to the font size
const GLYPH_WIDTH: f64 = 0.6;
const SPIRAL_SPACING: f64 = 12.0;
const SPIRAL_STEP: f64 = 8.0;

/// A word placed on the canvas; (`x`, `y`) is the top-left of its box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub word: String,
    pub count: usize,
    pub font_size: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PlacedWord {
    pub fn overlaps(&self, other: &PlacedWord) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

pub fn wordcloud_genres(rows: &[TrackRecord]) -> Result<Plot, PlotError> {
    let counts = genre_distribution(rows);
    if counts.is_empty() {
        return Err(PlotError::Empty("wordcloud_genres"));
    }

    let top = top_five(&counts);
    let names: Vec<&str> = counts.iter().take(5).map(|(g, _)| g.as_str()).collect();
    Ok(Plot {
        name: "wordcloud_genres",
        file_name: "wordcloud_genres.svg",
        content: render(&counts),
        explanation: json!({
            "summary": format!("Top genres are {}.", names.join(", ")),
            "top_genres": top,
        }),
    })
}

pub fn wordcloud_artists(rows: &[TrackRecord]) -> Result<Plot, PlotError> {
    let counts = value_counts(rows.iter().map(|r| r.artist.clone()));
    if counts.is_empty() {
        return Err(PlotError::Empty("wordcloud_artists"));
    }

    let top = top_five(&counts);
    let names: Vec<&str> = counts.iter().take(5).map(|(a, _)| a.as_str()).collect();
    Ok(Plot {
        name: "wordcloud_artists",
        file_name: "wordcloud_artists.svg",
        content: render(&counts),
        explanation: json!({
            "summary": format!("Most listened artists include {}.", names.join(", ")),
            "top_artists": top,
        }),
    })
}

fn top_five(counts: &[(String, usize)]) -> Value {
    let map: Map<String, Value> = counts
        .iter()
        .take(5)
        .map(|(k, v)| (k.clone(), json!(v)))
        .collect();
    Value::Object(map)
}

fn render(counts: &[(String, usize)]) -> String {
    let placed = layout_words(counts, WIDTH, HEIGHT);
    let mut doc = SvgDocument::new(WIDTH, HEIGHT);
    let total = placed.len();
    for (i, word) in placed.iter().enumerate() {
        // baseline sits at roughly 80% of the box height
        doc.text(
            word.x,
            word.y + word.height * 0.8,
            word.font_size,
            &categorical(i, total),
            "start",
            &word.word,
        );
    }
    doc.finish()
}

/// Places up to 100 words, most frequent first, horizontally and without
/// overlap.
///
/// Font sizes scale with the relative frequency. Each word walks an
/// Archimedean spiral out of the canvas center until its box fits; when the
/// spiral leaves the canvas the font shrinks by 10% and the walk restarts.
/// Words that do not fit at the minimum size are dropped, and later words
/// never start larger than the last size that had to shrink.
pub fn layout_words(counts: &[(String, usize)], width: f64, height: f64) -> Vec<PlacedWord> {
    let max_count = counts.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if max_count == 0 {
        return Vec::new();
    }

    let mut placed: Vec<PlacedWord> = Vec::new();
    let mut size_cap = MAX_FONT;

    for (word, count) in counts.iter().take(MAX_WORDS) {
        if word.is_empty() {
            continue;
        }
        let relative = *count as f64 / max_count as f64;
        let mut font_size = (MAX_FONT * (0.5 * relative + 0.5)).min(size_cap);

        while font_size >= MIN_FONT {
            if let Some(found) = fit_on_spiral(word, *count, font_size, &placed, width, height) {
                placed.push(found);
                break;
            }
            font_size *= 0.9;
            size_cap = font_size;
        }
    }

    placed
}

fn fit_on_spiral(
    word: &str,
    count: usize,
    font_size: f64,
    placed: &[PlacedWord],
    width: f64,
    height: f64,
) -> Option<PlacedWord> {
    let box_w = word.chars().count() as f64 * font_size * GLYPH_WIDTH;
    let box_h = font_size;
    if box_w > width || box_h > height {
        return None;
    }

    let (cx, cy) = (width / 2.0, height / 2.0);
    let max_radius = (cx * cx + cy * cy).sqrt();
    let b = SPIRAL_SPACING / (2.0 * std::f64::consts::PI);
    let mut theta: f64 = 0.0;

    loop {
        let r = b * theta;
        if r > max_radius {
            return None;
        }

        let x = cx + r * theta.cos() - box_w / 2.0;
        let y = cy + r * theta.sin() - box_h / 2.0;
        let inside = x >= 0.0 && y >= 0.0 && x + box_w <= width && y + box_h <= height;
        let free = || {
            !placed.iter().any(|p| {
                x < p.x + p.width && p.x < x + box_w && y < p.y + p.height && p.y < y + box_h
            })
        };
        if inside && free() {
            return Some(PlacedWord {
                word: word.to_string(),
                count,
                font_size,
                x,
                y,
                width: box_w,
                height: box_h,
            });
        }

        // constant arc length per step
        theta += SPIRAL_STEP / r.max(SPIRAL_STEP);
    }
}
