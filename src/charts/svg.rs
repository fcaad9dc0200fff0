//! A tiny SVG writer and the rainbow color map shared by the charts.

use std::f64::consts::PI;

use crate::utils::escape_html;

/// An SVG document built element by element. The background stays
/// transparent: nothing is drawn behind the elements.
#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: f64,
    height: f64,
    defs: String,
    body: String,
}

impl SvgDocument {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            defs: String::new(),
            body: String::new(),
        }
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// Horizontal gradient through `stops` (offset in `0..=1`, color).
    pub fn linear_gradient(&mut self, id: &str, stops: &[(f64, String)]) {
        self.defs.push_str(&format!(
            r#"<linearGradient id="{}" x1="0" y1="0" x2="1" y2="0">"#,
            escape_html(id)
        ));
        for (offset, color) in stops {
            self.defs.push_str(&format!(
                r#"<stop offset="{:.3}" stop-color="{}"/>"#,
                offset, color
            ));
        }
        self.defs.push_str("</linearGradient>");
    }

    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64, fill: &str) {
        self.body.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
            x, y, width, height, fill
        ));
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, fill: &str, opacity: f64) {
        self.body.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{:.2}"/>"#,
            cx, cy, r, fill, opacity
        ));
    }

    /// A closed polygon through `points`.
    pub fn polygon(&mut self, points: &[(f64, f64)], fill: &str, opacity: f64) {
        if points.is_empty() {
            return;
        }
        let coords: Vec<String> = points
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        self.body.push_str(&format!(
            r#"<polygon points="{}" fill="{}" fill-opacity="{:.2}" stroke="{}" stroke-width="1"/>"#,
            coords.join(" "),
            fill,
            opacity,
            fill
        ));
    }

    /// Text anchored at (`x`, `y`); `anchor` is an SVG `text-anchor` value.
    pub fn text(&mut self, x: f64, y: f64, size: f64, fill: &str, anchor: &str, content: &str) {
        self.body.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-size="{:.1}" font-family="Helvetica, Arial, sans-serif" fill="{}" text-anchor="{}">{}</text>"#,
            x,
            y,
            size,
            fill,
            anchor,
            escape_html(content)
        ));
    }

    pub fn finish(self) -> String {
        let defs = if self.defs.is_empty() {
            String::new()
        } else {
            format!("<defs>{}</defs>", self.defs)
        };
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">{}{}</svg>"#,
            defs,
            self.body,
            w = self.width,
            h = self.height,
        )
    }
}

/// The `rainbow` color map: purple at `0.0`, red at `1.0`.
pub fn rainbow(t: f64) -> (u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let r = (2.0 * t - 0.5).abs().min(1.0);
    let g = (PI * t).sin();
    let b = (PI * t / 2.0).cos();
    (channel(r), channel(g), channel(b))
}

/// `rainbow(t)` as a `#rrggbb` string.
pub fn rainbow_hex(t: f64) -> String {
    let (r, g, b) = rainbow(t);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Color of item `index` out of `count`, spread over the whole map.
pub fn categorical(index: usize, count: usize) -> String {
    if count <= 1 {
        return rainbow_hex(0.0);
    }
    rainbow_hex(index as f64 / (count - 1) as f64)
}

fn channel(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}
