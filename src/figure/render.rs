use std::io;
use std::path::PathBuf;

use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use thiserror::Error;

/// Matplotlib's default line colour, kept so exported figures match the ones
/// produced before.
const LINE_COLOR: RGBColor = RGBColor(31, 119, 180);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Per-record rendering failure. Callers skip the record and move on; only
/// load and persistence errors abort a session.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("waveform has {waveform} samples but timestamps has {timestamps}")]
    LengthMismatch { waveform: usize, timestamps: usize },
    #[error("nothing to plot: empty waveform")]
    Empty,
    #[error("drawing failed: {0}")]
    Draw(String),
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Rendering parameters, defaulting to the layout the exported figures have
/// always used: 6×5 in at 300 dpi, transparent background, 6 pt ticks and
/// 7 pt axis labels.
#[derive(Debug, Clone)]
pub struct PlotStyle {
    /// Figure width in inches.
    pub width_in: f64,
    /// Figure height in inches.
    pub height_in: f64,
    /// Output resolution in dots per inch.
    pub dpi: u32,
    /// Leave the background unfilled instead of painting it white.
    pub transparent: bool,
    /// Tick label font size in points.
    pub tick_font_pt: f64,
    /// Axis label font size in points.
    pub label_font_pt: f64,
}

impl Default for PlotStyle {
    fn default() -> Self {
        PlotStyle {
            width_in: 6.0,
            height_in: 5.0,
            dpi: 300,
            transparent: true,
            tick_font_pt: 6.0,
            label_font_pt: 7.0,
        }
    }
}

impl PlotStyle {
    fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width_in * self.dpi as f64).round() as u32,
            (self.height_in * self.dpi as f64).round() as u32,
        )
    }

    /// Convert a point size to pixels at the configured resolution.
    fn pt_to_px(&self, pt: f64) -> f64 {
        pt * self.dpi as f64 / 72.0
    }
}

// ---------------------------------------------------------------------------
// SpikeFigure – a rendered figure held in memory
// ---------------------------------------------------------------------------

/// A rendered figure: the SVG document plus its pixel dimensions. Held in
/// memory so the session loop can show it first and persist it later (or
/// not at all).
#[derive(Debug, Clone)]
pub struct SpikeFigure {
    pub svg: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl SpikeFigure {
    /// Write the figure to the well-known preview path so an external
    /// (auto-refreshing) viewer can pick it up. Overwritten per spike.
    pub fn show(&self) -> io::Result<PathBuf> {
        let path = std::env::temp_dir().join("rusty-spikes-preview.svg");
        std::fs::write(&path, &self.svg)?;
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render one spike as a 2-D line plot.
///
/// Layout: square plot box, left and bottom spines only, y ticks at exactly
/// `[min, 0, max]`, no x ticks, and an elapsed-duration caption
/// (`Time (<span> ms)`, one decimal) in place of an x axis.
pub fn render_spike(
    timestamps: &[f64],
    waveform: &[f64],
    style: &PlotStyle,
) -> Result<SpikeFigure, RenderError> {
    if timestamps.is_empty() || waveform.is_empty() {
        return Err(RenderError::Empty);
    }
    if timestamps.len() != waveform.len() {
        return Err(RenderError::LengthMismatch {
            waveform: waveform.len(),
            timestamps: timestamps.len(),
        });
    }

    let (width_px, height_px) = style.pixel_size();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width_px, height_px)).into_drawing_area();
        draw(&root, timestamps, waveform, style, (width_px, height_px))
            .map_err(|e| RenderError::Draw(e.to_string()))?;
        root.present().map_err(|e| RenderError::Draw(e.to_string()))?;
    }

    Ok(SpikeFigure {
        svg,
        width_px,
        height_px,
    })
}

/// Elapsed duration in milliseconds, rounded to one decimal place.
fn span_ms(timestamps: &[f64]) -> f64 {
    let first = timestamps[0];
    let last = timestamps[timestamps.len() - 1];
    ((last - first) * 1000.0 * 10.0).round() / 10.0
}

fn draw<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    timestamps: &[f64],
    waveform: &[f64],
    style: &PlotStyle,
    (width_px, height_px): (u32, u32),
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    if !style.transparent {
        root.fill(&WHITE)?;
    }

    let tick_px = style.pt_to_px(style.tick_font_pt);
    let label_px = style.pt_to_px(style.label_font_pt);

    // Square plot box inside the margins, matching the 1:1 box aspect of the
    // exported figures.
    let left = (tick_px * 6.0).ceil();
    let top = tick_px * 2.0;
    let right = tick_px * 2.0;
    let bottom = label_px * 3.0;
    let side = (width_px as f64 - left - right).min(height_px as f64 - top - bottom);

    let y_min = waveform.iter().cloned().fold(f64::INFINITY, f64::min);
    let y_max = waveform.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    // Axis range covers the data and the zero tick, with a little headroom.
    let mut y_lo = y_min.min(0.0);
    let mut y_hi = y_max.max(0.0);
    let pad = ((y_hi - y_lo).abs() * 0.05).max(1e-9);
    y_lo -= pad;
    y_hi += pad;

    let x0 = timestamps[0];
    let x_span = {
        let span = timestamps[timestamps.len() - 1] - x0;
        if span > 0.0 { span } else { 1.0 }
    };

    let px_x = |x: f64| (left + (x - x0) / x_span * side) as i32;
    let px_y = |y: f64| (top + (y_hi - y) / (y_hi - y_lo) * side) as i32;

    // Left and bottom spines only; top and right stay hidden.
    let origin = (left as i32, (top + side) as i32);
    root.draw(&PathElement::new(
        vec![(left as i32, top as i32), origin],
        BLACK.stroke_width(1),
    ))?;
    root.draw(&PathElement::new(
        vec![origin, ((left + side) as i32, (top + side) as i32)],
        BLACK.stroke_width(1),
    ))?;

    // The waveform itself.
    let points: Vec<(i32, i32)> = timestamps
        .iter()
        .zip(waveform.iter())
        .map(|(&x, &y)| (px_x(x), px_y(y)))
        .collect();
    root.draw(&PathElement::new(points, LINE_COLOR.stroke_width(2)))?;

    // Exactly three y ticks: min, zero, max. No continuous axis.
    let tick_font = FontDesc::new(FontFamily::SansSerif, tick_px, FontStyle::Normal);
    let tick_style = TextStyle::from(tick_font)
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    for tick in [y_min, 0.0, y_max] {
        root.draw(&Text::new(
            tick_label(tick),
            ((left - tick_px * 0.8) as i32, px_y(tick)),
            tick_style.clone(),
        ))?;
    }

    // X ticks are suppressed entirely; the elapsed duration caption is the
    // only x-axis text.
    let label_font = FontDesc::new(FontFamily::SansSerif, label_px, FontStyle::Bold);
    let caption_style = TextStyle::from(label_font.clone())
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    root.draw(&Text::new(
        format!("Time ({:.1} ms)", span_ms(timestamps)),
        ((left + side / 2.0) as i32, (top + side + label_px) as i32),
        caption_style,
    ))?;

    let y_label_style = TextStyle::from(label_font)
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center))
        .transform(FontTransform::Rotate270);
    root.draw(&Text::new(
        "\u{03bc}V (inverted)".to_string(),
        (label_px as i32, (top + side / 2.0) as i32),
        y_label_style,
    ))?;

    Ok(())
}

fn tick_label(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value:.1}")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
