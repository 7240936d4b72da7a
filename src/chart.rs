//! Horizontal bar chart of the gender breakdown, rendered to PNG bytes.
//!
//! Text is drawn with the bundled DejaVu Sans face; the trimmed backend
//! does no system font discovery. Label drawing stays best effort:
//! should the face fail to register, the chart ships bars and axes only
//! instead of failing the run.

use std::io::Cursor;
use std::sync::Once;

use anyhow::{anyhow, Context};
use image::{ImageOutputFormat, RgbImage};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::register_font;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use crate::models::AggregatedCounts;

const WIDTH: u32 = 445;
const HEIGHT: u32 = 240;

const MARGIN_LEFT: i32 = 85;
const MARGIN_TOP: i32 = 40;
const PLOT_WIDTH: i32 = 320;
const PLOT_HEIGHT: i32 = 160;

/// Fraction of each row left blank between bars and at the plot edges.
const BAND_PADDING: f64 = 0.3;

const BAR_COLOR: RGBColor = RGBColor(180, 15, 32);

static FONT_BYTES: &[u8] = include_bytes!("../fonts/DejaVuSans.ttf");

fn ensure_font() {
    static REGISTER: Once = Once::new();
    REGISTER.call_once(|| {
        if register_font("sans-serif", FontStyle::Normal, FONT_BYTES).is_err() {
            debug!("Bundled font failed to register");
        }
    });
}

/// Render the breakdown for a subject. Output is deterministic for a
/// given input; callers treat the bytes as an opaque PNG.
pub fn render_chart(
    counts: &AggregatedCounts,
    title: &str,
    year: &str,
    cast_member_count: usize,
) -> anyhow::Result<Vec<u8>> {
    ensure_font();
    let mut raw = vec![0u8; (WIDTH * HEIGHT * 3) as usize];
    {
        let root = BitMapBackend::with_buffer(&mut raw, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE)?;

        let title_style = TextStyle::from(("sans-serif", 16).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        let row_style = TextStyle::from(("sans-serif", 12).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));
        let tick_style = TextStyle::from(("sans-serif", 10).into_font())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));

        draw_label(
            &root,
            &format!("{title} ({year})"),
            (WIDTH as i32 / 2, 12),
            &title_style,
        );

        // Row layout: three equal bands with padded gaps, top to bottom in
        // presentation order.
        let rows = counts.iter().count() as f64;
        let step = PLOT_HEIGHT as f64 / (rows - BAND_PADDING + 2.0 * BAND_PADDING);
        let band = step * (1.0 - BAND_PADDING);
        let scale = PLOT_WIDTH as f64 / cast_member_count.max(1) as f64;

        for (row, (category, count)) in counts.iter().enumerate() {
            let y0 = MARGIN_TOP + (step * BAND_PADDING + row as f64 * step).round() as i32;
            let y1 = y0 + band.round() as i32;
            let bar_width = (count as f64 * scale).round() as i32;
            root.draw(&Rectangle::new(
                [(MARGIN_LEFT, y0), (MARGIN_LEFT + bar_width, y1)],
                BAR_COLOR.filled(),
            ))?;
            draw_label(
                &root,
                category.label(),
                (MARGIN_LEFT - 12, (y0 + y1) / 2),
                &row_style,
            );
        }

        let axis_y = MARGIN_TOP + PLOT_HEIGHT;
        root.draw(&PathElement::new(
            vec![(MARGIN_LEFT, axis_y), (MARGIN_LEFT + PLOT_WIDTH, axis_y)],
            BLACK,
        ))?;

        let tick_every = tick_step(cast_member_count.max(1) as f64, 5.0).max(1.0) as usize;
        for value in (0..=cast_member_count).step_by(tick_every) {
            let x = MARGIN_LEFT + (value as f64 * scale).round() as i32;
            root.draw(&PathElement::new(vec![(x, axis_y), (x, axis_y + 6)], BLACK))?;
            draw_label(&root, &value.to_string(), (x, axis_y + 8), &tick_style);
        }

        draw_label(
            &root,
            &format!("Top {cast_member_count} Billed Cast Members"),
            (MARGIN_LEFT + PLOT_WIDTH / 2, axis_y + 24),
            &tick_style,
        );

        root.present()?;
    }

    let image = RgbImage::from_raw(WIDTH, HEIGHT, raw)
        .ok_or_else(|| anyhow!("chart buffer has the wrong size"))?;
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageOutputFormat::Png)
        .context("encoding chart PNG")?;
    Ok(png)
}

fn draw_label(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    text: &str,
    pos: (i32, i32),
    style: &TextStyle<'_>,
) {
    if let Err(e) = root.draw(&Text::new(text.to_string(), pos, style.clone())) {
        debug!("Chart label skipped - text={:?}, error={}", text, e);
    }
}

/// Nice round tick interval for an axis from zero to `max` with roughly
/// `count` divisions, rounded to a 1/2/5 multiple of a power of ten.
fn tick_step(max: f64, count: f64) -> f64 {
    let raw = max / count;
    let base = 10f64.powf(raw.log10().floor());
    match raw / base {
        e if e >= 50f64.sqrt() => 10.0 * base,
        e if e >= 10f64.sqrt() => 5.0 * base,
        e if e >= 2f64.sqrt() => 2.0 * base,
        _ => base,
    }
}
