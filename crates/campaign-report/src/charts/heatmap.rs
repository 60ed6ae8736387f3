//! Annotated correlation heatmap drawn in pixel space.

use super::DrawResult;
use crate::stats::CorrelationMatrix;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;

const LEFT_MARGIN: i32 = 150;
const RIGHT_MARGIN: i32 = 130;
const TOP_MARGIN: i32 = 20;
const BOTTOM_MARGIN: i32 = 70;
const COLORBAR_WIDTH: i32 = 24;
const COLORBAR_STEPS: i32 = 100;

/// Colour stops of the diverging blue-white-red scale.
const COOLWARM_STOPS: [(f64, (u8, u8, u8)); 5] = [
    (0.0, (59, 76, 192)),
    (0.25, (141, 176, 254)),
    (0.5, (221, 221, 221)),
    (0.75, (244, 154, 123)),
    (1.0, (180, 4, 38)),
];

/// Map `t` in [0, 1] onto the coolwarm scale.
pub fn coolwarm(t: f64) -> RGBColor {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };

    for pair in COOLWARM_STOPS.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = (t - t0) / (t1 - t0);
            let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
            return RGBColor(lerp(c0.0, c1.0), lerp(c0.1, c1.1), lerp(c0.2, c1.2));
        }
    }

    let (_, last) = COOLWARM_STOPS[COOLWARM_STOPS.len() - 1];
    RGBColor(last.0, last.1, last.2)
}

/// Colour of a correlation coefficient in [-1, 1].
pub fn correlation_color(value: f64) -> RGBColor {
    coolwarm((value + 1.0) / 2.0)
}

pub(super) fn draw_heatmap(path: &Path, size: (u32, u32), matrix: &CorrelationMatrix) -> DrawResult {
    let n = matrix.labels.len() as i32;
    if n == 0 {
        return Err("correlation matrix is empty".into());
    }

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Correlation Heatmap", ("sans-serif", 30))?;

    let (width, height) = root.dim_in_pixel();
    let cell = ((width as i32 - LEFT_MARGIN - RIGHT_MARGIN) / n)
        .min((height as i32 - TOP_MARGIN - BOTTOM_MARGIN) / n)
        .max(1);
    let grid = cell * n;
    let (x0, y0) = (LEFT_MARGIN, TOP_MARGIN);

    let centered = |px: f64| {
        ("sans-serif", px)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center))
    };
    let right_aligned = ("sans-serif", 14.0)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));

    for (i, row) in matrix.values.iter().enumerate() {
        let i = i as i32;
        for (j, value) in row.iter().enumerate() {
            let j = j as i32;
            let (cx, cy) = (x0 + j * cell, y0 + i * cell);

            let fill = if value.is_finite() {
                correlation_color(*value)
            } else {
                RGBColor(200, 200, 200)
            };
            root.draw(&Rectangle::new(
                [(cx, cy), (cx + cell, cy + cell)],
                fill.filled(),
            ))?;

            let label = if value.is_finite() {
                format!("{value:.2}")
            } else {
                "nan".to_string()
            };
            let text_color = if value.abs() > 0.6 { &WHITE } else { &BLACK };
            root.draw(&Text::new(
                label,
                (cx + cell / 2, cy + cell / 2),
                centered(16.0).color(text_color),
            ))?;
        }
    }

    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + grid, y0 + grid)],
        BLACK.stroke_width(1),
    ))?;

    // Row labels on the left, column labels staggered below the grid.
    for (k, label) in matrix.labels.iter().enumerate() {
        let k = k as i32;
        root.draw(&Text::new(
            label.clone(),
            (x0 - 8, y0 + k * cell + cell / 2),
            right_aligned.clone(),
        ))?;
        let stagger = if k % 2 == 0 { 14 } else { 34 };
        root.draw(&Text::new(
            label.clone(),
            (x0 + k * cell + cell / 2, y0 + grid + stagger),
            centered(14.0),
        ))?;
    }

    draw_colorbar(&root, x0 + grid + 30, y0, grid)?;

    root.present()?;
    Ok(())
}

fn draw_colorbar(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    x: i32,
    y: i32,
    height: i32,
) -> DrawResult {
    let step = (height as f64 / COLORBAR_STEPS as f64).max(1.0);
    for s in 0..COLORBAR_STEPS {
        // top of the bar is +1
        let value = 1.0 - 2.0 * (s as f64 + 0.5) / COLORBAR_STEPS as f64;
        let top = y + (s as f64 * step) as i32;
        let bottom = y + ((s + 1) as f64 * step).ceil() as i32;
        root.draw(&Rectangle::new(
            [(x, top), (x + COLORBAR_WIDTH, bottom)],
            correlation_color(value).filled(),
        ))?;
    }
    root.draw(&Rectangle::new(
        [(x, y), (x + COLORBAR_WIDTH, y + height)],
        BLACK.stroke_width(1),
    ))?;

    let tick_style = ("sans-serif", 13.0)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for tick in [1.0, 0.5, 0.0, -0.5, -1.0] {
        let ty = y + ((1.0 - tick) / 2.0 * height as f64) as i32;
        root.draw(&PathElement::new(
            vec![(x + COLORBAR_WIDTH, ty), (x + COLORBAR_WIDTH + 5, ty)],
            BLACK.stroke_width(1),
        ))?;
        root.draw(&Text::new(
            format!("{tick:.1}"),
            (x + COLORBAR_WIDTH + 8, ty),
            tick_style.clone(),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coolwarm_endpoints() {
        assert_eq!(coolwarm(0.0), RGBColor(59, 76, 192));
        assert_eq!(coolwarm(0.5), RGBColor(221, 221, 221));
        assert_eq!(coolwarm(1.0), RGBColor(180, 4, 38));
    }

    #[test]
    fn test_coolwarm_clamps_out_of_range() {
        assert_eq!(coolwarm(-3.0), coolwarm(0.0));
        assert_eq!(coolwarm(7.0), coolwarm(1.0));
        assert_eq!(coolwarm(f64::NAN), coolwarm(0.5));
    }

    #[test]
    fn test_correlation_color_is_diverging() {
        let negative = correlation_color(-1.0);
        let positive = correlation_color(1.0);
        // blue dominates on the negative end, red on the positive end
        assert!(negative.2 > negative.0);
        assert!(positive.0 > positive.2);
        assert_eq!(correlation_color(0.0), RGBColor(221, 221, 221));
    }
}
