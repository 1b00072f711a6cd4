//! ASCII plotting of hyetographs for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output
//!
//! Plot elements:
//! - storm-window depth per column: `#` bars (tallest column = full height)
//! - cumulative depth: `.` line, scaled from 0 to the total depth

use crate::domain::Hyetograph;

/// Render the storm window of `hyetograph`.
pub fn render_hyetograph_plot(hyetograph: &Hyetograph, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let storm = hyetograph.storm_window();
    let rows = storm.get(1..).unwrap_or(&[]);
    let Some(last) = rows.last() else {
        return "Plot: (no rainfall)\n".to_string();
    };
    let t_max = last.hours();

    // Sum increments into columns.
    let mut columns = vec![0.0_f64; width];
    let n = rows.len();
    for (i, step) in rows.iter().enumerate() {
        let col = (i * width / n).min(width - 1);
        columns[col] += step.incremental_depth;
    }
    let max_bar = columns.iter().copied().fold(0.0_f64, f64::max);

    let mut grid = vec![vec![' '; width]; height];
    if max_bar > 0.0 {
        for (x, &sum) in columns.iter().enumerate() {
            if sum <= 0.0 {
                continue;
            }
            let bar = ((sum / max_bar) * height as f64).round().max(1.0) as usize;
            for r in 0..bar.min(height) {
                grid[height - 1 - r][x] = '#';
            }
        }
    }

    let cumulative: Vec<(f64, f64)> = storm.iter().map(|s| (s.hours(), s.cumulative_depth)).collect();
    draw_curve(&mut grid, &cumulative, 0.0, t_max, 0.0, hyetograph.total_depth());

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: t=[0.0, {t_max:.1}] h | tallest column={max_bar:.4} | '.' cumulative to {:.3}\n",
        hyetograph.total_depth()
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 || !(t_max > t_min) || !(y_max > y_min) {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '.');
        } else if grid[yy][x] == ' ' {
            grid[yy][x] = '.';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish). Only blank cells are painted.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
